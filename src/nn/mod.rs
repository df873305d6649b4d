//! Neural network feature encoding.
//!
//! Converts a `Board` and the side on roll into the fixed-length [241] f32
//! vector expected by the downstream scoring network, singly or in parallel
//! batches.

pub mod batch;
pub mod encoding;

pub use batch::{extract_batch, extract_batch_flat};
pub use encoding::{
    encode_position, extract_features, extract_features_unchecked, extract_raw, feature_name,
    feature_names, FeatureError, FeatureVector, FEATURE_COUNT,
};
