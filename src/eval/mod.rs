//! Positional analysis.
//!
//! Measures each side of a board (pip count, blots, made points, anchors,
//! primes, escapes, containment) and classifies the position's game stage.
//! These raw measurements feed the scalar block of the feature vector.

pub mod class;
pub(crate) mod escapes;
pub mod metrics;

pub use class::{classify, has_contact, PositionClass, ALL_CLASSES, NUM_CLASSES};
pub use metrics::{back_checker, pip_count, SideMetrics, CONCEPT_NAMES, NUM_CONCEPTS};
