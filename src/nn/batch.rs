//! Batch feature extraction.
//!
//! Positions are independent, so a batch is a plain rayon parallel map.
//! Results come back in input order regardless of which thread produced them.

use rayon::prelude::*;

use super::encoding::{
    encode_position, extract_features_unchecked, FeatureError, FeatureVector, FEATURE_COUNT,
};
use crate::board::side::Side;
use crate::board::state::Board;

/// Extracts every `(board, side)` pair in parallel.
///
/// Each position succeeds or fails on its own.
pub fn extract_batch(positions: &[(Board, Side)]) -> Vec<Result<FeatureVector, FeatureError>> {
    log::debug!("extracting batch of {} positions", positions.len());
    positions
        .par_iter()
        .map(|(board, side)| encode_position(board, *side))
        .collect()
}

/// Extracts a batch of boards sharing one side on roll into a flat
/// row-major `[boards.len() * FEATURE_COUNT]` buffer, ready to feed a model.
///
/// Every board is validated before any extraction starts. The first invalid
/// board (lowest index) fails the whole batch and no buffer is returned.
pub fn extract_batch_flat(boards: &[Board], side: Side) -> Result<Vec<f32>, FeatureError> {
    boards.iter().try_for_each(|b| b.validate())?;

    log::debug!("extracting flat batch of {} boards", boards.len());
    let mut flat = vec![0.0f32; boards.len() * FEATURE_COUNT];
    flat.par_chunks_exact_mut(FEATURE_COUNT)
        .zip(boards.par_iter())
        .for_each(|(row, board)| {
            let mut features = [0.0f32; FEATURE_COUNT];
            extract_features_unchecked(board, side, &mut features);
            row.copy_from_slice(&features);
        });
    Ok(flat)
}
