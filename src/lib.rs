//! Tavla library.
//!
//! Exposes the board representation, positional evaluation, feature
//! encoding and protocol modules for use by integration tests, benches and
//! the binary entry point.

pub mod board;
pub mod engine;
pub mod eval;
pub mod nn;
pub mod protocol;
