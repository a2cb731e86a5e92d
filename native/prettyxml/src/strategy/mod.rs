//! Processing Strategies
//!
//! The engine itself is single-threaded per call. Strategies decide how a
//! shared printer is driven over many inputs.

pub mod parallel;

pub use parallel::process_parallel;
