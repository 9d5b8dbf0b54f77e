//! Evaluation Strategy Module
//!
//! - Parallel: many paths (or many matches) evaluated with Rayon

pub mod parallel;

pub use parallel::{map_matches, select_map, select_parallel};
