//! Output rendering for scorecards, play history and sync runs.

mod generator;

pub use generator::*;
