//! Round scorecards.

pub mod aggregator;

pub use aggregator::*;

use crate::models::HolesPlayed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive data shown above a scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardHeader {
    pub course_name: String,
    pub played_at: DateTime<Utc>,
    pub tee_label: String,
    pub holes_played: HolesPlayed,
    pub overall_score: Option<i64>,
    pub note: Option<String>,
}

/// Everything loaded from the store for one play's scorecard.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorecardInput {
    pub header: ScorecardHeader,
    pub play: ScorecardPlay,
    pub holes: Vec<ScorecardHole>,
}

impl ScorecardInput {
    pub fn build(&self) -> ScorecardView {
        build_scorecard(&self.play, &self.holes)
    }
}
