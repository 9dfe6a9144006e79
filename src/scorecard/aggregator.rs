//! Scorecard aggregation.
//!
//! Turns a play and the course's holes into display rows plus out/in/total
//! sums. Pure and infallible: a par or score that cannot be resolved is
//! carried as `None` and never raises.

use crate::models::HolesPlayed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Holes with an index below this are the front nine ("out").
pub const FRONT_NINE_END: i64 = 9;

/// Par of one hole for one tee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleTeePar {
    pub tee_id: String,
    pub par: Option<i64>,
}

/// A course hole as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardHole {
    pub hole_id: String,
    pub hole_index: i64,
    pub hole_tee_pars: Vec<HoleTeePar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleScoreEntry {
    pub hole_id: String,
    pub score: i64,
}

/// The parts of a play the aggregator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardPlay {
    pub tee_id: String,
    pub holes_played: HolesPlayed,
    pub hole_scores: Vec<HoleScoreEntry>,
}

/// One hole line of the scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorecardRow {
    pub hole_index: i64,
    pub par: Option<i64>,
    pub score: Option<i64>,
}

impl ScorecardRow {
    /// 1-based hole number for display.
    pub fn hole_number(&self) -> i64 {
        self.hole_index + 1
    }
}

/// Sum over a list of optional values.
///
/// `sum` treats unknown values as 0. `known` and `unknown` keep the
/// distinction the sum loses, so a zero over nothing but unknowns can be
/// told apart from a real zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub sum: i64,
    pub known: usize,
    pub unknown: usize,
}

impl Tally {
    pub fn add(&mut self, value: Option<i64>) {
        match value {
            Some(v) => {
                self.sum += v;
                self.known += 1;
            }
            None => self.unknown += 1,
        }
    }

    /// True when no value contributed to the sum (including an empty list).
    pub fn all_unknown(&self) -> bool {
        self.known == 0
    }

    /// The sum, or `None` when nothing was known.
    pub fn value(&self) -> Option<i64> {
        if self.all_unknown() {
            None
        } else {
            Some(self.sum)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub par: Tally,
    pub score: Tally,
}

impl Totals {
    fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ScorecardRow>) -> Self {
        let mut totals = Totals::default();
        for row in rows {
            totals.par.add(row.par);
            totals.score.add(row.score);
        }
        totals
    }
}

/// Out (front nine) and in (back nine) subtotals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NineTotals {
    pub out_totals: Totals,
    pub in_totals: Totals,
}

/// Display-ready scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardView {
    pub holes_played: HolesPlayed,
    pub rows: Vec<ScorecardRow>,
    /// Present only when the shown holes span both nines.
    pub nines: Option<NineTotals>,
    pub totals: Totals,
}

impl ScorecardView {
    pub fn total_par(&self) -> i64 {
        self.totals.par.sum
    }

    pub fn total_score(&self) -> i64 {
        self.totals.score.sum
    }
}

fn is_front(hole_index: i64) -> bool {
    hole_index < FRONT_NINE_END
}

/// Build the scorecard for `play` over the course's `holes`.
pub fn build_scorecard(play: &ScorecardPlay, holes: &[ScorecardHole]) -> ScorecardView {
    let score_by_hole: HashMap<&str, i64> = play
        .hole_scores
        .iter()
        .map(|hs| (hs.hole_id.as_str(), hs.score))
        .collect();

    let mut shown: Vec<&ScorecardHole> = holes
        .iter()
        .filter(|h| match play.holes_played {
            HolesPlayed::Front => is_front(h.hole_index),
            HolesPlayed::Back => !is_front(h.hole_index),
            HolesPlayed::Full => true,
        })
        .collect();
    shown.sort_by_key(|h| h.hole_index);

    let rows: Vec<ScorecardRow> = shown
        .into_iter()
        .map(|hole| ScorecardRow {
            hole_index: hole.hole_index,
            par: hole
                .hole_tee_pars
                .iter()
                .find(|ht| ht.tee_id == play.tee_id)
                .and_then(|ht| ht.par),
            score: score_by_hole.get(hole.hole_id.as_str()).copied(),
        })
        .collect();

    let (out_rows, in_rows): (Vec<&ScorecardRow>, Vec<&ScorecardRow>) =
        rows.iter().partition(|r| is_front(r.hole_index));

    let nines = if !out_rows.is_empty() && !in_rows.is_empty() {
        Some(NineTotals {
            out_totals: Totals::from_rows(out_rows),
            in_totals: Totals::from_rows(in_rows),
        })
    } else {
        None
    };

    let totals = Totals::from_rows(&rows);

    ScorecardView {
        holes_played: play.holes_played,
        rows,
        nines,
        totals,
    }
}
