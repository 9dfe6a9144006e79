//! Catalog synchronization engine.
//!
//! Reconciles external course items into courses, tees, holes and hole-tee
//! pairings. Each course is one atomic unit: its upsert and the full
//! replacement of its children commit together or not at all. The batch is
//! fail-fast: the first failing course stops the run, and courses committed
//! before it stay committed.

use super::SyncError;
use crate::models::{ExternalCourseItem, ExternalHoleTee};
use crate::store::{CatalogStore, CourseWriter, StoreError};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Outcome of a successful sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Number of courses reconciled.
    pub synced: usize,
    pub tees: usize,
    pub holes: usize,
    pub hole_tees: usize,
    /// Hole-tee pairings that could not be linked to a tee.
    pub skipped_pairings: usize,
}

/// Per-course counts, folded into [`SyncReport`].
#[derive(Debug, Clone, Copy, Default)]
struct CourseOutcome {
    tees: usize,
    holes: usize,
    hole_tees: usize,
    skipped_pairings: usize,
}

/// Pairings of one hole resolved to the created tee ids they link to.
#[derive(Debug, Default, PartialEq)]
pub struct LinkPlan<'a> {
    pub links: Vec<(&'a ExternalHoleTee, &'a str)>,
    pub skipped: usize,
}

/// Resolve which created tee each pairing of a hole links to.
///
/// When any pairing names a tee (`teeId`), pairings are joined by that key
/// against the tees' external ids and untagged or unknown pairings are
/// skipped. Otherwise the j-th pairing links to the j-th created tee, up to
/// the shorter of the two lists.
pub fn link_pairings<'a>(
    pairings: &'a [ExternalHoleTee],
    tee_ids: &'a [String],
    tee_keys: &HashMap<&str, &'a str>,
) -> LinkPlan<'a> {
    let tagged = pairings.iter().any(|p| p.tee_id.is_some());

    if !tagged {
        let links: Vec<_> = pairings
            .iter()
            .zip(tee_ids.iter().map(String::as_str))
            .collect();
        let skipped = pairings.len() - links.len();
        return LinkPlan { links, skipped };
    }

    let mut plan = LinkPlan::default();
    for pairing in pairings {
        match pairing
            .tee_id
            .as_deref()
            .and_then(|key| tee_keys.get(key).copied())
        {
            Some(tee_id) => plan.links.push((pairing, tee_id)),
            None => plan.skipped += 1,
        }
    }
    plan
}

/// Counts a sync of `items` would produce, without touching a store.
pub fn preview_catalog(items: &[ExternalCourseItem]) -> SyncReport {
    let mut report = SyncReport::default();

    for item in items {
        let tee_ids: Vec<String> = (0..item.tees.len()).map(|i| i.to_string()).collect();
        let tee_keys: HashMap<&str, &str> = item
            .tees
            .iter()
            .zip(&tee_ids)
            .filter_map(|(tee, id)| tee.id.as_deref().map(|key| (key, id.as_str())))
            .collect();

        report.synced += 1;
        report.tees += tee_ids.len();
        for hole in &item.holes {
            let plan = link_pairings(&hole.tees, &tee_ids, &tee_keys);
            report.holes += 1;
            report.hole_tees += plan.links.len();
            report.skipped_pairings += plan.skipped;
        }
    }

    report
}

/// Drives reconciliation of catalog items into a [`CatalogStore`].
pub struct CatalogSyncEngine<S> {
    store: S,
    show_progress: bool,
}

impl<S: CatalogStore> CatalogSyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            show_progress: false,
        }
    }

    /// Show a progress bar while syncing.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reconcile every item, in order. Returns a report only when every
    /// course committed.
    pub fn sync_catalog(&mut self, items: &[ExternalCourseItem]) -> Result<SyncReport, SyncError> {
        let synced_at = Utc::now();
        info!("Syncing {} catalog courses", items.len());

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(items.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut report = SyncReport::default();

        for item in items {
            if let Some(ref pb) = progress_bar {
                pb.set_message(item.display_name.clone());
            }

            let outcome = match self.sync_course(item, synced_at) {
                Ok(outcome) => outcome,
                Err(source) => {
                    if let Some(ref pb) = progress_bar {
                        pb.abandon_with_message(format!("failed at {}", item.id));
                    }
                    warn!(
                        "Sync aborted at course {} after {} committed courses: {}",
                        item.id, report.synced, source
                    );
                    return Err(SyncError::Persistence {
                        external_id: item.id.clone(),
                        source,
                    });
                }
            };

            report.synced += 1;
            report.tees += outcome.tees;
            report.holes += outcome.holes;
            report.hole_tees += outcome.hole_tees;
            report.skipped_pairings += outcome.skipped_pairings;

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("done");
        }

        info!(
            "Synced {} courses ({} tees, {} holes, {} hole tees)",
            report.synced, report.tees, report.holes, report.hole_tees
        );
        if report.skipped_pairings > 0 {
            warn!(
                "{} hole-tee pairings had no matching tee and were skipped",
                report.skipped_pairings
            );
        }

        Ok(report)
    }

    /// Upsert one course and replace its children inside a single writer.
    fn sync_course(
        &mut self,
        item: &ExternalCourseItem,
        synced_at: DateTime<Utc>,
    ) -> Result<CourseOutcome, StoreError> {
        let mut writer = self.store.begin_course()?;

        let course_id = writer.upsert_course(item, synced_at)?;
        writer.delete_children(&course_id)?;

        let mut tee_ids = Vec::with_capacity(item.tees.len());
        for (ordinal, tee) in item.tees.iter().enumerate() {
            tee_ids.push(writer.insert_tee(&course_id, ordinal, tee)?);
        }

        let tee_keys: HashMap<&str, &str> = item
            .tees
            .iter()
            .zip(&tee_ids)
            .filter_map(|(tee, id)| tee.id.as_deref().map(|key| (key, id.as_str())))
            .collect();

        let mut outcome = CourseOutcome {
            tees: tee_ids.len(),
            ..CourseOutcome::default()
        };

        for (hole_index, hole) in item.holes.iter().enumerate() {
            let hole_id = writer.insert_hole(&course_id, hole_index, hole.name.as_deref())?;
            outcome.holes += 1;

            let plan = link_pairings(&hole.tees, &tee_ids, &tee_keys);
            if plan.skipped > 0 {
                debug!(
                    "Course {} hole {}: {} pairings without a tee",
                    item.id, hole_index, plan.skipped
                );
            }
            outcome.skipped_pairings += plan.skipped;

            for (pairing, tee_id) in plan.links {
                writer.insert_hole_tee(&hole_id, tee_id, pairing)?;
                outcome.hole_tees += 1;
            }
        }

        writer.commit()?;

        debug!(
            "Course {} ({}) synced: {} tees, {} holes, {} hole tees",
            item.id, course_id, outcome.tees, outcome.holes, outcome.hole_tees
        );
        Ok(outcome)
    }
}
