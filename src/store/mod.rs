//! Persistence for the course catalog.
//!
//! The sync engine only sees the [`CatalogStore`] / [`CourseWriter`] pair:
//! a store hands out one writer per course, every write made through the
//! writer becomes visible together on [`CourseWriter::commit`], and a writer
//! dropped without committing leaves the course exactly as it was.

pub mod schema;
pub mod sqlite;

use crate::models::{ExternalCourseItem, ExternalHoleTee, ExternalTee};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("invalid stored value in {column}: {message}")]
    Corrupt { column: &'static str, message: String },
}

/// Transactional writer scoped to the reconciliation of one course.
pub trait CourseWriter {
    /// Insert or update the course keyed by `item.id`, returning its
    /// internal id.
    fn upsert_course(
        &mut self,
        item: &ExternalCourseItem,
        synced_at: DateTime<Utc>,
    ) -> Result<String, StoreError>;

    /// Delete every tee, hole and hole-tee row owned by the course.
    fn delete_children(&mut self, course_id: &str) -> Result<(), StoreError>;

    fn insert_tee(
        &mut self,
        course_id: &str,
        ordinal: usize,
        tee: &ExternalTee,
    ) -> Result<String, StoreError>;

    fn insert_hole(
        &mut self,
        course_id: &str,
        hole_index: usize,
        name: Option<&str>,
    ) -> Result<String, StoreError>;

    fn insert_hole_tee(
        &mut self,
        hole_id: &str,
        tee_id: &str,
        pairing: &ExternalHoleTee,
    ) -> Result<String, StoreError>;

    /// Make all writes durable at once.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// A store able to reconcile courses one atomic unit at a time.
pub trait CatalogStore {
    type Writer<'a>: CourseWriter
    where
        Self: 'a;

    /// Start the atomic unit for one course. Implementations must serialize
    /// overlapping writers so two reconciliations never interleave.
    fn begin_course(&mut self) -> Result<Self::Writer<'_>, StoreError>;
}
