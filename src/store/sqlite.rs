//! SQLite implementation of the catalog store.

use super::schema::init_connection;
use super::{CatalogStore, CourseWriter, StoreError};
use crate::models::{
    tee_label, ChildCounts, Course, ExternalCourseItem, ExternalHoleTee, ExternalTee, Hole,
    HoleTee, HolesPlayed, NewPlay, Play, PlaySummary, Tee,
};
use crate::scorecard::{
    HoleScoreEntry, HoleTeePar, ScorecardHeader, ScorecardHole, ScorecardInput, ScorecardPlay,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_holes_played(idx: usize, value: String) -> rusqlite::Result<HolesPlayed> {
    value.parse::<HolesPlayed>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })
}

fn parse_tags(idx: usize, value: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const COURSE_COLUMNS: &str = "id, external_id, db_id, created_at, description, display_name, \
     numbers_of_holes, course_location, difficulty, tags, image_url, video_url, latitude, \
     longitude, google_map_url, synced_at";

fn map_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        external_id: row.get(1)?,
        db_id: row.get(2)?,
        created_at: row
            .get::<_, Option<String>>(3)?
            .map(|s| parse_timestamp(3, s))
            .transpose()?,
        description: row.get(4)?,
        display_name: row.get(5)?,
        numbers_of_holes: row.get(6)?,
        course_location: row.get(7)?,
        difficulty: row.get(8)?,
        tags: parse_tags(9, row.get(9)?)?,
        image_url: row.get(10)?,
        video_url: row.get(11)?,
        latitude: row.get(12)?,
        longitude: row.get(13)?,
        google_map_url: row.get(14)?,
        synced_at: parse_timestamp(15, row.get(15)?)?,
    })
}

const TEE_COLUMNS: &str = "id, course_id, ordinal, external_key, par, course_distance, \
     course_rating, slope, gender, kind, name";

fn map_tee(row: &Row<'_>) -> rusqlite::Result<Tee> {
    Ok(Tee {
        id: row.get(0)?,
        course_id: row.get(1)?,
        ordinal: row.get(2)?,
        external_key: row.get(3)?,
        par: row.get(4)?,
        course_distance: row.get(5)?,
        course_rating: row.get(6)?,
        slope: row.get(7)?,
        gender: row.get(8)?,
        kind: row.get(9)?,
        name: row.get(10)?,
    })
}

fn map_play(row: &Row<'_>) -> rusqlite::Result<Play> {
    Ok(Play {
        id: row.get(0)?,
        course_id: row.get(1)?,
        tee_id: row.get(2)?,
        tee_ordinal: row.get(3)?,
        holes_played: parse_holes_played(4, row.get(4)?)?,
        overall_score: row.get(5)?,
        note: row.get(6)?,
        played_at: parse_timestamp(7, row.get(7)?)?,
    })
}

/// Catalog store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a catalog database file.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        init_connection(&conn, busy_timeout)?;
        debug!("Opened catalog database at {}", path.as_ref().display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_connection(&conn, Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    pub fn course_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn find_course_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses WHERE external_id = ?1", COURSE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![external_id], map_course)
            .optional()?)
    }

    pub fn get_course(&self, course_id: &str) -> Result<Course, StoreError> {
        let sql = format!("SELECT {} FROM courses WHERE id = ?1", COURSE_COLUMNS);
        self.conn
            .query_row(&sql, params![course_id], map_course)
            .optional()?
            .ok_or_else(|| StoreError::NotFound {
                entity: "course",
                key: course_id.to_string(),
            })
    }

    /// Tees of a course in creation order.
    pub fn tees_for_course(&self, course_id: &str) -> Result<Vec<Tee>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tees WHERE course_id = ?1 ORDER BY ordinal ASC",
            TEE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![course_id], map_tee)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Holes of a course ordered by hole index.
    pub fn holes_for_course(&self, course_id: &str) -> Result<Vec<Hole>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, course_id, hole_index, name FROM holes
             WHERE course_id = ?1 ORDER BY hole_index ASC",
        )?;
        let rows = stmt.query_map(params![course_id], |row| {
            Ok(Hole {
                id: row.get(0)?,
                course_id: row.get(1)?,
                hole_index: row.get(2)?,
                name: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Hole-tee pairings of a course ordered by hole index, then tee ordinal.
    pub fn hole_tees_for_course(&self, course_id: &str) -> Result<Vec<HoleTee>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ht.id, ht.hole_id, ht.tee_id, ht.distance, ht.stroke_index, ht.par
             FROM hole_tees ht
             JOIN holes h ON h.id = ht.hole_id
             JOIN tees t ON t.id = ht.tee_id
             WHERE h.course_id = ?1
             ORDER BY h.hole_index ASC, t.ordinal ASC",
        )?;
        let rows = stmt.query_map(params![course_id], |row| {
            Ok(HoleTee {
                id: row.get(0)?,
                hole_id: row.get(1)?,
                tee_id: row.get(2)?,
                distance: row.get(3)?,
                stroke_index: row.get(4)?,
                par: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn child_counts(&self, course_id: &str) -> Result<ChildCounts, StoreError> {
        let count = |sql: &str| -> Result<usize, StoreError> {
            let n: i64 = self.conn.query_row(sql, params![course_id], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(ChildCounts {
            tees: count("SELECT COUNT(*) FROM tees WHERE course_id = ?1")?,
            holes: count("SELECT COUNT(*) FROM holes WHERE course_id = ?1")?,
            hole_tees: count(
                "SELECT COUNT(*) FROM hole_tees
                 WHERE hole_id IN (SELECT id FROM holes WHERE course_id = ?1)",
            )?,
        })
    }

    /// Record a round. Hole scores are matched to the course's current holes
    /// by hole index.
    pub fn record_play(&mut self, play: &NewPlay) -> Result<String, StoreError> {
        let tx = self.conn.transaction()?;

        let tee_ordinal: i64 = tx
            .query_row(
                "SELECT ordinal FROM tees WHERE id = ?1 AND course_id = ?2",
                params![play.tee_id, play.course_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound {
                entity: "tee",
                key: play.tee_id.clone(),
            })?;

        let play_id = new_id();
        let played_at = play.played_at.unwrap_or_else(Utc::now);
        tx.execute(
            "INSERT INTO plays (id, course_id, tee_id, tee_ordinal, holes_played,
                                overall_score, note, played_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                play_id,
                play.course_id,
                play.tee_id,
                tee_ordinal,
                play.holes_played.as_str(),
                play.overall_score,
                play.note,
                played_at.to_rfc3339(),
            ],
        )?;

        for entry in &play.scores {
            let hole_id: String = tx
                .query_row(
                    "SELECT id FROM holes WHERE course_id = ?1 AND hole_index = ?2",
                    params![play.course_id, entry.hole_index],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "hole",
                    key: format!("{}#{}", play.course_id, entry.hole_index),
                })?;

            tx.execute(
                "INSERT INTO hole_scores (id, play_id, hole_id, hole_index, score)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![new_id(), play_id, hole_id, entry.hole_index, entry.score],
            )?;
        }

        tx.commit()?;
        debug!("Recorded play {} with {} hole scores", play_id, play.scores.len());
        Ok(play_id)
    }

    pub fn get_play(&self, play_id: &str) -> Result<Play, StoreError> {
        self.conn
            .query_row(
                "SELECT id, course_id, tee_id, tee_ordinal, holes_played, overall_score,
                        note, played_at
                 FROM plays WHERE id = ?1",
                params![play_id],
                map_play,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound {
                entity: "play",
                key: play_id.to_string(),
            })
    }

    /// The tee a play was recorded against. A tee replaced by a resync is
    /// found again by its ordinal.
    fn resolve_play_tee(&self, play: &Play) -> Result<Option<Tee>, StoreError> {
        let tees = self.tees_for_course(&play.course_id)?;
        let by_id = play
            .tee_id
            .as_deref()
            .and_then(|id| tees.iter().find(|t| t.id == id));
        Ok(by_id
            .or_else(|| tees.iter().find(|t| t.ordinal == play.tee_ordinal))
            .cloned())
    }

    /// Load everything the aggregator and the scorecard header need for one
    /// play.
    pub fn load_scorecard(&self, play_id: &str) -> Result<ScorecardInput, StoreError> {
        let play = self.get_play(play_id)?;
        let course = self.get_course(&play.course_id)?;
        let tee = self.resolve_play_tee(&play)?;
        let holes = self.holes_for_course(&play.course_id)?;

        let mut pars: HashMap<String, Vec<HoleTeePar>> = HashMap::new();
        for ht in self.hole_tees_for_course(&play.course_id)? {
            pars.entry(ht.hole_id).or_default().push(HoleTeePar {
                tee_id: ht.tee_id,
                par: ht.par,
            });
        }

        let current: HashSet<&str> = holes.iter().map(|h| h.id.as_str()).collect();
        let by_index: HashMap<i64, &str> =
            holes.iter().map(|h| (h.hole_index, h.id.as_str())).collect();

        let mut stmt = self.conn.prepare(
            "SELECT hole_id, hole_index, score FROM hole_scores
             WHERE play_id = ?1 ORDER BY hole_index ASC",
        )?;
        let raw = stmt
            .query_map(params![play_id], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut hole_scores = Vec::with_capacity(raw.len());
        for (hole_id, hole_index, score) in raw {
            let resolved = match hole_id {
                Some(id) if current.contains(id.as_str()) => Some(id),
                _ => by_index.get(&hole_index).map(|id| id.to_string()),
            };
            match resolved {
                Some(hole_id) => hole_scores.push(HoleScoreEntry { hole_id, score }),
                None => debug!(
                    "Play {} has a score for hole index {} which no longer exists",
                    play_id, hole_index
                ),
            }
        }

        let header = ScorecardHeader {
            course_name: course.display_name.clone(),
            played_at: play.played_at,
            tee_label: tee
                .as_ref()
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| "Tee".to_string()),
            holes_played: play.holes_played,
            overall_score: play.overall_score,
            note: play.note.clone(),
        };

        let scorecard_holes = holes
            .iter()
            .map(|h| ScorecardHole {
                hole_id: h.id.clone(),
                hole_index: h.hole_index,
                hole_tee_pars: pars.remove(&h.id).unwrap_or_default(),
            })
            .collect();

        Ok(ScorecardInput {
            header,
            play: ScorecardPlay {
                tee_id: tee.map(|t| t.id).unwrap_or_default(),
                holes_played: play.holes_played,
                hole_scores,
            },
            holes: scorecard_holes,
        })
    }

    /// Plays of a course, newest first.
    pub fn play_history(&self, course_id: &str) -> Result<Vec<PlaySummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.played_at, t.name, t.gender, p.holes_played, p.overall_score,
                    p.note,
                    (SELECT COUNT(*) FROM hole_scores hs WHERE hs.play_id = p.id)
             FROM plays p
             LEFT JOIN tees t
               ON t.id = p.tee_id
               OR (p.tee_id IS NULL AND t.course_id = p.course_id AND t.ordinal = p.tee_ordinal)
             WHERE p.course_id = ?1
             ORDER BY p.played_at DESC",
        )?;

        let rows = stmt.query_map(params![course_id], |row| {
            let name: Option<String> = row.get(2)?;
            let gender: Option<String> = row.get(3)?;
            let count: i64 = row.get(7)?;
            Ok(PlaySummary {
                play_id: row.get(0)?,
                played_at: parse_timestamp(1, row.get(1)?)?,
                tee_label: tee_label(name.as_deref(), gender.as_deref()).to_string(),
                holes_played: parse_holes_played(4, row.get(4)?)?,
                overall_score: row.get(5)?,
                note: row.get(6)?,
                hole_score_count: count as usize,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl CatalogStore for SqliteStore {
    type Writer<'a> = SqliteCourseWriter<'a>;

    fn begin_course(&mut self) -> Result<Self::Writer<'_>, StoreError> {
        // Write lock up front; a concurrent sync waits out the busy timeout.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteCourseWriter { tx })
    }
}

/// Writer for one course; rolls back on drop unless committed.
pub struct SqliteCourseWriter<'a> {
    tx: Transaction<'a>,
}

impl CourseWriter for SqliteCourseWriter<'_> {
    fn upsert_course(
        &mut self,
        item: &ExternalCourseItem,
        synced_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let tags = serde_json::to_string(&item.tags).map_err(|e| StoreError::Corrupt {
            column: "tags",
            message: e.to_string(),
        })?;

        // Optional fields absent from the payload keep their stored value.
        let id: String = self.tx.query_row(
            "INSERT INTO courses (id, external_id, db_id, created_at, description, display_name,
                                  numbers_of_holes, course_location, difficulty, tags, image_url,
                                  video_url, latitude, longitude, google_map_url, synced_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(external_id) DO UPDATE SET
                db_id            = COALESCE(excluded.db_id, courses.db_id),
                description      = COALESCE(excluded.description, courses.description),
                display_name     = excluded.display_name,
                numbers_of_holes = COALESCE(excluded.numbers_of_holes, courses.numbers_of_holes),
                course_location  = COALESCE(excluded.course_location, courses.course_location),
                difficulty       = COALESCE(excluded.difficulty, courses.difficulty),
                tags             = excluded.tags,
                image_url        = COALESCE(excluded.image_url, courses.image_url),
                video_url        = COALESCE(excluded.video_url, courses.video_url),
                latitude         = COALESCE(excluded.latitude, courses.latitude),
                longitude        = COALESCE(excluded.longitude, courses.longitude),
                google_map_url   = COALESCE(excluded.google_map_url, courses.google_map_url),
                synced_at        = excluded.synced_at
             RETURNING id",
            params![
                new_id(),
                item.id,
                item.db_id,
                item.created_at.map(|t| t.to_rfc3339()),
                item.description,
                item.display_name,
                item.numbers_of_holes,
                item.course_location,
                item.difficulty,
                tags,
                item.image_url(),
                item.video_url(),
                item.latitude(),
                item.longitude(),
                item.google_map_url(),
                synced_at.to_rfc3339(),
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn delete_children(&mut self, course_id: &str) -> Result<(), StoreError> {
        let hole_tees = self.tx.execute(
            "DELETE FROM hole_tees WHERE hole_id IN (SELECT id FROM holes WHERE course_id = ?1)",
            params![course_id],
        )?;
        let holes = self
            .tx
            .execute("DELETE FROM holes WHERE course_id = ?1", params![course_id])?;
        let tees = self
            .tx
            .execute("DELETE FROM tees WHERE course_id = ?1", params![course_id])?;

        debug!(
            "Cleared course {}: {} tees, {} holes, {} hole tees",
            course_id, tees, holes, hole_tees
        );
        Ok(())
    }

    fn insert_tee(
        &mut self,
        course_id: &str,
        ordinal: usize,
        tee: &ExternalTee,
    ) -> Result<String, StoreError> {
        let id = new_id();
        self.tx.execute(
            "INSERT INTO tees (id, course_id, ordinal, external_key, par, course_distance,
                               course_rating, slope, gender, kind, name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                course_id,
                ordinal as i64,
                tee.id,
                tee.par,
                tee.course_distance,
                tee.course_rating,
                tee.slope,
                tee.gender,
                tee.kind,
                tee.name,
            ],
        )?;
        Ok(id)
    }

    fn insert_hole(
        &mut self,
        course_id: &str,
        hole_index: usize,
        name: Option<&str>,
    ) -> Result<String, StoreError> {
        let id = new_id();
        self.tx.execute(
            "INSERT INTO holes (id, course_id, hole_index, name) VALUES (?1, ?2, ?3, ?4)",
            params![id, course_id, hole_index as i64, name],
        )?;
        Ok(id)
    }

    fn insert_hole_tee(
        &mut self,
        hole_id: &str,
        tee_id: &str,
        pairing: &ExternalHoleTee,
    ) -> Result<String, StoreError> {
        let id = new_id();
        self.tx.execute(
            "INSERT INTO hole_tees (id, hole_id, tee_id, distance, stroke_index, par)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                hole_id,
                tee_id,
                pairing.distance,
                pairing.stroke_index,
                pairing.par,
            ],
        )?;
        Ok(id)
    }

    fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewHoleScore;
    use tempfile::TempDir;

    fn item(id: &str, name: &str) -> ExternalCourseItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "displayName": name,
            "description": "Links course",
            "tags": ["links", "coastal"],
        }))
        .unwrap()
    }

    fn seed_course(store: &mut SqliteStore) -> (String, Vec<String>) {
        let mut writer = store.begin_course().unwrap();
        let course_id = writer.upsert_course(&item("ext-1", "Dunes"), Utc::now()).unwrap();
        let tee = writer
            .insert_tee(
                &course_id,
                0,
                &ExternalTee {
                    name: Some("White".to_string()),
                    ..ExternalTee::default()
                },
            )
            .unwrap();
        for i in 0..3 {
            let hole = writer.insert_hole(&course_id, i, None).unwrap();
            writer
                .insert_hole_tee(
                    &hole,
                    &tee,
                    &ExternalHoleTee {
                        par: Some(4),
                        ..ExternalHoleTee::default()
                    },
                )
                .unwrap();
        }
        writer.commit().unwrap();
        (course_id, vec![tee])
    }

    #[test]
    fn test_upsert_keeps_internal_id() {
        let mut store = SqliteStore::in_memory().unwrap();

        let mut writer = store.begin_course().unwrap();
        let first = writer.upsert_course(&item("ext-1", "Old"), Utc::now()).unwrap();
        writer.commit().unwrap();

        let mut updated = item("ext-1", "New");
        updated.description = None;
        let mut writer = store.begin_course().unwrap();
        let second = writer.upsert_course(&updated, Utc::now()).unwrap();
        writer.commit().unwrap();

        assert_eq!(first, second);
        let course = store.find_course_by_external_id("ext-1").unwrap().unwrap();
        assert_eq!(course.display_name, "New");
        assert_eq!(course.description.as_deref(), Some("Links course"));
        assert_eq!(course.tags, vec!["links", "coastal"]);
        assert_eq!(store.course_count().unwrap(), 1);
    }

    #[test]
    fn test_dropped_writer_rolls_back() {
        let mut store = SqliteStore::in_memory().unwrap();
        {
            let mut writer = store.begin_course().unwrap();
            writer.upsert_course(&item("ext-1", "Gone"), Utc::now()).unwrap();
        }
        assert_eq!(store.course_count().unwrap(), 0);
    }

    #[test]
    fn test_delete_children_clears_everything() {
        let mut store = SqliteStore::in_memory().unwrap();
        let (course_id, _) = seed_course(&mut store);
        assert_eq!(
            store.child_counts(&course_id).unwrap(),
            ChildCounts {
                tees: 1,
                holes: 3,
                hole_tees: 3
            }
        );

        let mut writer = store.begin_course().unwrap();
        writer.delete_children(&course_id).unwrap();
        writer.commit().unwrap();

        assert_eq!(store.child_counts(&course_id).unwrap(), ChildCounts::default());
    }

    #[test]
    fn test_record_play_and_history() {
        let mut store = SqliteStore::in_memory().unwrap();
        let (course_id, tees) = seed_course(&mut store);

        let play_id = store
            .record_play(&NewPlay {
                course_id: course_id.clone(),
                tee_id: tees[0].clone(),
                holes_played: HolesPlayed::Front,
                overall_score: Some(12),
                note: Some("windy".to_string()),
                played_at: None,
                scores: vec![
                    NewHoleScore {
                        hole_index: 0,
                        score: 5,
                    },
                    NewHoleScore {
                        hole_index: 1,
                        score: 4,
                    },
                ],
            })
            .unwrap();

        let history = store.play_history(&course_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].play_id, play_id);
        assert_eq!(history[0].tee_label, "White");
        assert!(history[0].has_scorecard());

        let input = store.load_scorecard(&play_id).unwrap();
        assert_eq!(input.header.course_name, "Dunes");
        assert_eq!(input.play.hole_scores.len(), 2);
        assert_eq!(input.holes.len(), 3);
        let view = input.build();
        assert_eq!(view.total_par(), 12);
        assert_eq!(view.total_score(), 9);
    }

    #[test]
    fn test_record_play_rejects_unknown_hole() {
        let mut store = SqliteStore::in_memory().unwrap();
        let (course_id, tees) = seed_course(&mut store);

        let err = store
            .record_play(&NewPlay {
                course_id,
                tee_id: tees[0].clone(),
                holes_played: HolesPlayed::Full,
                overall_score: None,
                note: None,
                played_at: None,
                scores: vec![NewHoleScore {
                    hole_index: 17,
                    score: 3,
                }],
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { entity: "hole", .. }));
    }

    #[test]
    fn test_missing_play_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.load_scorecard("nope"),
            Err(StoreError::NotFound { entity: "play", .. })
        ));
    }

    #[test]
    fn test_open_file_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.db");

        {
            let mut store = SqliteStore::open(&path, Duration::from_millis(500)).unwrap();
            seed_course(&mut store);
        }

        let store = SqliteStore::open(&path, Duration::from_millis(500)).unwrap();
        assert_eq!(store.course_count().unwrap(), 1);
    }

    #[test]
    fn test_overlapping_writers_serialize() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.db");
        let timeout = Duration::from_millis(200);

        let mut first = SqliteStore::open(&path, timeout).unwrap();
        let mut second = SqliteStore::open(&path, timeout).unwrap();
        let (course_id, _) = seed_course(&mut first);
        let before = ChildCounts {
            tees: 1,
            holes: 3,
            hole_tees: 3,
        };

        let mut writer = first.begin_course().unwrap();
        writer.upsert_course(&item("ext-1", "Dunes"), Utc::now()).unwrap();
        writer.delete_children(&course_id).unwrap();
        let tee = writer
            .insert_tee(&course_id, 0, &ExternalTee::default())
            .unwrap();
        let hole = writer.insert_hole(&course_id, 0, None).unwrap();

        // Locked out while the first writer is mid-replacement.
        assert!(matches!(
            second.begin_course().map(|_| ()),
            Err(StoreError::Sqlite(_))
        ));
        assert_eq!(second.child_counts(&course_id).unwrap(), before);

        writer
            .insert_hole_tee(&hole, &tee, &ExternalHoleTee::default())
            .unwrap();
        writer.commit().unwrap();

        let after = ChildCounts {
            tees: 1,
            holes: 1,
            hole_tees: 1,
        };
        assert_eq!(second.child_counts(&course_id).unwrap(), after);

        let writer = second.begin_course().unwrap();
        writer.commit().unwrap();
    }

    #[test]
    fn test_dropped_writer_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.db");
        let timeout = Duration::from_millis(200);

        let mut first = SqliteStore::open(&path, timeout).unwrap();
        let mut second = SqliteStore::open(&path, timeout).unwrap();
        let (course_id, _) = seed_course(&mut first);

        {
            let mut writer = first.begin_course().unwrap();
            writer.delete_children(&course_id).unwrap();
            assert!(second.begin_course().is_err());
        }

        let mut writer = second.begin_course().unwrap();
        writer.delete_children(&course_id).unwrap();
        writer.commit().unwrap();
        assert_eq!(first.child_counts(&course_id).unwrap(), ChildCounts::default());
    }
}
