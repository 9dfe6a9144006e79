//! Schema bootstrap for the SQLite catalog.

use rusqlite::Connection;
use std::time::Duration;
use tracing::debug;

/// Current schema version, kept in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    id               TEXT PRIMARY KEY,
    external_id      TEXT NOT NULL UNIQUE,
    db_id            INTEGER,
    created_at       TEXT,
    description      TEXT,
    display_name     TEXT NOT NULL,
    numbers_of_holes INTEGER,
    course_location  TEXT,
    difficulty       TEXT,
    tags             TEXT NOT NULL DEFAULT '[]',
    image_url        TEXT,
    video_url        TEXT,
    latitude         REAL,
    longitude        REAL,
    google_map_url   TEXT,
    synced_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tees (
    id              TEXT PRIMARY KEY,
    course_id       TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    ordinal         INTEGER NOT NULL,
    external_key    TEXT,
    par             INTEGER,
    course_distance REAL,
    course_rating   REAL,
    slope           REAL,
    gender          TEXT,
    kind            TEXT,
    name            TEXT
);
CREATE INDEX IF NOT EXISTS idx_tees_course ON tees(course_id, ordinal);

CREATE TABLE IF NOT EXISTS holes (
    id         TEXT PRIMARY KEY,
    course_id  TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    hole_index INTEGER NOT NULL,
    name       TEXT
);
CREATE INDEX IF NOT EXISTS idx_holes_course ON holes(course_id, hole_index);

CREATE TABLE IF NOT EXISTS hole_tees (
    id           TEXT PRIMARY KEY,
    hole_id      TEXT NOT NULL REFERENCES holes(id) ON DELETE CASCADE,
    tee_id       TEXT NOT NULL REFERENCES tees(id) ON DELETE CASCADE,
    distance     REAL,
    stroke_index INTEGER,
    par          INTEGER
);
CREATE INDEX IF NOT EXISTS idx_hole_tees_hole ON hole_tees(hole_id);

CREATE TABLE IF NOT EXISTS plays (
    id            TEXT PRIMARY KEY,
    course_id     TEXT NOT NULL REFERENCES courses(id),
    tee_id        TEXT REFERENCES tees(id) ON DELETE SET NULL,
    tee_ordinal   INTEGER NOT NULL,
    holes_played  TEXT NOT NULL CHECK (holes_played IN ('front', 'back', 'full')),
    overall_score INTEGER,
    note          TEXT,
    played_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plays_course ON plays(course_id, played_at);

CREATE TABLE IF NOT EXISTS hole_scores (
    id         TEXT PRIMARY KEY,
    play_id    TEXT NOT NULL REFERENCES plays(id) ON DELETE CASCADE,
    hole_id    TEXT REFERENCES holes(id) ON DELETE SET NULL,
    hole_index INTEGER NOT NULL,
    score      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_hole_scores_play ON hole_scores(play_id);
"#;

/// Configure the connection and create any missing tables.
pub fn init_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    // In-memory databases stay in "memory" mode.
    match conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0)) {
        Ok(mode) => debug!("Catalog journal mode: {}", mode),
        Err(e) => debug!("Could not enable WAL journal mode: {}", e),
    }
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(SCHEMA)?;

    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        debug!("Upgrading catalog schema {} -> {}", version, SCHEMA_VERSION);
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_connection(&conn, Duration::from_millis(100)).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in ["courses", "hole_scores", "hole_tees", "holes", "plays", "tees"] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_file_database_uses_wal() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::open(temp_dir.path().join("catalog.db")).unwrap();
        init_connection(&conn, Duration::from_millis(100)).unwrap();

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn test_init_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        init_connection(&conn, Duration::from_millis(100)).unwrap();
        init_connection(&conn, Duration::from_millis(100)).unwrap();
    }
}
