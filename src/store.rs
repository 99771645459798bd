//! Reference texts and scored results, persisted in SQLite.
//!
//! [`ReferenceTextSource`] and [`ResultSink`] are the seams the pipeline
//! depends on; [`SqliteStore`] implements both on a single connection.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("problem {0} not found")]
    NotFound(i64),

    #[error("failed to persist result: {0}")]
    Persist(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database lock poisoned")]
    Lock,
}

/// Produces the reference text of a problem.
pub trait ReferenceTextSource {
    fn get_text(&self, problem_id: i64) -> Result<String, StoreError>;
}

/// Consumes scored answers.
pub trait ResultSink {
    fn save(
        &self,
        user_id: i64,
        problem_id: i64,
        transcribed_text: &str,
        score: f64,
        source_location: &str,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: i64,
    pub answered_text: String,
    pub score: f64,
    pub try_file_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Lock)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS problems (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                problem_id INTEGER NOT NULL,
                answered_text TEXT NOT NULL,
                score REAL NOT NULL,
                try_file_path TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS results_user_idx ON results(user_id);",
        )?;
        Ok(())
    }

    /// Insert a problem and return its id.
    pub fn add_problem(&self, text: &str) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO problems (text, created_at) VALUES (?1, ?2)",
            params![text, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recently created problems first.
    pub fn recent_problems(&self, limit: u32) -> Result<Vec<Problem>, StoreError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, text, created_at FROM problems ORDER BY created_at DESC, id DESC LIMIT ?1")?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(Problem {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    created_at: parse_timestamp(row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn results_for_user(&self, user_id: i64) -> Result<Vec<StoredResult>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, problem_id, answered_text, score, try_file_path, created_at
             FROM results WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(StoredResult {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    problem_id: row.get(2)?,
                    answered_text: row.get(3)?,
                    score: row.get(4)?,
                    try_file_path: row.get(5)?,
                    created_at: parse_timestamp(row.get::<_, String>(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// Fixed-width so that text ordering matches time ordering.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Rows are written by this module in RFC 3339; anything else maps to the epoch.
fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

impl ReferenceTextSource for SqliteStore {
    fn get_text(&self, problem_id: i64) -> Result<String, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT text FROM problems WHERE id = ?1",
            params![problem_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::NotFound(problem_id))
    }
}

impl ResultSink for SqliteStore {
    fn save(
        &self,
        user_id: i64,
        problem_id: i64,
        transcribed_text: &str,
        score: f64,
        source_location: &str,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO results (user_id, problem_id, answered_text, score, try_file_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                problem_id,
                transcribed_text,
                score,
                source_location,
                now_timestamp()
            ],
        )
        .map_err(|e| StoreError::Persist(e.to_string()))?;
        Ok(())
    }
}
