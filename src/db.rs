//! Database module
//!
//! Provides persistence for per-chat conversation state.

mod schema;

pub use schema::SCHEMA;

use crate::state_machine::state::UnknownStep;
use crate::state_machine::{ChatId, ConversationState, Step};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt state row: {0}")]
    InvalidStep(#[from] UnknownStep),
    #[error("Database connection poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Chat Records ====================

    /// Create the state and song rows for a chat. Idempotent.
    #[allow(dead_code)] // Used in tests
    pub fn ensure_chat_record(&self, chat_id: ChatId) -> DbResult<()> {
        let conn = self.conn()?;
        insert_chat_rows(&conn, chat_id)
    }

    /// Number of chats ever seen
    #[allow(dead_code)] // Used in tests
    pub fn chat_count(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM user_state", [], |row| row.get(0))?)
    }

    // ==================== Step ====================

    /// Current step; `Idle` for chats never seen
    #[allow(dead_code)] // Used in tests
    pub fn get_step(&self, chat_id: ChatId) -> DbResult<Step> {
        let conn = self.conn()?;
        let raw: Option<i64> = conn
            .query_row(
                "SELECT step FROM user_state WHERE chat_id = ?1",
                params![chat_id.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(Step::try_from(raw.unwrap_or(0))?)
    }

    #[allow(dead_code)] // Used in tests
    pub fn set_step(&self, chat_id: ChatId, step: Step) -> DbResult<()> {
        let conn = self.conn()?;
        insert_chat_rows(&conn, chat_id)?;
        conn.execute(
            "UPDATE user_state SET step = ?1, updated_at = ?2 WHERE chat_id = ?3",
            params![step.as_i64(), Utc::now().to_rfc3339(), chat_id.0],
        )?;
        Ok(())
    }

    // ==================== Song Data ====================

    #[allow(dead_code)] // Used in tests
    pub fn get_author(&self, chat_id: ChatId) -> DbResult<Option<String>> {
        self.get_song_field(chat_id, SongField::Author)
    }

    #[allow(dead_code)] // Used in tests
    pub fn set_author(&self, chat_id: ChatId, author: &str) -> DbResult<()> {
        self.set_song_field(chat_id, SongField::Author, author)
    }

    #[allow(dead_code)] // Used in tests
    pub fn get_title(&self, chat_id: ChatId) -> DbResult<Option<String>> {
        self.get_song_field(chat_id, SongField::Title)
    }

    #[allow(dead_code)] // Used in tests
    pub fn set_title(&self, chat_id: ChatId, title: &str) -> DbResult<()> {
        self.set_song_field(chat_id, SongField::Title, title)
    }

    fn get_song_field(&self, chat_id: ChatId, field: SongField) -> DbResult<Option<String>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM song_data WHERE chat_id = ?1", field.column());
        let value: Option<Option<String>> = conn
            .query_row(&sql, params![chat_id.0], |row| row.get(0))
            .optional()?;
        Ok(value.flatten())
    }

    fn set_song_field(&self, chat_id: ChatId, field: SongField, value: &str) -> DbResult<()> {
        let conn = self.conn()?;
        insert_chat_rows(&conn, chat_id)?;
        let sql = format!(
            "UPDATE song_data SET {} = ?1, updated_at = ?2 WHERE chat_id = ?3",
            field.column()
        );
        conn.execute(&sql, params![value, Utc::now().to_rfc3339(), chat_id.0])?;
        Ok(())
    }

    // ==================== Whole State ====================

    /// Load the full conversation state, creating the chat's rows on first contact
    pub fn load_state(&self, chat_id: ChatId) -> DbResult<ConversationState> {
        let conn = self.conn()?;
        insert_chat_rows(&conn, chat_id)?;
        let (step, author, title): (i64, Option<String>, Option<String>) = conn.query_row(
            "SELECT u.step, s.author, s.title
             FROM user_state u JOIN song_data s ON s.chat_id = u.chat_id
             WHERE u.chat_id = ?1",
            params![chat_id.0],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(ConversationState {
            step: Step::try_from(step)?,
            author,
            title,
        })
    }

    /// Write step, author and title in one transaction
    pub fn save_state(&self, chat_id: ChatId, state: &ConversationState) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        insert_chat_rows(&tx, chat_id)?;
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE user_state SET step = ?1, updated_at = ?2 WHERE chat_id = ?3",
            params![state.step.as_i64(), now, chat_id.0],
        )?;
        tx.execute(
            "UPDATE song_data SET author = ?1, title = ?2, updated_at = ?3 WHERE chat_id = ?4",
            params![state.author, state.title, now, chat_id.0],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum SongField {
    Author,
    Title,
}

impl SongField {
    fn column(self) -> &'static str {
        match self {
            SongField::Author => "author",
            SongField::Title => "title",
        }
    }
}

fn insert_chat_rows(conn: &Connection, chat_id: ChatId) -> DbResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO user_state (chat_id, step, updated_at) VALUES (?1, 0, ?2)",
        params![chat_id.0, now],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO song_data (chat_id, author, title, updated_at) VALUES (?1, NULL, NULL, ?2)",
        params![chat_id.0, now],
    )?;
    Ok(())
}
