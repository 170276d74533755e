//! Database schema and types

/// SQL schema for initialization
///
/// `user_state` holds the conversation step, `song_data` the captured
/// author and title. Both are keyed by chat id and created together.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS user_state (
    chat_id INTEGER PRIMARY KEY,
    step INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS song_data (
    chat_id INTEGER PRIMARY KEY,
    author TEXT,
    title TEXT,
    updated_at TEXT NOT NULL
);
";
