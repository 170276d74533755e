//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of one end-user chat (the Telegram chat id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Which blank the conversation is currently filling.
///
/// Stored as the integers 0, 1 and 2. `Idle` is both the state of a chat
/// that has never pressed the button and the state after a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    AwaitingAuthor,
    AwaitingTitle,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown conversation step value: {0}")]
pub struct UnknownStep(pub i64);

impl Step {
    /// Integer stored in the `user_state.step` column
    pub fn as_i64(self) -> i64 {
        match self {
            Step::Idle => 0,
            Step::AwaitingAuthor => 1,
            Step::AwaitingTitle => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::AwaitingAuthor => "awaiting_author",
            Step::AwaitingTitle => "awaiting_title",
        }
    }
}

impl TryFrom<i64> for Step {
    type Error = UnknownStep;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Step::Idle),
            1 => Ok(Step::AwaitingAuthor),
            2 => Ok(Step::AwaitingTitle),
            other => Err(UnknownStep(other)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-chat conversation record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: Step,
    /// Captured while in `AwaitingAuthor`
    pub author: Option<String>,
    /// Captured on the free-text message that completes a cycle
    pub title: Option<String>,
}

impl ConversationState {
    pub fn with_step(mut self, step: Step) -> Self {
        self.step = step;
        self
    }

    /// Author to query with; an uncaptured author queries as empty
    pub fn author_or_empty(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }
}
