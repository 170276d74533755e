//! Telegram Bot API transport
//!
//! Wire types for inbound updates and a small HTTP client for the methods
//! the bot uses.

mod client;
mod error;
pub mod types;

pub use client::TelegramClient;
pub use error::{TelegramError, TelegramErrorKind};
pub use types::Update;
