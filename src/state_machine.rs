//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in, persists the returned state and executes
//! the returned effects in order.

pub mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Button, Effect, OutboundAction};
pub use event::{Event, InboundUpdate};
pub use state::{ChatId, ConversationState, Step};
pub use transition::{transition, TransitionResult};
