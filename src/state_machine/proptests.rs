//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::effect::{AUTHOR_BUTTON_DATA, UNAVAILABLE_TEXT};
use super::*;
use crate::lyrics::LyricsError;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Idle),
        Just(Step::AwaitingAuthor),
        Just(Step::AwaitingTitle),
    ]
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (
        arb_step(),
        proptest::option::of("[a-zA-Z ]{1,20}"),
        proptest::option::of("[a-zA-Z ]{1,20}"),
    )
        .prop_map(|(step, author, title)| ConversationState {
            step,
            author,
            title,
        })
}

fn arb_state_not_awaiting_author() -> impl Strategy<Value = ConversationState> {
    arb_state().prop_filter("step must not be AwaitingAuthor", |s| {
        s.step != Step::AwaitingAuthor
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}"
}

fn arb_lyrics_error() -> impl Strategy<Value = LyricsError> {
    prop_oneof![
        (4097usize..10_000).prop_map(LyricsError::too_long),
        "[a-z ]{1,20}".prop_map(LyricsError::timeout),
        "[a-z ]{1,20}".prop_map(LyricsError::not_found),
        "[a-z ]{1,20}".prop_map(LyricsError::network),
        "[a-z ]{1,20}".prop_map(LyricsError::invalid_response),
    ]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        ("[a-z]{1,10}", any::<i64>())
            .prop_map(|(data, message_id)| Event::ButtonTap { data, message_id }),
        arb_text().prop_map(|text| Event::TextMessage { text }),
    ]
}

fn sends(effects: &[Effect]) -> Vec<&OutboundAction> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send(action) => Some(action),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Start yields exactly one keyboard with a single "author" button
    #[test]
    fn prop_start_yields_single_keyboard(state in arb_state()) {
        let result = transition(&state, Event::Start);
        prop_assert_eq!(result.effects.len(), 1);
        match &result.effects[0] {
            Effect::Send(OutboundAction::SendTextWithKeyboard { buttons, .. }) => {
                prop_assert_eq!(buttons.len(), 1);
                prop_assert_eq!(buttons[0].data.as_str(), AUTHOR_BUTTON_DATA);
            }
            other => prop_assert!(false, "unexpected effect {:?}", other),
        }
        prop_assert_eq!(result.new_state, state);
    }

    /// The author button always leads to AwaitingAuthor with one edit
    #[test]
    fn prop_author_button_always_awaits_author(state in arb_state(), message_id in any::<i64>()) {
        let result = transition(&state, Event::ButtonTap {
            data: AUTHOR_BUTTON_DATA.to_string(),
            message_id,
        });
        prop_assert_eq!(result.new_state.step, Step::AwaitingAuthor);
        prop_assert_eq!(&result.new_state.author, &state.author);
        prop_assert_eq!(&result.new_state.title, &state.title);
        let sent = sends(&result.effects);
        prop_assert_eq!(sent.len(), 1);
        let is_edit = matches!(
            sent[0],
            OutboundAction::EditMessageText { message_id: id, .. } if *id == message_id
        );
        prop_assert!(is_edit);
    }

    /// Any other button payload changes nothing and says nothing
    #[test]
    fn prop_other_button_is_noop(state in arb_state(), data in "[a-z]{1,10}", message_id in any::<i64>()) {
        prop_assume!(data != AUTHOR_BUTTON_DATA);
        let result = transition(&state, Event::ButtonTap { data, message_id });
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    /// Text while awaiting the author captures it and prompts for the title
    #[test]
    fn prop_text_captures_author(state in arb_state(), text in arb_text()) {
        let state = state.with_step(Step::AwaitingAuthor);
        let result = transition(&state, Event::TextMessage { text: text.clone() });
        prop_assert_eq!(result.new_state.step, Step::AwaitingTitle);
        prop_assert_eq!(result.new_state.author.as_deref(), Some(text.as_str()));
        prop_assert_eq!(&result.new_state.title, &state.title);
        prop_assert_eq!(sends(&result.effects).len(), 1);
        let is_plain_text = matches!(
            result.effects.last(),
            Some(Effect::Send(OutboundAction::SendText { .. }))
        );
        prop_assert!(is_plain_text);
    }

    /// Text in any other step is a title: step resets and lyrics are fetched
    #[test]
    fn prop_text_captures_title_and_fetches(state in arb_state_not_awaiting_author(), text in arb_text()) {
        let result = transition(&state, Event::TextMessage { text: text.clone() });
        prop_assert_eq!(result.new_state.step, Step::Idle);
        prop_assert_eq!(result.new_state.title.as_deref(), Some(text.as_str()));
        prop_assert_eq!(&result.new_state.author, &state.author);

        let fetches: Vec<_> = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::FetchLyrics { .. }))
            .collect();
        prop_assert_eq!(fetches.len(), 1);
        prop_assert_eq!(fetches[0], &Effect::FetchLyrics {
            author: state.author_or_empty().to_string(),
            title: text,
        });
    }

    /// Whenever state changes, it is persisted before anything is sent
    #[test]
    fn prop_persist_precedes_sends(state in arb_state(), event in arb_user_event()) {
        let result = transition(&state, event);
        if result.new_state != state {
            prop_assert_eq!(result.effects.first(), Some(&Effect::PersistState));
        }
        let persist_count = result.effects.iter().filter(|e| **e == Effect::PersistState).count();
        prop_assert!(persist_count <= 1);
    }

    /// A failed fetch never changes state and always re-arms the keyboard
    #[test]
    fn prop_fetch_failure_rearms(state in arb_state(), error in arb_lyrics_error()) {
        let unavailable = error.is_unavailable();
        let result = transition(&state, Event::LyricsFetched { result: Err(error) });
        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.effects.len(), 2);
        prop_assert_eq!(result.effects.last(), Some(&Effect::initial_keyboard()));
        if unavailable {
            prop_assert_eq!(&result.effects[0], &Effect::send_text(UNAVAILABLE_TEXT));
        }
    }

    /// Successful lyrics are sent verbatim, followed by the keyboard
    #[test]
    fn prop_fetch_success_sends_lyrics(state in arb_state(), lyrics in "[a-zA-Z\n ]{1,200}") {
        let result = transition(&state, Event::LyricsFetched { result: Ok(lyrics.clone()) });
        prop_assert_eq!(result.effects, vec![Effect::send_text(lyrics), Effect::initial_keyboard()]);
    }

    /// A full cycle always ends idle, whatever the inputs
    #[test]
    fn prop_full_cycle_returns_to_idle(author in arb_text(), title in arb_text(), message_id in any::<i64>()) {
        let mut state = ConversationState::default();
        for event in [
            Event::Start,
            Event::ButtonTap { data: AUTHOR_BUTTON_DATA.to_string(), message_id },
            Event::TextMessage { text: author.clone() },
            Event::TextMessage { text: title.clone() },
        ] {
            state = transition(&state, event).new_state;
        }
        prop_assert_eq!(state.step, Step::Idle);
        prop_assert_eq!(state.author, Some(author));
        prop_assert_eq!(state.title, Some(title));
    }
}
