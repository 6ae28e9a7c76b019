use super::Reducer;
use crate::{node::StatePatch, state::ConversationState};

/// Appends patch messages to the transcript, preserving insertion order.
///
/// The transcript is append-only: base messages always precede patch
/// messages, and nothing is dropped or reordered.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct AppendMessages;

impl Reducer for AppendMessages {
    fn apply(&self, state: &mut ConversationState, patch: &StatePatch) {
        if let Some(new_messages) = &patch.messages
            && !new_messages.is_empty()
        {
            state.messages.extend(new_messages.iter().cloned());
        }
    }
}
