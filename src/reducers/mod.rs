//! Field reducers: how patches merge into the conversation state.
//!
//! Every field of [`ConversationState`](crate::state::ConversationState)
//! declares a reducer: the transcript appends, context and workflow data
//! shallow-merge, and the scalar fields take the latest write. The
//! [`ReducerRegistry`] applies the reducers in the fixed order of
//! [`StateField::ALL`](crate::types::StateField::ALL), so repeated patch
//! application within a turn is deterministic.

mod append_messages;
mod map_merge;
mod last_write;
mod registry;

pub use append_messages::AppendMessages;
pub use map_merge::{MergeContext, MergeWorkflowData};
pub use last_write::TakeLatest;
pub use registry::ReducerRegistry;

use std::fmt;

use crate::node::StatePatch;
use crate::state::ConversationState;
use crate::types::StateField;

/// Unified reducer trait: mutates the state using a patch delta.
pub trait Reducer: Send + Sync {
    fn apply(&self, state: &mut ConversationState, patch: &StatePatch);
}

/// Pure merge of a base state with a patch using the default reducers.
///
/// Never mutates `base` or `patch`; returns a new value. Applying a sequence
/// of patches one at a time through this function is equivalent to the
/// executor's in-place merging.
///
/// # Examples
///
/// ```
/// use promograph::message::Message;
/// use promograph::node::StatePatch;
/// use promograph::reducers::merge;
/// use promograph::state::ConversationState;
///
/// let base = ConversationState::new_with_user_message("hi");
/// let patch = StatePatch::new().with_messages(vec![Message::assistant("hello")]);
/// let merged = merge(&base, &patch);
/// assert_eq!(base.messages.len(), 1);
/// assert_eq!(merged.messages.len(), 2);
/// ```
#[must_use]
pub fn merge(base: &ConversationState, patch: &StatePatch) -> ConversationState {
    let registry = ReducerRegistry::default();
    let mut next = base.clone();
    registry.apply_all(&mut next, patch);
    next
}

/// Error raised when a registry has no reducer for a field with data.
#[derive(Debug)]
pub enum ReducerError {
    UnknownField(StateField),
}

impl fmt::Display for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducerError::UnknownField(field) => {
                write!(f, "no reducers registered for field: {field}")
            }
        }
    }
}

impl std::error::Error for ReducerError {}
