//! Conversation state threaded through the turn graph.
//!
//! [`ConversationState`] is the single value every node reads and every patch
//! merges into. Each field has a declared reducer discipline (see
//! [`crate::reducers`]): the transcript appends, context and workflow data
//! shallow-merge, and the scalar fields are last-write-wins.
//!
//! The core owns no storage: the calling layer constructs a fresh state per
//! inbound message (supplying prior transcript and context from its own
//! store), runs exactly one turn, and takes the merged state back.
//!
//! # Examples
//!
//! ```rust
//! use promograph::state::ConversationState;
//! use serde_json::json;
//!
//! let state = ConversationState::builder()
//!     .with_user_message("show me analytics")
//!     .with_current_page("/analytics")
//!     .with_workflow_data("priority", json!("high"))
//!     .build();
//!
//! assert_eq!(state.messages.len(), 1);
//! assert_eq!(state.context.current_page, "/analytics");
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::message::Message;

/// Session context carried alongside the transcript.
///
/// Merged shallowly: an incoming [`ContextPatch`] overrides only the fields it
/// sets. The session id is immutable once non-empty; merge attempts to
/// replace it are ignored with a warning.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Route of the screen the user is currently on (e.g. "/dashboard").
    pub current_page: String,
    /// Role of the current user (e.g. "admin").
    pub user_role: String,
    /// Stable identifier for this conversation's lifetime.
    pub session_id: String,
    /// Campaign data the calling layer wants handlers to see.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_data: Option<Value>,
}

impl ConversationContext {
    /// Default page used when the caller supplies no context.
    pub const DEFAULT_PAGE: &'static str = "unknown";
    /// Default role used when the caller supplies no context.
    pub const DEFAULT_ROLE: &'static str = "admin";

    /// A fully defaulted context with a fresh session id.
    #[must_use]
    pub fn defaulted() -> Self {
        Self {
            current_page: Self::DEFAULT_PAGE.to_string(),
            user_role: Self::DEFAULT_ROLE.to_string(),
            session_id: fresh_session_id(),
            campaign_data: None,
        }
    }

    /// Fills any empty field with its default, preserving set fields.
    ///
    /// This is what the supervisor applies before classification so the rest
    /// of the turn always sees a complete context.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        Self {
            current_page: non_empty_or(&self.current_page, Self::DEFAULT_PAGE),
            user_role: non_empty_or(&self.user_role, Self::DEFAULT_ROLE),
            session_id: if self.session_id.is_empty() {
                fresh_session_id()
            } else {
                self.session_id.clone()
            },
            campaign_data: self.campaign_data.clone(),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn fresh_session_id() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}

/// Partial context update; `Some` fields override the base on merge.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ContextPatch {
    pub current_page: Option<String>,
    pub user_role: Option<String>,
    pub session_id: Option<String>,
    pub campaign_data: Option<Value>,
}

impl ContextPatch {
    /// A patch setting every field from a complete context.
    #[must_use]
    pub fn from_full(context: &ConversationContext) -> Self {
        Self {
            current_page: Some(context.current_page.clone()),
            user_role: Some(context.user_role.clone()),
            session_id: Some(context.session_id.clone()),
            campaign_data: context.campaign_data.clone(),
        }
    }
}

/// The single state value threaded through one pass of the turn graph.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Ordered transcript, oldest first. Append-only within a turn.
    pub messages: Vec<Message>,
    /// Classification label resolved by the supervisor. Last-write-wins.
    pub user_intent: Option<String>,
    /// Session context. Shallow-merged.
    pub context: ConversationContext,
    /// Routing target for the next node, or the terminal sentinel ("End").
    pub agent_decision: Option<String>,
    /// Open key/value bag for handler-specific accumulation. Shallow-merged.
    pub workflow_data: FxHashMap<String, Value>,
    /// Latest error message, cleared at the start of each turn.
    pub error: Option<String>,
}

impl ConversationState {
    /// Creates a state initialized with one user message and a defaulted
    /// context. The primary constructor for starting a conversation.
    #[must_use]
    pub fn new_with_user_message(user_text: &str) -> Self {
        Self {
            messages: vec![Message::user(user_text)],
            context: ConversationContext::defaulted(),
            ..Default::default()
        }
    }

    /// Creates a state from an existing transcript, for callers restoring a
    /// conversation from their own storage.
    #[must_use]
    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            context: ConversationContext::defaulted(),
            ..Default::default()
        }
    }

    /// Fluent builder for states with custom context and workflow data.
    #[must_use]
    pub fn builder() -> ConversationStateBuilder {
        ConversationStateBuilder::default()
    }

    /// The most recent message, if the transcript is non-empty.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the latest user-authored message this turn, if any.
    #[must_use]
    pub fn latest_user_input(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.has_role(Message::USER))
            .map(|m| m.content.as_str())
    }
}

/// Fluent builder for [`ConversationState`].
///
/// Useful for tests and for callers assembling a state from persisted
/// transcript plus fresh context.
#[derive(Debug, Default)]
pub struct ConversationStateBuilder {
    messages: Vec<Message>,
    context: ConversationContext,
    workflow_data: FxHashMap<String, Value>,
}

impl ConversationStateBuilder {
    /// Appends a user message to the builder's transcript.
    #[must_use]
    pub fn with_user_message(mut self, content: &str) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Appends an assistant message to the builder's transcript.
    #[must_use]
    pub fn with_assistant_message(mut self, content: &str) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }

    /// Appends a message with an arbitrary role.
    #[must_use]
    pub fn with_message(mut self, role: &str, content: &str) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Sets the current page in the context.
    #[must_use]
    pub fn with_current_page(mut self, page: &str) -> Self {
        self.context.current_page = page.to_string();
        self
    }

    /// Sets the user role in the context.
    #[must_use]
    pub fn with_user_role(mut self, role: &str) -> Self {
        self.context.user_role = role.to_string();
        self
    }

    /// Sets the session id in the context.
    #[must_use]
    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.context.session_id = session_id.to_string();
        self
    }

    /// Inserts a workflow data entry.
    #[must_use]
    pub fn with_workflow_data(mut self, key: &str, value: Value) -> Self {
        self.workflow_data.insert(key.to_string(), value);
        self
    }

    /// Builds the final state. Context fields left unset stay empty; the
    /// supervisor fills defaults at the start of the turn.
    #[must_use]
    pub fn build(self) -> ConversationState {
        ConversationState {
            messages: self.messages,
            context: self.context,
            workflow_data: self.workflow_data,
            ..Default::default()
        }
    }
}
