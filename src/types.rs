//! Core identifier types for the orchestration graph.
//!
//! [`NodeKind`] names the vertices of the turn graph; [`StateField`]
//! names the channels of [`ConversationState`](crate::state::ConversationState)
//! that reducers operate on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node within the turn graph.
///
/// `Start` and `End` are virtual endpoints: they are never executed and never
/// registered as nodes. `End` doubles as the terminal routing sentinel: a
/// handler whose single outgoing edge points at `End` finishes the turn.
///
/// # Examples
///
/// ```rust
/// use promograph::types::NodeKind;
///
/// let supervisor = NodeKind::Custom("supervisor".to_string());
/// assert!(supervisor.is_custom());
/// assert_eq!(NodeKind::from("End"), NodeKind::End);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Virtual entry point. The first edge of every graph leaves from here.
    Start,
    /// Virtual terminal sentinel. Every handler's single edge points here.
    End,
    /// An executable node identified by a user-defined string.
    Custom(String),
}

impl NodeKind {
    /// Returns `true` if this is the virtual [`Start`](Self::Start) endpoint.
    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }

    /// Returns `true` if this is the terminal [`End`](Self::End) sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Returns `true` if this is an executable custom node.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// The routing-target id, present only for executable custom nodes.
    #[must_use]
    pub fn as_target(&self) -> Option<&str> {
        match self {
            Self::Custom(name) => Some(name),
            Self::Start | Self::End => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::End => write!(f, "End"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        match s {
            "Start" => NodeKind::Start,
            "End" => NodeKind::End,
            other => NodeKind::Custom(other.to_string()),
        }
    }
}

/// Identifies one field of the conversation state.
///
/// Each field carries its own reducer discipline: `Messages` appends,
/// `Context` and `WorkflowData` shallow-merge, the rest are last-write-wins.
/// [`StateField::ALL`] fixes the order reducers are applied in, so patch
/// application is deterministic by construction, not by map iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateField {
    /// Append-only conversation transcript.
    Messages,
    /// Latest resolved intent label.
    Intent,
    /// Session context (page, role, session id).
    Context,
    /// Next-node routing decision.
    Decision,
    /// Handler-specific accumulation bag.
    WorkflowData,
    /// Latest error message, if any.
    Error,
}

impl StateField {
    /// All fields, in the order patches are reduced into the state.
    pub const ALL: [StateField; 6] = [
        StateField::Messages,
        StateField::Intent,
        StateField::Context,
        StateField::Decision,
        StateField::WorkflowData,
        StateField::Error,
    ];
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Messages => write!(f, "messages"),
            Self::Intent => write!(f, "intent"),
            Self::Context => write!(f, "context"),
            Self::Decision => write!(f, "decision"),
            Self::WorkflowData => write!(f, "workflow_data"),
            Self::Error => write!(f, "error"),
        }
    }
}
