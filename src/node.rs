//! Node execution framework for the turn graph.
//!
//! This module provides the core abstractions for executable nodes: the
//! [`AgentNode`] trait, the execution context, the [`StatePatch`] partial
//! update, and node error types.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

use crate::event_bus::Event;
use crate::message::Message;
use crate::state::{ContextPatch, ConversationState};

/// An executable node in the turn graph.
///
/// A node receives the current conversation state and returns a *patch*, a
/// partial state, never the full prior state. The executor merges patches
/// through the field reducers, so returning only what changed keeps the merge
/// rules well-defined and guarantees history is never silently dropped.
///
/// Nodes should be deterministic functions of their input state; side effects
/// go through the injected capability interfaces
/// (see [`crate::capabilities`]).
#[async_trait]
pub trait AgentNode: Send + Sync {
    /// Execute this node against the given state.
    async fn run(
        &self,
        state: &ConversationState,
        ctx: NodeContext,
    ) -> Result<StatePatch, NodeError>;
}

/// Execution context passed to nodes.
///
/// Carries the node's identity, the turn counter, and a channel for emitting
/// diagnostic events that the executor forwards to `tracing` after the turn.
#[derive(Clone, Debug)]
pub struct NodeContext {
    /// Identifier of this node in the graph.
    pub node_id: String,
    /// Monotonic turn number for this graph instance.
    pub turn: u64,
    /// Channel into the graph's event bus.
    pub event_sender: flume::Sender<Event>,
}

impl NodeContext {
    /// Emit a node-scoped diagnostic event enriched with this context's
    /// metadata.
    pub fn emit(
        &self,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), NodeContextError> {
        self.event_sender
            .send(Event::node_message_with_meta(
                self.node_id.clone(),
                self.turn,
                scope,
                message,
            ))
            .map_err(|_| NodeContextError::EventBusUnavailable)
    }
}

/// Partial state update returned by node execution.
///
/// All fields are optional; a node sets only what it changed. The executor
/// merges patches via the per-field reducers in [`crate::reducers`].
///
/// # Examples
///
/// ```
/// use promograph::node::StatePatch;
/// use promograph::message::Message;
///
/// let patch = StatePatch::new()
///     .with_messages(vec![Message::assistant("Done.")])
///     .with_agent_decision("End");
/// assert!(patch.user_intent.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StatePatch {
    /// Messages to append to the transcript.
    pub messages: Option<Vec<Message>>,
    /// New intent label (last-write-wins).
    pub user_intent: Option<String>,
    /// Context fields to overlay (shallow merge).
    pub context: Option<ContextPatch>,
    /// New routing decision (last-write-wins).
    pub agent_decision: Option<String>,
    /// Workflow entries to overlay (shallow merge).
    pub workflow_data: Option<FxHashMap<String, Value>>,
    /// Error message to record (last-write-wins).
    pub error: Option<String>,
}

impl StatePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets messages to append.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Sets the resolved intent label.
    #[must_use]
    pub fn with_user_intent(mut self, intent: impl Into<String>) -> Self {
        self.user_intent = Some(intent.into());
        self
    }

    /// Sets the context overlay.
    #[must_use]
    pub fn with_context(mut self, context: ContextPatch) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the routing decision.
    #[must_use]
    pub fn with_agent_decision(mut self, decision: impl Into<String>) -> Self {
        self.agent_decision = Some(decision.into());
        self
    }

    /// Sets workflow data entries to overlay.
    #[must_use]
    pub fn with_workflow_data(mut self, data: FxHashMap<String, Value>) -> Self {
        self.workflow_data = Some(data);
        self
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Errors that can occur when using [`NodeContext`] methods.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeContextError {
    /// Event could not be sent because the bus is disconnected.
    #[error("failed to emit event: event bus unavailable")]
    #[diagnostic(
        code(promograph::node::event_bus_unavailable),
        help("The event bus may be disconnected. Check that the graph is still alive.")
    )]
    EventBusUnavailable,
}

/// Errors that can occur during node execution.
///
/// Any of these is recovered at the executor boundary: the error is recorded
/// in the state and the error handler produces the turn's response. Nothing
/// propagates to the caller of `run_turn`.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing from the state.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(promograph::node::missing_input),
        help("Check that the supervisor produced the required workflow data.")
    )]
    MissingInput { what: String },

    /// A node exceeded the configured per-node deadline.
    #[error("node '{node}' exceeded its deadline after {waited_ms}ms")]
    #[diagnostic(
        code(promograph::node::deadline),
        help("Raise the node deadline in RuntimeConfig or simplify the handler.")
    )]
    Deadline { node: String, waited_ms: u128 },

    /// JSON serialization or deserialization failed.
    #[error(transparent)]
    #[diagnostic(code(promograph::node::serde_json))]
    Serde(#[from] serde_json::Error),

    /// A response template could not be rendered.
    #[error(transparent)]
    #[diagnostic(code(promograph::node::template))]
    Template(#[from] crate::templates::TemplateError),

    /// Event bus communication error.
    #[error("event bus error: {0}")]
    #[diagnostic(code(promograph::node::event_bus))]
    EventBus(#[from] NodeContextError),
}
