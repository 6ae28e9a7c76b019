//! Graph assembly and turn execution.
//!
//! [`GraphBuilder`] wires nodes and routing edges and validates the shape at
//! [`GraphBuilder::compile`]; [`AgentGraph::run_turn`] then executes one
//! conversational turn: supervisor, one routed handler, reducer merges in
//! between. Compilation is the only fallible surface; a turn always comes
//! back with a state the caller can render.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::timeout;
use tracing::{debug, error, warn};

use miette::Diagnostic;
use thiserror::Error;

use crate::capabilities::Capabilities;
use crate::classifier::KeywordClassifier;
use crate::config::RuntimeConfig;
use crate::event_bus::EventBus;
use crate::handlers::{CampaignAgentNode, CapabilityOverviewNode, ErrorHandlerNode};
use crate::message::Message;
use crate::node::{AgentNode, NodeContext, NodeError, StatePatch};
use crate::reducers::ReducerRegistry;
use crate::state::ConversationState;
use crate::supervisor::SupervisorNode;
use crate::types::NodeKind;

/// Well-known node identifiers.
pub mod node_ids {
    pub const SUPERVISOR: &str = "supervisor";
    pub const CAMPAIGN_AGENT: &str = "campaign_agent";
    pub const FILTER_AGENT: &str = "filter_agent";
    pub const ANALYTICS_AGENT: &str = "analytics_agent";
    pub const MERCHANT_AGENT: &str = "merchant_agent";
    pub const GENERAL_ASSISTANT: &str = "general_assistant";
    pub const ERROR_HANDLER: &str = "error_handler";
}

/// Routing function: inspects merged state and names the next node.
pub type RoutePredicate = Arc<dyn Fn(&ConversationState) -> String + Send + Sync>;

/// A conditional edge out of a node.
pub struct ConditionalEdge {
    pub from: NodeKind,
    pub predicate: RoutePredicate,
}

/// Errors surfaced at graph compilation.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphCompileError {
    #[error("graph has no entry edge from Start")]
    #[diagnostic(
        code(promograph::graph::no_entry),
        help("Add an edge from NodeKind::Start to the supervisor node.")
    )]
    MissingEntryEdge,

    #[error("entry edge points at unregistered node: {target}")]
    #[diagnostic(code(promograph::graph::bad_entry))]
    UnknownEntryTarget { target: String },

    #[error("required node missing: {node_id}")]
    #[diagnostic(
        code(promograph::graph::missing_node),
        help("Both the supervisor and the error handler must be registered.")
    )]
    MissingRequiredNode { node_id: String },

    #[error("edge references unknown node: {node}")]
    #[diagnostic(code(promograph::graph::unknown_node))]
    UnknownNode { node: String },

    #[error("terminal node has an outgoing edge: {node}")]
    #[diagnostic(
        code(promograph::graph::nonterminal_handler),
        help("Handlers must route to End; only the supervisor fans out.")
    )]
    NonTerminalHandler { node: String },
}

/// Builder for [`AgentGraph`].
#[derive(Default)]
pub struct GraphBuilder {
    nodes: FxHashMap<String, Arc<dyn AgentNode>>,
    edges: Vec<(NodeKind, NodeKind)>,
    conditional_edges: Vec<ConditionalEdge>,
    config: Option<RuntimeConfig>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node under an id. Start and End are structural and cannot
    /// carry behavior; attempts to register them are ignored with a warning.
    pub fn add_node(mut self, kind: NodeKind, node: Arc<dyn AgentNode>) -> Self {
        match kind {
            NodeKind::Start | NodeKind::End => {
                warn!(%kind, "ignoring attempt to register a virtual node");
            }
            NodeKind::Custom(id) => {
                if self.nodes.insert(id.clone(), node).is_some() {
                    warn!(node_id = %id, "node registered twice, keeping the last");
                }
            }
        }
        self
    }

    /// Adds an unconditional edge.
    pub fn add_edge(mut self, from: NodeKind, to: NodeKind) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Adds a routing edge whose predicate names the target at runtime.
    pub fn add_conditional_edge(mut self, from: NodeKind, predicate: RoutePredicate) -> Self {
        self.conditional_edges.push(ConditionalEdge { from, predicate });
        self
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validates the wiring and produces an executable graph.
    pub fn compile(self) -> Result<AgentGraph, GraphCompileError> {
        let entry = self
            .edges
            .iter()
            .find(|(from, _)| from.is_start())
            .ok_or(GraphCompileError::MissingEntryEdge)?;
        let entry_target = entry
            .1
            .as_target()
            .ok_or_else(|| GraphCompileError::UnknownEntryTarget {
                target: entry.1.to_string(),
            })?
            .to_string();
        if !self.nodes.contains_key(&entry_target) {
            return Err(GraphCompileError::UnknownEntryTarget {
                target: entry_target,
            });
        }

        for required in [node_ids::SUPERVISOR, node_ids::ERROR_HANDLER] {
            if !self.nodes.contains_key(required) {
                return Err(GraphCompileError::MissingRequiredNode {
                    node_id: required.to_string(),
                });
            }
        }

        for (from, to) in &self.edges {
            for kind in [from, to] {
                if let Some(id) = kind.as_target()
                    && !self.nodes.contains_key(id)
                {
                    return Err(GraphCompileError::UnknownNode {
                        node: id.to_string(),
                    });
                }
            }
        }

        // Every registered handler except the supervisor must be terminal:
        // no plain or conditional edge may leave it.
        for id in self.nodes.keys().filter(|id| *id != node_ids::SUPERVISOR) {
            let leaves_plain = self
                .edges
                .iter()
                .any(|(from, to)| from.as_target() == Some(id) && !to.is_end());
            let leaves_conditional = self
                .conditional_edges
                .iter()
                .any(|edge| edge.from.as_target() == Some(id.as_str()));
            if leaves_plain || leaves_conditional {
                return Err(GraphCompileError::NonTerminalHandler { node: id.clone() });
            }
        }

        Ok(AgentGraph {
            nodes: self.nodes,
            conditional_edges: self.conditional_edges,
            reducers: ReducerRegistry::default(),
            config: self.config.unwrap_or_default(),
            event_bus: EventBus::new(),
            turn: AtomicU64::new(0),
        })
    }
}

/// A compiled, executable conversation graph.
pub struct AgentGraph {
    nodes: FxHashMap<String, Arc<dyn AgentNode>>,
    conditional_edges: Vec<ConditionalEdge>,
    reducers: ReducerRegistry,
    config: RuntimeConfig,
    event_bus: EventBus,
    turn: AtomicU64,
}

impl AgentGraph {
    /// Executes one conversational turn.
    ///
    /// Runs the supervisor, merges its patch, resolves the routing decision,
    /// runs the routed handler, and merges again. Any failure along the way
    /// is folded into the state and answered by the error handler, so the
    /// returned state always carries a response for the user.
    pub async fn run_turn(&self, mut state: ConversationState) -> ConversationState {
        let turn = self.turn.fetch_add(1, Ordering::Relaxed) + 1;
        // Stale errors from earlier turns must not leak into this one.
        state.error = None;

        match self.invoke(node_ids::SUPERVISOR, &state, turn).await {
            Ok(patch) => self.reducers.apply_all(&mut state, &patch),
            Err(err) => {
                error!(error = %err, "supervisor failed");
                state.error = Some(err.to_string());
                return self.recover(state, turn).await;
            }
        }

        let target = self.resolve_route(&state);
        debug!(turn, target = %target, "routing decision");

        match self.invoke(&target, &state, turn).await {
            Ok(patch) => self.reducers.apply_all(&mut state, &patch),
            Err(err) => {
                error!(error = %err, node = %target, "handler failed");
                state.error = Some(err.to_string());
                state = self.recover(state, turn).await;
            }
        }

        self.event_bus.flush_to_tracing();
        state
    }

    /// Applies the conditional edge out of the supervisor. A decision naming
    /// no registered node is a routing gap and lands on the error handler.
    fn resolve_route(&self, state: &ConversationState) -> String {
        let decision = self
            .conditional_edges
            .iter()
            .find(|edge| edge.from.as_target() == Some(node_ids::SUPERVISOR))
            .map(|edge| (edge.predicate)(state))
            .unwrap_or_else(|| node_ids::ERROR_HANDLER.to_string());

        if self.nodes.contains_key(&decision) {
            decision
        } else {
            warn!(%decision, "routing decision names no registered node");
            node_ids::ERROR_HANDLER.to_string()
        }
    }

    async fn invoke(
        &self,
        node_id: &str,
        state: &ConversationState,
        turn: u64,
    ) -> Result<StatePatch, NodeError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| NodeError::MissingInput {
                what: format!("registered node {node_id}"),
            })?;
        let ctx = NodeContext {
            node_id: node_id.to_string(),
            turn,
            event_sender: self.event_bus.sender(),
        };

        let deadline = self.config.node_deadline;
        match timeout(deadline, node.run(state, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(NodeError::Deadline {
                node: node_id.to_string(),
                waited_ms: deadline.as_millis(),
            }),
        }
    }

    /// Runs the error handler over a state whose `error` is set. If even
    /// that fails, appends a static apology so the turn still produces a
    /// reply.
    async fn recover(&self, mut state: ConversationState, turn: u64) -> ConversationState {
        match self.invoke(node_ids::ERROR_HANDLER, &state, turn).await {
            Ok(patch) => self.reducers.apply_all(&mut state, &patch),
            Err(err) => {
                error!(error = %err, "error handler itself failed");
                state.messages.push(Message::assistant(
                    "I apologize, but something went wrong while processing your request. \
                     Please try again.",
                ));
            }
        }
        self.event_bus.flush_to_tracing();
        state
    }
}

/// Builds the standard supervisor-and-handlers graph.
///
/// One supervisor at the entry, five handlers plus the error handler fanned
/// out behind a conditional edge keyed on `agent_decision`, every handler
/// terminal.
pub fn default_graph(capabilities: Capabilities) -> Result<AgentGraph, GraphCompileError> {
    default_graph_with_config(capabilities, RuntimeConfig::default())
}

/// [`default_graph`] with an explicit runtime configuration.
pub fn default_graph_with_config(
    capabilities: Capabilities,
    config: RuntimeConfig,
) -> Result<AgentGraph, GraphCompileError> {
    let supervisor = SupervisorNode::new(Arc::new(KeywordClassifier));

    GraphBuilder::new()
        .add_node(NodeKind::from(node_ids::SUPERVISOR), Arc::new(supervisor))
        .add_node(
            NodeKind::from(node_ids::CAMPAIGN_AGENT),
            Arc::new(CampaignAgentNode::new(capabilities)),
        )
        .add_node(
            NodeKind::from(node_ids::FILTER_AGENT),
            Arc::new(CapabilityOverviewNode::filter_agent()),
        )
        .add_node(
            NodeKind::from(node_ids::ANALYTICS_AGENT),
            Arc::new(CapabilityOverviewNode::analytics_agent()),
        )
        .add_node(
            NodeKind::from(node_ids::MERCHANT_AGENT),
            Arc::new(CapabilityOverviewNode::merchant_agent()),
        )
        .add_node(
            NodeKind::from(node_ids::GENERAL_ASSISTANT),
            Arc::new(CapabilityOverviewNode::general_assistant()),
        )
        .add_node(
            NodeKind::from(node_ids::ERROR_HANDLER),
            Arc::new(ErrorHandlerNode),
        )
        .add_edge(NodeKind::Start, NodeKind::from(node_ids::SUPERVISOR))
        .add_conditional_edge(
            NodeKind::from(node_ids::SUPERVISOR),
            Arc::new(|state: &ConversationState| {
                state
                    .agent_decision
                    .clone()
                    .unwrap_or_else(|| node_ids::ERROR_HANDLER.to_string())
            }),
        )
        .add_edge(NodeKind::from(node_ids::CAMPAIGN_AGENT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::FILTER_AGENT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::ANALYTICS_AGENT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::MERCHANT_AGENT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::GENERAL_ASSISTANT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::ERROR_HANDLER), NodeKind::End)
        .with_runtime_config(config)
        .compile()
}
