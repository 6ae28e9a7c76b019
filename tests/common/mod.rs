//! Shared fixtures for integration tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use promograph::capabilities::{Capabilities, InMemoryAdStore, MemorySink};
use promograph::graph::{AgentGraph, default_graph_with_config, node_ids};
use promograph::message::Message;
use promograph::node::{AgentNode, NodeContext, NodeError, StatePatch};
use promograph::state::ConversationState;
use promograph::config::RuntimeConfig;

/// A state holding a single user message on an unspecified page.
#[allow(dead_code)]
pub fn state_with_user(text: &str) -> ConversationState {
    ConversationState::new_with_user_message(text)
}

/// A state holding a single user message on a specific page.
#[allow(dead_code)]
pub fn state_on_page(page: &str, text: &str) -> ConversationState {
    ConversationState::builder()
        .with_current_page(page)
        .with_user_message(text)
        .build()
}

/// Default graph plus handles to its injected capabilities.
#[allow(dead_code)]
pub struct TestHarness {
    pub graph: AgentGraph,
    pub store: Arc<InMemoryAdStore>,
    pub sink: Arc<MemorySink>,
}

#[allow(dead_code)]
pub fn harness() -> TestHarness {
    harness_with_config(RuntimeConfig::default())
}

#[allow(dead_code)]
pub fn harness_with_config(config: RuntimeConfig) -> TestHarness {
    let store = Arc::new(InMemoryAdStore::new());
    let sink = Arc::new(MemorySink::new());
    let capabilities = Capabilities::new(store.clone(), sink.clone());
    let graph = default_graph_with_config(capabilities, config)
        .expect("default graph compiles");
    TestHarness { graph, store, sink }
}

/// Count of assistant messages in a transcript.
#[allow(dead_code)]
pub fn assistant_count(state: &ConversationState) -> usize {
    state
        .messages
        .iter()
        .filter(|m| m.has_role(Message::ASSISTANT))
        .count()
}

/// Handler that always fails, for recovery tests.
#[allow(dead_code)]
pub struct FailingNode {
    pub reason: &'static str,
}

#[async_trait]
impl AgentNode for FailingNode {
    async fn run(
        &self,
        _state: &ConversationState,
        _ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        Err(NodeError::MissingInput {
            what: self.reason.to_string(),
        })
    }
}

/// Handler that sleeps past any reasonable deadline.
#[allow(dead_code)]
pub struct SlowNode {
    pub delay: Duration,
}

#[async_trait]
impl AgentNode for SlowNode {
    async fn run(
        &self,
        _state: &ConversationState,
        _ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        tokio::time::sleep(self.delay).await;
        Ok(StatePatch::new().with_messages(vec![Message::assistant("finally done")]))
    }
}

/// Replaces the general assistant with the given node in an otherwise
/// minimal graph, so empty-input turns route straight into it.
#[allow(dead_code)]
pub fn graph_with_general_assistant(
    node: Arc<dyn AgentNode>,
    config: RuntimeConfig,
) -> AgentGraph {
    use promograph::classifier::KeywordClassifier;
    use promograph::graph::GraphBuilder;
    use promograph::handlers::ErrorHandlerNode;
    use promograph::supervisor::SupervisorNode;
    use promograph::types::NodeKind;

    GraphBuilder::new()
        .add_node(
            NodeKind::from(node_ids::SUPERVISOR),
            Arc::new(SupervisorNode::new(Arc::new(KeywordClassifier))),
        )
        .add_node(NodeKind::from(node_ids::GENERAL_ASSISTANT), node)
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
        .add_edge(NodeKind::from(node_ids::GENERAL_ASSISTANT), NodeKind::End)
        .add_edge(NodeKind::from(node_ids::ERROR_HANDLER), NodeKind::End)
        .with_runtime_config(config)
        .compile()
        .expect("test graph compiles")
}
