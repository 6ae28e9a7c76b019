//! Supervisor node: classifies the latest user message and decides which
//! handler runs this turn.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::extract::extract_workflow_data;
use crate::graph::node_ids;
use crate::node::{AgentNode, NodeContext, NodeError, StatePatch};
use crate::state::{ConversationState, ContextPatch};

/// The routing node at the head of every turn.
///
/// Produces a patch with the detected intent, the routing decision, the
/// normalized context, and any workflow data mined from the utterance. It
/// never appends messages; responses belong to the handler it routes to.
pub struct SupervisorNode {
    classifier: Arc<dyn Classifier>,
}

impl SupervisorNode {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl AgentNode for SupervisorNode {
    async fn run(
        &self,
        state: &ConversationState,
        ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        // Normalize whatever context the caller supplied.
        let full_context = state.context.with_defaults();
        let context_patch = ContextPatch::from_full(&full_context);

        let Some(user_input) = state.latest_user_input() else {
            // Nothing to classify; hand off to the general assistant.
            ctx.emit("routing", "no user input, defaulting to general assistant")?;
            return Ok(StatePatch::new()
                .with_agent_decision(node_ids::GENERAL_ASSISTANT)
                .with_context(context_patch));
        };

        match self.classifier.classify(user_input, &full_context) {
            Ok(intent) => {
                let decision = intent.route();
                debug!(%intent, decision, "intent classified");
                ctx.emit("routing", format!("intent {intent} routed to {decision}"))?;
                Ok(StatePatch::new()
                    .with_user_intent(intent.as_str())
                    .with_agent_decision(decision)
                    .with_context(context_patch)
                    .with_workflow_data(extract_workflow_data(user_input, intent)))
            }
            Err(err) => {
                warn!(error = %err, "classification failed, routing to error handler");
                Ok(StatePatch::new()
                    .with_agent_decision(node_ids::ERROR_HANDLER)
                    .with_context(context_patch)
                    .with_error(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, KeywordClassifier, UserIntent};
    use crate::event_bus::EventBus;
    use crate::state::ConversationContext;
    use serde_json::json;

    fn ctx(bus: &EventBus) -> NodeContext {
        NodeContext {
            node_id: node_ids::SUPERVISOR.to_string(),
            turn: 1,
            event_sender: bus.sender(),
        }
    }

    fn supervisor() -> SupervisorNode {
        SupervisorNode::new(Arc::new(KeywordClassifier))
    }

    #[tokio::test]
    async fn empty_conversation_defaults_to_general_assistant() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_messages(vec![]);

        let patch = supervisor().run(&state, ctx(&bus)).await.unwrap();

        assert_eq!(patch.agent_decision.as_deref(), Some(node_ids::GENERAL_ASSISTANT));
        assert!(patch.user_intent.is_none());
        assert!(patch.messages.is_none());
        // Context defaults are still applied.
        let context = patch.context.unwrap();
        assert_eq!(
            context.current_page.as_deref(),
            Some(ConversationContext::DEFAULT_PAGE)
        );
    }

    #[tokio::test]
    async fn campaign_request_is_routed_with_mined_workflow_data() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message(
            "I want to create a $2000 campaign for my restaurant targeting families",
        );

        let patch = supervisor().run(&state, ctx(&bus)).await.unwrap();

        assert_eq!(patch.agent_decision.as_deref(), Some(node_ids::CAMPAIGN_AGENT));
        let data = patch.workflow_data.unwrap();
        assert_eq!(data.get("budget"), Some(&json!(2000.0)));
        assert_eq!(data.get("businessType"), Some(&json!("restaurant")));
        assert_eq!(data.get("targetAudience"), Some(&json!("families")));
    }

    #[tokio::test]
    async fn analytics_request_routes_to_analytics_agent() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message("show me analytics");

        let patch = supervisor().run(&state, ctx(&bus)).await.unwrap();

        assert_eq!(patch.agent_decision.as_deref(), Some(node_ids::ANALYTICS_AGENT));
        assert_eq!(
            patch.user_intent.as_deref(),
            Some(UserIntent::AnalyticsQuery.as_str())
        );
    }

    #[tokio::test]
    async fn supervisor_never_appends_messages() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message("hello");

        let patch = supervisor().run(&state, ctx(&bus)).await.unwrap();
        assert!(patch.messages.is_none());
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(
            &self,
            _text: &str,
            _context: &ConversationContext,
        ) -> Result<UserIntent, ClassifierError> {
            Err(ClassifierError::Backend {
                reason: "model offline".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn classifier_failure_routes_to_error_handler() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message("anything");
        let node = SupervisorNode::new(Arc::new(FailingClassifier));

        let patch = node.run(&state, ctx(&bus)).await.unwrap();

        assert_eq!(patch.agent_decision.as_deref(), Some(node_ids::ERROR_HANDLER));
        assert!(patch.error.unwrap().contains("model offline"));
    }

    #[tokio::test]
    async fn routing_is_deterministic_across_runs() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message("I want to create an ad");

        let first = supervisor().run(&state, ctx(&bus)).await.unwrap();
        let second = supervisor().run(&state, ctx(&bus)).await.unwrap();

        assert_eq!(first.agent_decision, second.agent_decision);
        assert_eq!(first.user_intent, second.user_intent);
    }
}
