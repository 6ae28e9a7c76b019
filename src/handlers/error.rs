//! Error handler node: turns a recorded error into an apology message.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::json;

use crate::message::Message;
use crate::node::{AgentNode, NodeContext, NodeError, StatePatch};
use crate::state::ConversationState;
use crate::templates::{self, ids};

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Terminal handler for any turn where something went wrong.
///
/// Reads `state.error` (set by the supervisor or by the executor when a
/// handler fails) and responds with a templated apology. Never fails over
/// template content; the catalog entry is static.
#[derive(Debug, Default)]
pub struct ErrorHandlerNode;

#[async_trait]
impl AgentNode for ErrorHandlerNode {
    async fn run(
        &self,
        state: &ConversationState,
        ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        let error_message = state.error.as_deref().unwrap_or(UNKNOWN_ERROR);
        ctx.emit("respond", format!("reporting error: {error_message}"))?;

        let mut variables = FxHashMap::default();
        variables.insert(
            "errorContext".to_string(),
            json!("processing your request"),
        );
        variables.insert("errorMessage".to_string(), json!(error_message));

        let rendered = templates::render(ids::ERROR_GENERAL, variables, &state.context)?;
        let message = Message::assistant_with_actions(&rendered.template, rendered.actions);
        Ok(StatePatch::new().with_messages(vec![message]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBus;
    use crate::graph::node_ids;

    fn ctx(bus: &EventBus) -> NodeContext {
        NodeContext {
            node_id: node_ids::ERROR_HANDLER.to_string(),
            turn: 1,
            event_sender: bus.sender(),
        }
    }

    #[tokio::test]
    async fn reports_the_recorded_error() {
        let bus = EventBus::default();
        let mut state = ConversationState::new_with_user_message("do the thing");
        state.error = Some("boom".to_string());

        let patch = ErrorHandlerNode.run(&state, ctx(&bus)).await.unwrap();

        let messages = patch.messages.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("boom"));
        assert!(messages[0].content.contains("I apologize"));
    }

    #[tokio::test]
    async fn missing_error_falls_back_to_unknown() {
        let bus = EventBus::default();
        let state = ConversationState::new_with_user_message("do the thing");

        let patch = ErrorHandlerNode.run(&state, ctx(&bus)).await.unwrap();

        let messages = patch.messages.unwrap();
        assert!(messages[0].content.contains(UNKNOWN_ERROR));
    }
}
