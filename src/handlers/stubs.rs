//! Overview handlers for capabilities without a full conversational flow
//! yet.

use async_trait::async_trait;

use crate::message::Message;
use crate::node::{AgentNode, NodeContext, NodeError, StatePatch};
use crate::state::ConversationState;
use crate::templates::{self, ids};

/// Replies with a capability overview and follow-up suggestions.
///
/// Filter, analytics, merchant, and general assistance all share this shape;
/// only the template differs.
pub struct CapabilityOverviewNode {
    template_id: &'static str,
}

impl CapabilityOverviewNode {
    pub fn filter_agent() -> Self {
        Self {
            template_id: ids::FILTER_OVERVIEW,
        }
    }

    pub fn analytics_agent() -> Self {
        Self {
            template_id: ids::ANALYTICS_OVERVIEW,
        }
    }

    pub fn merchant_agent() -> Self {
        Self {
            template_id: ids::MERCHANT_OVERVIEW,
        }
    }

    pub fn general_assistant() -> Self {
        Self {
            template_id: ids::GENERAL_OVERVIEW,
        }
    }
}

#[async_trait]
impl AgentNode for CapabilityOverviewNode {
    async fn run(
        &self,
        state: &ConversationState,
        ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        ctx.emit("respond", format!("overview template {}", self.template_id))?;
        let rendered = templates::render(self.template_id, Default::default(), &state.context)?;
        let message = Message::assistant_with_actions(&rendered.template, rendered.actions);
        Ok(StatePatch::new().with_messages(vec![message]))
    }
}
