use super::Reducer;
use crate::{node::StatePatch, state::ConversationState};

/// Shallow-merges a context patch: incoming `Some` fields override.
///
/// The session id is immutable for a conversation's lifetime. Once the base
/// holds a non-empty session id, an incoming patch with a different one is
/// ignored and logged.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct MergeContext;

impl Reducer for MergeContext {
    fn apply(&self, state: &mut ConversationState, patch: &StatePatch) {
        let Some(ctx_patch) = &patch.context else {
            return;
        };
        if let Some(page) = &ctx_patch.current_page {
            state.context.current_page = page.clone();
        }
        if let Some(role) = &ctx_patch.user_role {
            state.context.user_role = role.clone();
        }
        if let Some(session_id) = &ctx_patch.session_id {
            if state.context.session_id.is_empty() {
                state.context.session_id = session_id.clone();
            } else if state.context.session_id != *session_id {
                tracing::warn!(
                    current = %state.context.session_id,
                    incoming = %session_id,
                    "ignoring attempt to replace an established session id"
                );
            }
        }
        if let Some(campaign_data) = &ctx_patch.campaign_data {
            state.context.campaign_data = Some(campaign_data.clone());
        }
    }
}

/// Shallow-merges workflow data: incoming keys override existing entries.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct MergeWorkflowData;

impl Reducer for MergeWorkflowData {
    fn apply(&self, state: &mut ConversationState, patch: &StatePatch) {
        if let Some(update) = &patch.workflow_data
            && !update.is_empty()
        {
            for (k, v) in update.iter() {
                state.workflow_data.insert(k.clone(), v.clone());
            }
        }
    }
}
