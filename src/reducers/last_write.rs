use super::Reducer;
use crate::{node::StatePatch, state::ConversationState, types::StateField};

/// Last-write-wins reducer for the scalar fields.
///
/// `patch.field ?? base.field`: a patch that sets the field replaces the base
/// value; a patch that leaves it `None` keeps the base value untouched.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct TakeLatest(pub StateField);

impl Reducer for TakeLatest {
    fn apply(&self, state: &mut ConversationState, patch: &StatePatch) {
        match self.0 {
            StateField::Intent => {
                if let Some(intent) = &patch.user_intent {
                    state.user_intent = Some(intent.clone());
                }
            }
            StateField::Decision => {
                if let Some(decision) = &patch.agent_decision {
                    state.agent_decision = Some(decision.clone());
                }
            }
            StateField::Error => {
                if let Some(error) = &patch.error {
                    state.error = Some(error.clone());
                }
            }
            // Messages, Context and WorkflowData have dedicated reducers.
            StateField::Messages | StateField::Context | StateField::WorkflowData => {}
        }
    }
}
