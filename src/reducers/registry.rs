use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::{
    node::StatePatch,
    reducers::{AppendMessages, MergeContext, MergeWorkflowData, Reducer, ReducerError, TakeLatest},
    state::ConversationState,
    types::StateField,
};

/// Registry mapping each state field to its reducers.
///
/// The default registry wires the merge discipline the state declares:
/// append for messages, shallow merge for context and workflow data, and
/// last-write-wins for intent, decision, and error. [`apply_all`] walks
/// [`StateField::ALL`] so application order is explicit, not a map-iteration
/// accident.
///
/// [`apply_all`]: ReducerRegistry::apply_all
#[derive(Clone)]
pub struct ReducerRegistry {
    reducer_map: FxHashMap<StateField, Vec<Arc<dyn Reducer>>>,
}

/// Whether a patch carries meaningful data for the field, letting the
/// registry skip reducers with nothing to do.
fn field_guard(field: StateField, patch: &StatePatch) -> bool {
    match field {
        StateField::Messages => patch
            .messages
            .as_ref()
            .map(|v| !v.is_empty())
            .unwrap_or(false),
        StateField::Intent => patch.user_intent.is_some(),
        StateField::Context => patch.context.is_some(),
        StateField::Decision => patch.agent_decision.is_some(),
        StateField::WorkflowData => patch
            .workflow_data
            .as_ref()
            .map(|m| !m.is_empty())
            .unwrap_or(false),
        StateField::Error => patch.error.is_some(),
    }
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(StateField::Messages, Arc::new(AppendMessages))
            .register(StateField::Intent, Arc::new(TakeLatest(StateField::Intent)))
            .register(StateField::Context, Arc::new(MergeContext))
            .register(
                StateField::Decision,
                Arc::new(TakeLatest(StateField::Decision)),
            )
            .register(StateField::WorkflowData, Arc::new(MergeWorkflowData))
            .register(StateField::Error, Arc::new(TakeLatest(StateField::Error)));
        registry
    }
}

impl ReducerRegistry {
    /// Creates a registry with no reducers registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            reducer_map: FxHashMap::default(),
        }
    }

    /// Registers a reducer for a field. Multiple reducers for the same field
    /// are applied in registration order.
    pub fn register(&mut self, field: StateField, reducer: Arc<dyn Reducer>) -> &mut Self {
        self.reducer_map.entry(field).or_default().push(reducer);
        self
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with_reducer(mut self, field: StateField, reducer: Arc<dyn Reducer>) -> Self {
        self.register(field, reducer);
        self
    }

    /// Applies the reducers registered for one field, skipping when the patch
    /// has no applicable data.
    pub fn try_update(
        &self,
        field: StateField,
        state: &mut ConversationState,
        patch: &StatePatch,
    ) -> Result<(), ReducerError> {
        if !field_guard(field, patch) {
            return Ok(());
        }
        if let Some(reducers) = self.reducer_map.get(&field) {
            for reducer in reducers {
                reducer.apply(state, patch);
            }
            Ok(())
        } else {
            Err(ReducerError::UnknownField(field))
        }
    }

    /// Applies a patch across every field, in [`StateField::ALL`] order.
    ///
    /// Fields with registered reducers but no patch data are skipped; fields
    /// with no reducers at all are skipped silently here (the default
    /// registry covers every field, so a miss means a deliberately pruned
    /// custom registry).
    pub fn apply_all(&self, state: &mut ConversationState, patch: &StatePatch) {
        for field in StateField::ALL {
            if let Err(err) = self.try_update(field, state, patch) {
                tracing::warn!(%field, %err, "skipping field with no registered reducer");
            }
        }
    }
}
