use proptest::prelude::*;
use rustc_hash::FxHashMap;
use serde_json::json;

use promograph::message::Message;
use promograph::node::StatePatch;
use promograph::reducers::{ReducerRegistry, merge};
use promograph::state::{ContextPatch, ConversationState};

mod common;
use common::*;

#[test]
fn messages_append_preserves_existing_history() {
    let state = state_with_user("hello");
    let patch = StatePatch::new().with_messages(vec![Message::assistant("hi there")]);

    let merged = merge(&state, &patch);

    assert_eq!(merged.messages.len(), 2);
    assert_eq!(merged.messages[0].content, "hello");
    assert_eq!(merged.messages[1].content, "hi there");
}

#[test]
fn empty_message_patch_changes_nothing() {
    let state = state_with_user("hello");

    let merged = merge(&state, &StatePatch::new().with_messages(vec![]));
    assert_eq!(merged.messages.len(), 1);

    let merged = merge(&state, &StatePatch::new());
    assert_eq!(merged, state);
}

#[test]
fn workflow_data_merges_shallowly_with_patch_winning() {
    let state = ConversationState::builder()
        .with_user_message("hi")
        .with_workflow_data("keep", json!("original"))
        .with_workflow_data("replace", json!(1))
        .build();

    let mut data = FxHashMap::default();
    data.insert("replace".to_string(), json!(2));
    data.insert("fresh".to_string(), json!(true));
    let merged = merge(&state, &StatePatch::new().with_workflow_data(data));

    assert_eq!(merged.workflow_data.get("keep"), Some(&json!("original")));
    assert_eq!(merged.workflow_data.get("replace"), Some(&json!(2)));
    assert_eq!(merged.workflow_data.get("fresh"), Some(&json!(true)));
}

#[test]
fn intent_and_decision_take_the_latest_write() {
    let state = state_with_user("hi");

    let first = merge(
        &state,
        &StatePatch::new()
            .with_user_intent("ad_creation")
            .with_agent_decision("campaign_agent"),
    );
    let second = merge(
        &first,
        &StatePatch::new()
            .with_user_intent("analytics_query")
            .with_agent_decision("analytics_agent"),
    );

    assert_eq!(second.user_intent.as_deref(), Some("analytics_query"));
    assert_eq!(second.agent_decision.as_deref(), Some("analytics_agent"));

    // A patch without those fields leaves them untouched.
    let third = merge(&second, &StatePatch::new());
    assert_eq!(third.user_intent, second.user_intent);
}

#[test]
fn context_patch_overrides_only_supplied_fields() {
    let state = ConversationState::builder()
        .with_user_message("hi")
        .with_current_page("/dashboard")
        .with_user_role("admin")
        .build();

    let patch = ContextPatch {
        current_page: Some("/analytics".to_string()),
        ..Default::default()
    };
    let merged = merge(&state, &StatePatch::new().with_context(patch));

    assert_eq!(merged.context.current_page, "/analytics");
    assert_eq!(merged.context.user_role, "admin");
}

#[test]
fn session_id_is_immutable_once_set() {
    let state = ConversationState::builder()
        .with_user_message("hi")
        .with_session_id("session_fixed")
        .build();

    let patch = ContextPatch {
        session_id: Some("session_other".to_string()),
        ..Default::default()
    };
    let merged = merge(&state, &StatePatch::new().with_context(patch));

    assert_eq!(merged.context.session_id, "session_fixed");
}

#[test]
fn error_field_takes_the_latest_write() {
    let state = state_with_user("hi");
    let merged = merge(&state, &StatePatch::new().with_error("first"));
    let merged = merge(&merged, &StatePatch::new().with_error("second"));
    assert_eq!(merged.error.as_deref(), Some("second"));
}

#[test]
fn registry_apply_all_matches_pure_merge() {
    let registry = ReducerRegistry::default();
    let base = state_with_user("hi");
    let patch = StatePatch::new()
        .with_messages(vec![Message::assistant("yo")])
        .with_agent_decision("general_assistant");

    let pure = merge(&base, &patch);
    let mut in_place = base.clone();
    registry.apply_all(&mut in_place, &patch);

    assert_eq!(pure, in_place);
}

proptest! {
    /// The transcript only ever grows, by exactly the patch length.
    #[test]
    fn prop_messages_are_append_only(
        history_len in 0usize..8,
        patch_len in 0usize..8,
    ) {
        let mut builder = ConversationState::builder();
        for i in 0..history_len {
            builder = builder.with_user_message(&format!("m{i}"));
        }
        let state = builder.build();

        let new_messages: Vec<Message> = (0..patch_len)
            .map(|i| Message::assistant(&format!("r{i}")))
            .collect();
        let merged = merge(&state, &StatePatch::new().with_messages(new_messages));

        prop_assert_eq!(merged.messages.len(), history_len + patch_len);
        // Prefix is untouched.
        for (before, after) in state.messages.iter().zip(merged.messages.iter()) {
            prop_assert_eq!(before, after);
        }
    }

    /// Merging never loses workflow keys.
    #[test]
    fn prop_workflow_merge_keeps_all_keys(
        base_keys in prop::collection::hash_set("[a-z]{1,6}", 0..6),
        patch_keys in prop::collection::hash_set("[a-z]{1,6}", 0..6),
    ) {
        let mut builder = ConversationState::builder().with_user_message("hi");
        for key in &base_keys {
            builder = builder.with_workflow_data(key, json!("base"));
        }
        let state = builder.build();

        let mut data = FxHashMap::default();
        for key in &patch_keys {
            data.insert(key.clone(), json!("patch"));
        }
        let merged = merge(&state, &StatePatch::new().with_workflow_data(data));

        for key in base_keys.union(&patch_keys) {
            prop_assert!(merged.workflow_data.contains_key(key));
        }
        // Patch values win on collision.
        for key in &patch_keys {
            prop_assert_eq!(merged.workflow_data.get(key), Some(&json!("patch")));
        }
    }
}
