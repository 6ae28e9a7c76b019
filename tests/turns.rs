use std::sync::Arc;
use std::time::Duration;

use promograph::capabilities::Severity;
use promograph::config::RuntimeConfig;
use promograph::message::Message;
use promograph::state::ConversationState;

mod common;
use common::*;

#[tokio::test]
async fn handler_failure_is_answered_with_an_apology() {
    let graph = graph_with_general_assistant(
        Arc::new(FailingNode { reason: "boom" }),
        RuntimeConfig::default(),
    );
    let state = ConversationState::new_with_messages(vec![]);

    let state = graph.run_turn(state).await;

    assert!(state.error.as_deref().unwrap().contains("boom"));
    assert_eq!(assistant_count(&state), 1);
    let reply = state.last_message().unwrap();
    assert!(reply.content.contains("I apologize"));
    assert!(reply.content.contains("boom"));
}

#[tokio::test]
async fn deadline_expiry_routes_to_the_error_handler() {
    let graph = graph_with_general_assistant(
        Arc::new(SlowNode {
            delay: Duration::from_millis(500),
        }),
        RuntimeConfig::default().with_node_deadline(Duration::from_millis(25)),
    );
    let state = ConversationState::new_with_messages(vec![]);

    let state = graph.run_turn(state).await;

    assert!(state.error.as_deref().unwrap().contains("deadline"));
    assert_eq!(assistant_count(&state), 1);
    assert!(state.last_message().unwrap().content.contains("I apologize"));
}

#[tokio::test]
async fn stale_errors_do_not_leak_into_later_turns() {
    let harness = harness();
    let mut state = state_with_user("show me analytics");
    state.error = Some("left over from last turn".to_string());

    let state = harness.graph.run_turn(state).await;

    assert!(state.error.is_none());
    assert!(!state
        .last_message()
        .unwrap()
        .content
        .contains("left over from last turn"));
}

#[tokio::test]
async fn every_turn_appends_exactly_one_assistant_message() {
    let harness = harness();
    let inputs = [
        "I want to create an ad",
        "show me analytics",
        "set up a filter",
        "help me out",
        "just rambling about nothing",
    ];

    for input in inputs {
        let state = harness.graph.run_turn(state_with_user(input)).await;
        assert_eq!(assistant_count(&state), 1, "input: {input}");
        assert!(state.last_message().unwrap().has_role(Message::ASSISTANT));
    }
}

/// Drives a full ad-creation conversation on the creation page and checks
/// the ad lands in the store exactly once.
#[tokio::test]
async fn full_ad_creation_conversation_persists_one_ad() {
    let harness = harness();
    let page = "/campaign-manager/ads-create";

    let mut state = state_on_page(page, "I want to create an ad for Starbucks");
    state = harness.graph.run_turn(state).await;
    assert!(state.last_message().unwrap().content.contains("Creating Your Ad"));

    let turns = [
        "call it \"Morning Rush\"",
        "the bogo coffee offer please",
        "native text is fine",
        "$2.50 per activation and $5.00 per redemption",
    ];
    for input in turns {
        let before = state.messages.len();
        state.messages.push(Message::user(input));
        state = harness.graph.run_turn(state).await;
        assert_eq!(state.messages.len(), before + 2, "input: {input}");
        assert!(harness.store.records().is_empty(), "created too early: {input}");
    }

    // Everything collected: the last reply is the preview.
    let preview = state.last_message().unwrap();
    assert!(preview.content.contains("Morning Rush"));
    assert!(preview.content.contains("Starbucks"));
    assert!(preview.content.contains("2.5"));

    state.messages.push(Message::user("create it"));
    state = harness.graph.run_turn(state).await;

    let records = harness.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Morning Rush");
    assert_eq!(records[0].merchant_id, "m1");
    assert_eq!(records[0].offer_id, "mcm_o1_2023");
    assert_eq!(records[0].media_type, "native");
    assert_eq!(records[0].cost_per_activation, 2.5);
    assert_eq!(records[0].cost_per_redemption, 5.0);

    let delivered = harness.sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].severity, Severity::Success);
    assert!(state
        .last_message()
        .unwrap()
        .content
        .contains("successfully created your ad"));
}

#[tokio::test]
async fn off_page_ad_request_offers_navigation_instead_of_collecting() {
    let harness = harness();
    let state = state_on_page("/dashboard", "I want to create a banner ad for Nike");

    let state = harness.graph.run_turn(state).await;

    let reply = state.last_message().unwrap();
    assert!(reply.content.contains("ad creation page"));
    let actions = reply.actions();
    assert!(!actions.is_empty());
    assert_eq!(actions[0].action, "navigateToPageAndPerform");
    assert!(state.workflow_data.contains_key("pendingNavigation"));
    assert!(harness.store.records().is_empty());
}

#[tokio::test]
async fn session_context_survives_the_whole_turn() {
    let harness = harness();
    let state = ConversationState::builder()
        .with_session_id("session_abc123")
        .with_current_page("/dashboard")
        .with_user_message("show me analytics")
        .build();

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.context.session_id, "session_abc123");
    assert_eq!(state.context.current_page, "/dashboard");
}
