use serde_json::json;

use promograph::message::Message;
use promograph::state::ConversationState;

mod common;
use common::*;

#[tokio::test]
async fn empty_conversation_gets_the_general_welcome() {
    let harness = harness();
    let state = ConversationState::new_with_messages(vec![]);

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("general_assistant"));
    assert_eq!(assistant_count(&state), 1);
    let reply = state.last_message().unwrap();
    assert!(reply.has_role(Message::ASSISTANT));
    assert!(reply.content.contains("What would you like to work on today?"));
}

#[tokio::test]
async fn campaign_text_routes_to_the_campaign_agent_with_mined_data() {
    let harness = harness();
    let state = state_with_user(
        "I want to create a $2000 campaign for my restaurant targeting families",
    );

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("campaign_agent"));
    assert_eq!(state.workflow_data.get("budget"), Some(&json!(2000.0)));
    assert_eq!(
        state.workflow_data.get("businessType"),
        Some(&json!("restaurant"))
    );
    assert_eq!(
        state.workflow_data.get("targetAudience"),
        Some(&json!("families"))
    );
    assert_eq!(assistant_count(&state), 1);
}

#[tokio::test]
async fn analytics_request_gets_the_analytics_overview() {
    let harness = harness();
    let state = state_with_user("show me analytics");

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("analytics_agent"));
    assert_eq!(state.user_intent.as_deref(), Some("analytics_query"));
    assert_eq!(assistant_count(&state), 1);
    assert!(state.last_message().unwrap().content.contains("Analytics"));
}

#[tokio::test]
async fn filter_request_gets_the_filter_overview() {
    let harness = harness();
    let state = state_with_user("set up a product filter");

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("filter_agent"));
    assert!(state.last_message().unwrap().content.contains("Filter"));
}

#[tokio::test]
async fn support_request_gets_the_merchant_overview() {
    let harness = harness();
    let state = state_with_user("I need help with something");

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("merchant_agent"));
    assert!(state.last_message().unwrap().content.contains("Merchant"));
}

#[tokio::test]
async fn same_input_routes_the_same_way_every_time() {
    let harness = harness();

    let first = harness
        .graph
        .run_turn(state_with_user("optimize my underperforming ads"))
        .await;
    let second = harness
        .graph
        .run_turn(state_with_user("optimize my underperforming ads"))
        .await;

    assert_eq!(first.agent_decision, second.agent_decision);
    assert_eq!(first.user_intent, second.user_intent);
}

#[tokio::test]
async fn context_page_breaks_classification_ties() {
    let harness = harness();
    let state = state_on_page("/analytics", "good morning");

    let state = harness.graph.run_turn(state).await;

    assert_eq!(state.agent_decision.as_deref(), Some("analytics_agent"));
}
