//! # Promograph: Conversational Campaign Agent Orchestration
//!
//! Promograph runs one conversational turn at a time through a small directed
//! graph: a supervisor classifies the latest user message and routes to
//! exactly one specialist handler, with typed per-field reducers merging each
//! node's partial state update back into the conversation.
//!
//! ## Core Concepts
//!
//! - **Supervisor**: intent classification and routing at the head of every turn
//! - **Handlers**: one specialist per capability; each turn appends exactly one assistant reply
//! - **State**: transcript, context, routing decision, and workflow scratch data
//! - **Reducers**: per-field merge rules (append-only transcript, shallow map merges, last write)
//! - **Templates**: static response catalog with `{{placeholder}}` interpolation and UI actions
//!
//! ## Quick Start
//!
//! ### Working with Messages
//!
//! ```
//! use promograph::message::Message;
//!
//! let user_msg = Message::user("I want to create an ad for Starbucks");
//! let assistant_msg = Message::assistant("Happy to help with that!");
//!
//! assert!(user_msg.has_role(Message::USER));
//! assert!(!user_msg.has_role(Message::ASSISTANT));
//! ```
//!
//! ### Running a Turn
//!
//! ```no_run
//! use promograph::capabilities::Capabilities;
//! use promograph::graph::default_graph;
//! use promograph::state::ConversationState;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = default_graph(Capabilities::in_memory())?;
//!
//! let state = ConversationState::new_with_user_message("show me analytics");
//! let state = graph.run_turn(state).await;
//!
//! // The routed handler appended exactly one assistant reply.
//! println!("{}", state.last_message().map(|m| m.content.as_str()).unwrap_or(""));
//! # Ok(())
//! # }
//! ```
//!
//! Turns are infallible by design: classification failures, handler errors,
//! and routing gaps all land on the error handler, which still answers the
//! user. Graph compilation is the only fallible surface.

pub mod capabilities;
pub mod classifier;
pub mod config;
pub mod directory;
pub mod event_bus;
pub mod extract;
pub mod graph;
pub mod handlers;
pub mod message;
pub mod node;
pub mod reducers;
pub mod state;
pub mod supervisor;
pub mod telemetry;
pub mod templates;
pub mod types;

pub use capabilities::Capabilities;
pub use classifier::{Classifier, KeywordClassifier, UserIntent};
pub use graph::{AgentGraph, GraphBuilder, GraphCompileError, default_graph};
pub use message::Message;
pub use node::{AgentNode, NodeContext, NodeError, StatePatch};
pub use state::{ConversationContext, ConversationState};
pub use types::{NodeKind, StateField};
