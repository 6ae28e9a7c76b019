//! Runtime configuration for the turn executor.

use std::time::Duration;

/// Execution settings for an [`AgentGraph`](crate::graph::AgentGraph).
///
/// The node deadline bounds each of the (at most two) node invocations of a
/// turn; expiry behaves exactly like a node error and routes to the error
/// handler.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Per-node invocation deadline.
    pub node_deadline: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            node_deadline: Duration::from_secs(10),
        }
    }
}

impl RuntimeConfig {
    /// Environment variable overriding the node deadline, in milliseconds.
    pub const DEADLINE_ENV: &'static str = "PROMOGRAPH_NODE_DEADLINE_MS";

    /// Loads configuration from the environment (and a `.env` file when
    /// present), falling back to defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(Self::DEADLINE_ENV) {
            match raw.parse::<u64>() {
                Ok(ms) => config.node_deadline = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(%raw, "ignoring unparsable {}", Self::DEADLINE_ENV);
                }
            }
        }
        config
    }

    /// Builder-style deadline override.
    #[must_use]
    pub fn with_node_deadline(mut self, deadline: Duration) -> Self {
        self.node_deadline = deadline;
        self
    }
}
