//! Handler nodes the supervisor routes to.
//!
//! One handler runs per turn and is responsible for appending exactly one
//! assistant message.

mod campaign;
mod error;
mod stubs;

pub use campaign::{AdRequirements, CampaignAgentNode};
pub use error::ErrorHandlerNode;
pub use stubs::CapabilityOverviewNode;
