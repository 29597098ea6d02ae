//! Shared model for the adpulse reporting engine: campaign records, field
//! normalization, response parsing, configuration and errors.

pub mod config;
pub mod error;
pub mod normalize;
pub mod response;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult};
pub use types::{ActionEntry, ActionType, Breakdown, CampaignRecord};
