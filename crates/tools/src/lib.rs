//! Built-in tools for Alfred.
//!
//! - `guest_info_retriever`: BM25 lookup over the gala guest list
//! - `get_weather_info`: canned weather for the fireworks question
//! - `get_hub_stats`: most-downloaded model of a Hugging Face Hub author

pub mod guest_info;
pub mod hub_stats;
pub mod weather_info;

use std::sync::Arc;

use alfred_config::AppConfig;
use alfred_core::tool::ToolRegistry;
use alfred_retrieval::RetrievalIndex;

pub use guest_info::GuestInfoTool;
pub use hub_stats::HubStatsTool;
pub use weather_info::WeatherInfoTool;

/// Create the registry Alfred runs with: the guest retriever over `index`,
/// the weather stub, and the Hub statistics client.
pub fn default_registry(index: Arc<RetrievalIndex>, config: &AppConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GuestInfoTool::new(index, config.retrieval.top_k)));
    registry.register(Box::new(WeatherInfoTool));
    registry.register(Box::new(HubStatsTool::new(&config.tools.hub_api_url)));
    registry
}
