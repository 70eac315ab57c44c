//! Shared wiring: config → corpus → index → tools → dialogue loop.

use std::sync::Arc;
use std::time::Duration;

use alfred_agent::DialogueLoop;
use alfred_config::{AppConfig, GuestSourceKind};
use alfred_core::event::EventBus;
use alfred_core::tool::ToolRegistry;
use alfred_retrieval::{Bm25Params, GuestSource, HubDatasetSource, JsonFileSource, RetrievalIndex};

/// Persona sent ahead of every conversation unless the config overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Alfred, the host of a lavish gala. \
Use your tools to look up guests, the weather and Hugging Face Hub statistics \
before answering, and answer concisely.";

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// The guest source selected by `[guests]`.
pub fn guest_source(config: &AppConfig) -> Result<Box<dyn GuestSource>, Box<dyn std::error::Error>> {
    let guests = &config.guests;
    match guests.source {
        GuestSourceKind::Hub => Ok(Box::new(HubDatasetSource::new(
            &guests.datasets_server_url,
            &guests.dataset,
            &guests.split,
        ))),
        GuestSourceKind::File => {
            let path = guests
                .path
                .as_ref()
                .ok_or("guests.path is required when guests.source = \"file\"")?;
            Ok(Box::new(JsonFileSource::new(path)))
        }
    }
}

/// Fetch the whole corpus and index it. Fails rather than indexing a partial list.
pub async fn build_index(config: &AppConfig) -> Result<Arc<RetrievalIndex>, Box<dyn std::error::Error>> {
    let source = guest_source(config)?;
    tracing::info!(source = %source.describe(), "Loading guest list");
    let records = source.fetch().await?;
    let params = Bm25Params {
        k1: config.retrieval.k1,
        b: config.retrieval.b,
    };
    Ok(Arc::new(RetrievalIndex::build_with(&records, params)))
}

pub fn build_registry(index: Arc<RetrievalIndex>, config: &AppConfig) -> Arc<ToolRegistry> {
    Arc::new(alfred_tools::default_registry(index, config))
}

/// Assemble a dialogue loop from config around an existing tool registry.
pub fn build_dialogue(
    config: &AppConfig,
    tools: Arc<ToolRegistry>,
) -> Result<DialogueLoop, Box<dyn std::error::Error>> {
    let router = alfred_providers::build_from_config(config);
    let provider = router.default()?;
    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    Ok(DialogueLoop::new(
        provider,
        &config.default_model,
        config.default_temperature,
        tools,
        Arc::new(EventBus::default()),
    )
    .with_system_prompt(system_prompt)
    .with_max_tokens(config.default_max_tokens)
    .with_max_iterations(config.agent.max_iterations)
    .with_model_timeout(Duration::from_secs(config.agent.model_timeout_secs))
    .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs)))
}
