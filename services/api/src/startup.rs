//! Startup helpers shared by the binaries.

use crate::{
    config::{Config, Provider},
    connections::ConnectionSet,
    multiplexer::Multiplexer,
};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use deskpilot_core::{
    actuator::DesktopActuator,
    dispatcher::Dispatcher,
    llm_client::{LLMClient, OpenAICompatibleClient},
    prompt,
    session::Session,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Level, info};

/// Installs the global subscriber. Logs go to stderr so stdout stays free for
/// agent output.
pub fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the oracle client for the configured provider.
pub fn llm_client(config: &Config) -> Arc<dyn LLMClient> {
    match config.provider {
        Provider::OpenAI => info!("Using OpenAI provider."),
        Provider::Gemini => info!("Using Gemini provider."),
    }
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.api_key)
        .with_api_base(config.provider.api_base());
    Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
    ))
}

/// The agent instruction: the file at `SYSTEM_PROMPT_PATH` if set, otherwise
/// the built-in one listing every registered action.
pub fn load_instruction(config: &Config) -> anyhow::Result<String> {
    match &config.system_prompt_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt from {}", path.display())),
        None => Ok(prompt::agent_instruction()),
    }
}

/// Opens the agent session and spawns the multiplexer worker around it.
pub async fn start_agent(
    config: &Config,
    client: Arc<dyn LLMClient>,
    connections: ConnectionSet,
) -> anyhow::Result<(Multiplexer, JoinHandle<()>)> {
    let instruction = load_instruction(config)?;
    let session = Session::start(client, &instruction)
        .await
        .context("Failed to open the agent session")?;
    info!("Agent session established.");

    let actuator = Arc::new(DesktopActuator::new(config.terminal_program.clone()));
    Ok(Multiplexer::spawn(
        session,
        Dispatcher::new(actuator),
        connections,
        config.turn_timeout,
    ))
}
