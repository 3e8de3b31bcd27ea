//! Main Entrypoint for the Deskpilot Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Opening the agent session and spawning the input multiplexer.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Running the web server and the terminal prompt loop side by side.

use anyhow::Context;
use deskpilot_api::{
    config::Config,
    connections::ConnectionSet,
    router::create_router,
    startup::{init_tracing, llm_client, start_agent},
    state::AppState,
    terminal::run_prompt_loop,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::io::BufReader;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    init_tracing(config.log_level);
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Open the Session ---
    let client = llm_client(&config);
    let (multiplexer, _worker) = start_agent(&config, client, ConnectionSet::new()).await?;

    let app_state = Arc::new(AppState {
        multiplexer: multiplexer.clone(),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server and Terminal ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = run_prompt_loop(&multiplexer, stdin).await {
            error!(error = %e, "Terminal prompt loop stopped");
        }
        info!("Terminal input closed; voice clients are still served.");
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
