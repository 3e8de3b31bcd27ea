//! Terminal-only entrypoint.
//!
//! `deskpilot chat` runs the agent with command dispatch and no HTTP surface.
//! `deskpilot ask <context>` opens a brief question-answering session about
//! the given context; its replies are printed and never dispatched.

use anyhow::Context;
use clap::{Parser, Subcommand};
use deskpilot_api::{
    config::Config,
    connections::ConnectionSet,
    startup::{init_tracing, llm_client, start_agent},
    terminal::{run_ask_loop, run_prompt_loop},
};
use deskpilot_core::{prompt::ASK_INSTRUCTION, session::Session};
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "deskpilot", version, about = "Drive the desktop from a chat session")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the agent; command blocks in its replies are executed.
    Chat,
    /// Ask questions about a piece of context.
    Ask {
        /// Text the questions are about.
        context: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_level);

    let client = llm_client(&config);
    let stdin = BufReader::new(tokio::io::stdin());

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let (multiplexer, _worker) =
                start_agent(&config, client, ConnectionSet::new()).await?;
            run_prompt_loop(&multiplexer, stdin).await?;
        }
        Command::Ask { context } => {
            let mut session = Session::start(client, ASK_INSTRUCTION)
                .await
                .context("Failed to open the ask session")?;
            let reply = session
                .send(context)
                .await
                .context("Failed to send the context")?;
            println!("{reply}");
            run_ask_loop(&mut session, stdin).await?;
        }
    }

    info!("Input closed. Goodbye.");
    Ok(())
}
