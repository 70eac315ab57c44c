//! Alfred CLI — the main entry point.
//!
//! Commands:
//! - `init`    Write a default config file
//! - `ask`     One question, the demo questions, or an interactive session
//! - `guests`  Query the guest index without the model
//! - `tools`   List the tools Alfred can call
//! - `doctor`  Check config, API key and corpus reachability

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "alfred",
    about = "Alfred, a gala host that looks things up before answering",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Ask Alfred a question
    Ask {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long, conflicts_with = "demo")]
        message: Option<String>,

        /// Run the three gala demo questions
        #[arg(long)]
        demo: bool,

        /// Print the full transcript as JSON (single-message mode only)
        #[arg(long, requires = "message")]
        json: bool,
    },

    /// Search the guest list directly
    Guests {
        /// Name, relation or any words from a guest description
        query: String,

        /// Maximum number of guests to show
        #[arg(short, long, default_value_t = alfred_retrieval::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// List the tools available to the model
    Tools,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Ask {
            message,
            demo,
            json,
        } => commands::ask::run(message, demo, json).await?,
        Commands::Guests { query, limit } => commands::guests::run(&query, limit).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
