use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "calwatch", version, about = "Google Calendar change notifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one notification pass for a calendar
    Run {
        /// Calendar to check for changes
        calendar_id: String,
    },
    /// Credential management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Sync checkpoint inspection
    Checkpoint {
        #[command(subcommand)]
        action: commands::checkpoint::CheckpointAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { calendar_id } => commands::run::run(&calendar_id).await,
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Checkpoint { action } => commands::checkpoint::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
