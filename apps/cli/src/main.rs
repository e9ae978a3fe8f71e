//! LearnFlow CLI - sign in to LearnFlow from the terminal.

mod commands;
mod notifier;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use learnflow_config::{init_logging, parse_level, Config, Paths};
use tracing::debug;

/// LearnFlow CLI - Sign in, sign up and inspect your session.
#[derive(Parser)]
#[command(name = "learnflow")]
#[command(about = "LearnFlow CLI for authentication and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Interactive sign-in / sign-up form (default)
    Auth,

    /// Login with email and password
    Login {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account
    Signup {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Logout and clear session
    Logout,

    /// Check authentication status
    Status {
        /// Confirm the session with the auth service
        #[arg(long)]
        verify: bool,
    },

    /// Show configuration (API keys are reported as Present/Missing)
    Config,
}

async fn run(cli: Cli) -> Result<()> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    // Mirror to the terminal only when explicitly debugging.
    init_logging(&paths, &level, parse_level(&level) >= tracing::Level::DEBUG);

    let command = cli.command.unwrap_or(Commands::Auth);
    debug!(command = ?command, "Running command");

    let ctx = commands::Context::new(paths, config, cli.format)?;

    match command {
        Commands::Auth => commands::interactive(&ctx).await,
        Commands::Login { email } => commands::login(&ctx, email.as_deref()).await,
        Commands::Signup { email } => commands::signup(&ctx, email.as_deref()).await,
        Commands::Logout => commands::logout(&ctx).await,
        Commands::Status { verify } => commands::status(&ctx, verify).await,
        Commands::Config => commands::config_show(&ctx),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
