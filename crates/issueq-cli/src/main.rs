//! issueq - queue tracker-issue creation from pull request reviews
//!
//! The ledger of queued issues lives in a single bot comment on the PR;
//! there is no local state.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod event;
mod github;

#[derive(Parser)]
#[command(name = "issueq")]
#[command(about = "Queue tracker-issue creation from pull request review commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List issues queued on a pull request
    List {
        /// Pull request reference (format: "{owner}/{repo}#{number}")
        #[arg(long)]
        pr: String,

        /// Username of the bot account that owns the status comment
        #[arg(long)]
        bot: String,

        /// GitHub token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Create every pending queued issue and mark it in the status comment
    Create {
        /// Pull request reference (format: "{owner}/{repo}#{number}")
        #[arg(long)]
        pr: String,

        /// Username of the bot account that owns the status comment
        #[arg(long)]
        bot: String,

        /// GitHub token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Prepend a value to every created issue title
        #[arg(long)]
        prepend: Option<String>,
    },

    /// Process a GitHub Actions comment event (CI only)
    Action {
        /// Username of the bot account that owns the status comment
        #[arg(long)]
        bot: String,

        /// GitHub token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { pr, bot, token } => commands::list(&pr, &bot, token, cli.json),
        Commands::Create {
            pr,
            bot,
            token,
            prepend,
        } => commands::create(&pr, &bot, token, prepend.as_deref(), cli.json),
        Commands::Action { bot, token } => commands::action(&bot, token),
    }
}
