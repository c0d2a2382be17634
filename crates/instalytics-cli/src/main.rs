mod commands;
mod prompt;

use clap::{Parser, Subcommand};
use commands::Outcome;
use instalytics::{Scraper, ScraperConfig};
use prompt::Prompter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "instalytics", about = "Instagram profile and engagement analytics", version)]
struct Cli {
    /// Directory reports are saved to.
    #[arg(long, global = true, default_value = ".", env = "INSTALYTICS_OUTPUT_DIR")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follower, following and post counts for a profile.
    Followers {
        /// Account to look up; falls back to TARGET_ACCOUNT, then a prompt.
        username: Option<String>,
    },
    /// One-glance profile summary, no questions asked.
    Quick { username: Option<String> },
    /// Likes and comments for recent posts.
    Posts {
        username: Option<String>,
        /// Posts to analyze (1-10).
        #[arg(short, long, allow_negative_numbers = true)]
        count: Option<i64>,
    },
    /// Profile overview plus a per-post engagement breakdown.
    Analyze {
        username: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        count: Option<i64>,
    },
    /// Log in with INSTAGRAM_USERNAME / INSTAGRAM_PASSWORD and save the session.
    Login,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env();
    let mut scraper = Scraper::resume(config)?;
    let mut prompt = Prompter::stdio();

    if let Some(account) = scraper.logged_in_as() {
        tracing::info!(target: "instalytics", %account, "Using saved session");
    }

    let outcome = match cli.command {
        Command::Followers { username } => {
            commands::followers(&mut scraper, &mut prompt, username, &cli.output_dir).await?
        }
        Command::Quick { username } => commands::quick(&scraper, &mut prompt, username).await?,
        Command::Posts { username, count } => {
            commands::posts(&scraper, &mut prompt, username, count, &cli.output_dir).await?
        }
        Command::Analyze { username, count } => {
            commands::analyze(&scraper, &mut prompt, username, count, &cli.output_dir).await?
        }
        Command::Login => commands::login(&mut scraper, &mut prompt).await?,
    };

    Ok(match outcome {
        Outcome::Done | Outcome::Reported => ExitCode::SUCCESS,
        Outcome::Failed => ExitCode::FAILURE,
    })
}
