// Evsync CLI
//
// Design Decision: Use clap derive for argument parsing, but validate the
// pull date by hand: both a missing and a malformed date must exit with
// status 1 and a usage line, before any network I/O.
// Design Decision: Diagnostics go through tracing; the JSON export and
// the retrieved-count line are the command's product and use stdout.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "evsync")]
#[command(about = "Sync municipal event data between a CSV feed, FIWARE Orion, and JSON exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export broker events for a target date as display-keyed JSON
    Pull {
        /// Target date in YYYY-MM-DD form
        date: Option<String>,

        /// Where date filtering happens: pushed down to the broker, or
        /// locally over an unfiltered fetch
        #[arg(long, default_value = "server", value_parser = ["server", "client"])]
        strategy: String,

        /// Print the JSON array to stdout instead of writing events_<date>.json
        #[arg(long)]
        stdout: bool,
    },

    /// Push tomorrow's events from the configured CSV feed into the broker
    Push,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evsync=info,evsync_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Commands::Pull {
            date,
            strategy,
            stdout,
        } => commands::pull::run(date, &strategy, stdout).await,
        Commands::Push => commands::push::run().await,
    }
}
