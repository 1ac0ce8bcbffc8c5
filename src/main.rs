//! `spotlight` -- contributor spotlight data collector.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Network, HTTP or file-system failure
//!   2 - Missing configuration (`GITHUB_TOKEN`, `ORG_NAME`)
//!   3 - Remote payload had an unexpected shape

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use spotlight::cli::{Cli, Command};
use spotlight::config::{ContributorsConfig, VipConfig};
use spotlight::error::exit_code_for;
use spotlight::explorer::{ExplorerClient, PayloadFile};
use spotlight::github::GithubClient;
use spotlight::run::{run_contributors, run_vip};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(exit_code_for(&e));
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_directive().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Contributors(args) => {
            let config = ContributorsConfig::from_args(&args)?;
            info!("Retrieving contributors info for {}...", config.org);

            let client = GithubClient::new(&config.token, &config.api_url);
            let count = run_contributors(&client, &config, Utc::now()).await?;
            println!(
                "Retrieved contributions for {count} contributors and saved to {}",
                config.output.display()
            );
        }
        Command::Vip(args) => {
            let config = VipConfig::from_args(&args);
            let count = match &config.payload {
                Some(path) => run_vip(&PayloadFile::new(path), &config).await?,
                None => run_vip(&ExplorerClient::new(&config.endpoint), &config).await?,
            };
            println!(
                "Stored {count} orchestrators with GitHub accounts in {}",
                config.output.display()
            );
        }
    }
    Ok(())
}
