use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::aggregate::{AttributeMerge, CountWindow, ForkPolicy};
use crate::config::VipFormat;
use crate::explorer::{DEFAULT_ENDPOINT, DEFAULT_EXPLORER_URL};
use crate::github::DEFAULT_API_URL;
use crate::source::RepoVisibility;

#[derive(Parser, Debug)]
#[command(name = "spotlight")]
#[command(about = "Collect organization contributors and orchestrators into JSON files")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge contributor counts across the organization's repositories
    Contributors(ContributorsArgs),
    /// Collect orchestrators that list a GitHub account
    Vip(VipArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ContributorsArgs {
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub access token"
    )]
    pub token: Option<String>,

    #[arg(long, env = "ORG_NAME", help = "Organization login")]
    pub org: Option<String>,

    #[arg(
        long,
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_URL,
        help = "REST API base URL"
    )]
    pub api_url: String,

    #[arg(
        long,
        value_enum,
        default_value_t = RepoVisibility::Public,
        help = "Repository listing type"
    )]
    pub visibility: RepoVisibility,

    #[arg(
        long,
        value_enum,
        default_value_t = ForkPolicy::Exclude,
        help = "Skip forks or count them separately"
    )]
    pub forks: ForkPolicy,

    #[arg(
        long,
        value_enum,
        default_value_t = CountWindow::LifetimeAndYearly,
        help = "Counters to keep"
    )]
    pub window: CountWindow,

    #[arg(
        long,
        value_enum,
        default_value_t = AttributeMerge::FirstSeen,
        help = "Which snapshot of a contributor's profile to keep"
    )]
    pub attributes: AttributeMerge,

    #[arg(long, help = "Only fold the first N repositories")]
    pub max_repos: Option<usize>,

    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Repositories fetched at once"
    )]
    pub concurrency: u16,

    #[arg(long, default_value = "data/contributors_info.json", help = "Output file")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct VipArgs {
    #[arg(long, value_enum, default_value_t = VipFormat::Keyed, help = "Output shape")]
    pub format: VipFormat,

    #[arg(long, default_value = DEFAULT_ENDPOINT, help = "Profile endpoint")]
    pub endpoint: String,

    #[arg(long, default_value = DEFAULT_EXPLORER_URL, help = "Base URL for profile links")]
    pub explorer_url: String,

    #[arg(long, help = "Read the payload from a local JSON file instead of the endpoint")]
    pub payload: Option<PathBuf>,

    #[arg(long, help = "Output file (defaults depend on --format)")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Default `EnvFilter` directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "spotlight=warn";
        }
        match self.verbose {
            0 => "spotlight=info",
            1 => "spotlight=debug",
            _ => "spotlight=trace",
        }
    }
}
