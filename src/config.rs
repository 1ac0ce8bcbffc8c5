//! Resolved run configuration.
//!
//! Values arrive through the CLI, the process environment, or a `.env` file
//! loaded at startup. Required settings are checked here, before any client
//! is built.

use clap::ValueEnum;
use std::path::PathBuf;

use crate::aggregate::{AggregatePolicy, AttributeMerge};
use crate::cli::{ContributorsArgs, VipArgs};
use crate::error::{Result, SpotlightError};
use crate::source::RepoVisibility;

#[derive(Debug, Clone)]
pub struct ContributorsConfig {
    pub token: String,
    pub org: String,
    pub api_url: String,
    pub visibility: RepoVisibility,
    pub policy: AggregatePolicy,
    pub merge: AttributeMerge,
    pub max_repos: Option<usize>,
    pub concurrency: usize,
    pub output: PathBuf,
}

impl ContributorsConfig {
    pub fn from_args(args: &ContributorsArgs) -> Result<Self> {
        Ok(Self {
            token: required(args.token.as_deref(), "GITHUB_TOKEN")?,
            org: required(args.org.as_deref(), "ORG_NAME")?,
            api_url: args.api_url.clone(),
            visibility: args.visibility,
            policy: AggregatePolicy {
                forks: args.forks,
                window: args.window,
            },
            merge: args.attributes,
            max_repos: args.max_repos,
            concurrency: usize::from(args.concurrency),
            output: args.output.clone(),
        })
    }
}

/// Shape of the orchestrator file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum VipFormat {
    /// `{login: {name, url}}`
    #[default]
    Keyed,
    /// `[{github, profile_url}]`
    List,
}

impl VipFormat {
    pub fn default_output(self) -> PathBuf {
        match self {
            VipFormat::Keyed => PathBuf::from("assets/vip_info.json"),
            VipFormat::List => PathBuf::from("assets/vip_contributors_info.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VipConfig {
    pub format: VipFormat,
    pub endpoint: String,
    pub explorer_url: String,
    pub payload: Option<PathBuf>,
    pub output: PathBuf,
}

impl VipConfig {
    pub fn from_args(args: &VipArgs) -> Self {
        Self {
            format: args.format,
            endpoint: args.endpoint.clone(),
            explorer_url: args.explorer_url.clone(),
            payload: args.payload.clone(),
            output: args
                .output
                .clone()
                .unwrap_or_else(|| args.format.default_output()),
        }
    }
}

fn required(value: Option<&str>, var: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SpotlightError::Config(format!(
            "{var} environment variable not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{CountWindow, ForkPolicy};
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn contributors_args(extra: &[&str]) -> ContributorsArgs {
        let mut argv = vec!["spotlight", "contributors", "--api-url", "https://api.github.com"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Contributors(mut args) => {
                // Ignore whatever the developer's shell exports.
                if !extra.contains(&"--token") {
                    args.token = None;
                }
                if !extra.contains(&"--org") {
                    args.org = None;
                }
                args
            }
            Command::Vip(_) => unreachable!(),
        }
    }

    fn vip_args(extra: &[&str]) -> VipArgs {
        let mut argv = vec!["spotlight", "vip"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Vip(args) => args,
            Command::Contributors(_) => unreachable!(),
        }
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let err =
            ContributorsConfig::from_args(&contributors_args(&["--org", "livepeer"])).unwrap_err();
        assert!(matches!(err, SpotlightError::Config(ref m) if m.contains("GITHUB_TOKEN")));
    }

    #[test]
    fn missing_org_is_a_configuration_error() {
        let err =
            ContributorsConfig::from_args(&contributors_args(&["--token", "ghp_x"])).unwrap_err();
        assert!(matches!(err, SpotlightError::Config(ref m) if m.contains("ORG_NAME")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = ContributorsConfig::from_args(&contributors_args(&[
            "--token", "  ", "--org", "livepeer",
        ]))
        .unwrap_err();
        assert!(matches!(err, SpotlightError::Config(_)));
    }

    #[test]
    fn resolved_config_carries_policies() {
        let config = ContributorsConfig::from_args(&contributors_args(&[
            "--token",
            "ghp_x",
            "--org",
            "livepeer",
            "--forks",
            "separate",
            "--window",
            "lifetime",
            "--concurrency",
            "8",
        ]))
        .unwrap();

        assert_eq!(config.org, "livepeer");
        assert_eq!(config.policy.forks, ForkPolicy::Separate);
        assert_eq!(config.policy.window, CountWindow::Lifetime);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn vip_output_defaults_follow_format() {
        let keyed = VipConfig::from_args(&vip_args(&[]));
        assert_eq!(keyed.output, PathBuf::from("assets/vip_info.json"));

        let list = VipConfig::from_args(&vip_args(&["--format", "list"]));
        assert_eq!(list.output, PathBuf::from("assets/vip_contributors_info.json"));

        let custom = VipConfig::from_args(&vip_args(&["--output", "out/vips.json"]));
        assert_eq!(custom.output, PathBuf::from("out/vips.json"));
    }
}
