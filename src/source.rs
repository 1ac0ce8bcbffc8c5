//! Seams between the run and the remote data sources.
//!
//! Runs receive a source by reference instead of building a client from the
//! environment, so tests can hand in an in-memory fake.

#![allow(async_fn_in_trait)]

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

use crate::window::DateWindow;

/// Repository listing filter understood by the organization API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RepoVisibility {
    #[default]
    Public,
    Private,
    All,
    Sources,
    Forks,
    Member,
}

impl RepoVisibility {
    pub fn as_query(self) -> &'static str {
        match self {
            RepoVisibility::Public => "public",
            RepoVisibility::Private => "private",
            RepoVisibility::All => "all",
            RepoVisibility::Sources => "sources",
            RepoVisibility::Forks => "forks",
            RepoVisibility::Member => "member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub fork: bool,
}

/// Entry of a repository's contributor list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoContributor {
    pub login: String,
    pub contributions: u64,
}

/// Public profile of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
}

/// Organization API (members, repositories, contributors, commits).
pub trait OrgSource {
    async fn public_members(&self, org: &str) -> Result<Vec<String>>;

    async fn org_repos(&self, org: &str, visibility: RepoVisibility) -> Result<Vec<Repository>>;

    async fn repo_contributors(&self, repo: &Repository) -> Result<Vec<RepoContributor>>;

    async fn user_profile(&self, login: &str) -> Result<UserProfile>;

    /// Commits authored by `login` in `repo` inside `window`.
    async fn commit_count(
        &self,
        repo: &Repository,
        login: &str,
        window: &DateWindow,
    ) -> Result<u64>;
}

/// Orchestrator profile feed. The payload is returned unchecked; shape
/// validation belongs to the filter stage.
pub trait ProfileSource {
    /// Human-readable origin used in error messages.
    fn origin(&self) -> String;

    async fn fetch_profiles(&self) -> Result<Value>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory stand-ins for the remote sources.

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct FakeOrg {
        pub members: Vec<String>,
        pub repos: Vec<(Repository, Vec<RepoContributor>)>,
        pub profiles: HashMap<String, UserProfile>,
        /// `(full_name, login) -> commits inside the window`
        pub yearly: HashMap<(String, String), u64>,
        pub broken_repo: Option<String>,
        pub profile_calls: AtomicUsize,
        pub commit_calls: AtomicUsize,
    }

    impl FakeOrg {
        pub fn repo(mut self, name: &str, fork: bool, contributors: &[(&str, u64)]) -> Self {
            let repo = Repository {
                full_name: format!("livepeer/{name}"),
                fork,
            };
            let contributors = contributors
                .iter()
                .map(|(login, contributions)| RepoContributor {
                    login: login.to_string(),
                    contributions: *contributions,
                })
                .collect();
            self.repos.push((repo, contributors));
            self
        }

        pub fn profile(mut self, login: &str, name: &str) -> Self {
            self.profiles.insert(
                login.to_string(),
                UserProfile {
                    login: login.to_string(),
                    name: Some(name.to_string()),
                    ..UserProfile::default()
                },
            );
            self
        }

        pub fn yearly(mut self, repo: &str, login: &str, commits: u64) -> Self {
            self.yearly
                .insert((format!("livepeer/{repo}"), login.to_string()), commits);
            self
        }
    }

    impl OrgSource for FakeOrg {
        async fn public_members(&self, _org: &str) -> Result<Vec<String>> {
            Ok(self.members.clone())
        }

        async fn org_repos(
            &self,
            _org: &str,
            _visibility: RepoVisibility,
        ) -> Result<Vec<Repository>> {
            Ok(self.repos.iter().map(|(repo, _)| repo.clone()).collect())
        }

        async fn repo_contributors(&self, repo: &Repository) -> Result<Vec<RepoContributor>> {
            if self.broken_repo.as_deref() == Some(repo.full_name.as_str()) {
                anyhow::bail!("contributors of {} unavailable", repo.full_name);
            }
            // Give other in-flight repositories a chance to finish first.
            tokio::task::yield_now().await;
            Ok(self
                .repos
                .iter()
                .find(|(r, _)| r.full_name == repo.full_name)
                .map(|(_, contributors)| contributors.clone())
                .unwrap_or_default())
        }

        async fn user_profile(&self, login: &str) -> Result<UserProfile> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.profiles.get(login).cloned().unwrap_or_else(|| UserProfile {
                login: login.to_string(),
                ..UserProfile::default()
            }))
        }

        async fn commit_count(
            &self,
            repo: &Repository,
            login: &str,
            _window: &DateWindow,
        ) -> Result<u64> {
            self.commit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .yearly
                .get(&(repo.full_name.clone(), login.to_string()))
                .copied()
                .unwrap_or(0))
        }
    }

    pub struct FakeFeed(pub Value);

    impl ProfileSource for FakeFeed {
        fn origin(&self) -> String {
            "fake feed".to_string()
        }

        async fn fetch_profiles(&self) -> Result<Value> {
            Ok(self.0.clone())
        }
    }
}
