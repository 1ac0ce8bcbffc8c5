//! Walks the organization: members first, then every repository's
//! contributor list, resolving profiles and yearly counts along the way.
//!
//! Repositories may be fetched concurrently, but results come back in
//! listing order so the fold downstream sees the same sequence either way.
//! The first failure aborts the walk.

use anyhow::Result;
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::aggregate::{AggregatePolicy, CountWindow, ForkPolicy};
use crate::models::{ContributorRecord, RepoContributions};
use crate::source::{OrgSource, RepoContributor, RepoVisibility, Repository, UserProfile};
use crate::window::DateWindow;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub visibility: RepoVisibility,
    pub policy: AggregatePolicy,
    pub window: DateWindow,
    pub max_repos: Option<usize>,
    pub concurrency: usize,
}

/// Everything the aggregator needs for one run.
#[derive(Debug)]
pub struct Collected {
    pub members: Vec<String>,
    pub repos: Vec<RepoContributions>,
}

/// Profiles already fetched during this run.
#[derive(Default)]
struct ProfileCache(Mutex<HashMap<String, UserProfile>>);

impl ProfileCache {
    async fn get_or_fetch<S: OrgSource>(&self, source: &S, login: &str) -> Result<UserProfile> {
        if let Some(hit) = self.lookup(login) {
            return Ok(hit);
        }
        let profile = source.user_profile(login).await?;
        if let Ok(mut map) = self.0.lock() {
            map.insert(login.to_string(), profile.clone());
        }
        Ok(profile)
    }

    fn lookup(&self, login: &str) -> Option<UserProfile> {
        self.0.lock().ok()?.get(login).cloned()
    }
}

pub async fn collect_repositories<S: OrgSource>(
    source: &S,
    org: &str,
    opts: &CollectOptions,
) -> Result<Collected> {
    info!("Retrieving public organization members...");
    let members = source.public_members(org).await?;
    debug!(count = members.len(), "public members");

    info!("Retrieving {} repositories...", opts.visibility.as_query());
    let mut repos = source.org_repos(org, opts.visibility).await?;
    if opts.policy.forks == ForkPolicy::Exclude {
        repos.retain(|repo| !repo.fork);
    }
    if let Some(max) = opts.max_repos {
        repos.truncate(max);
    }

    info!("Retrieving contributors info for {} repositories...", repos.len());
    let cache = ProfileCache::default();
    let repos = stream::iter(repos.iter())
        .map(|repo| fetch_repo(source, repo, opts, &cache))
        .buffered(opts.concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Collected { members, repos })
}

async fn fetch_repo<S: OrgSource>(
    source: &S,
    repo: &Repository,
    opts: &CollectOptions,
    cache: &ProfileCache,
) -> Result<RepoContributions> {
    let contributors = source.repo_contributors(repo).await?;
    let mut records = Vec::with_capacity(contributors.len());

    for RepoContributor {
        login,
        contributions,
    } in contributors
    {
        let profile = cache.get_or_fetch(source, &login).await?;
        let yearly_contributions = match opts.policy.window {
            CountWindow::LifetimeAndYearly => {
                Some(source.commit_count(repo, &login, &opts.window).await?)
            }
            CountWindow::Lifetime => None,
        };

        records.push(ContributorRecord {
            login,
            name: profile.name,
            avatar_url: profile.avatar_url,
            location: profile.location,
            company: profile.company,
            bio: profile.bio,
            blog_url: profile.blog,
            twitter_username: profile.twitter_username,
            contributions,
            yearly_contributions,
        });
    }

    info!("Retrieved contributors info for: {}", repo.full_name);
    Ok(RepoContributions {
        full_name: repo.full_name.clone(),
        fork: repo.fork,
        contributors: records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fake::FakeOrg;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn options(forks: ForkPolicy, window: CountWindow) -> CollectOptions {
        CollectOptions {
            visibility: RepoVisibility::Public,
            policy: AggregatePolicy { forks, window },
            window: DateWindow::trailing_year(Utc::now()),
            max_repos: None,
            concurrency: 1,
        }
    }

    fn names(collected: &Collected) -> Vec<&str> {
        collected.repos.iter().map(|r| r.full_name.as_str()).collect()
    }

    #[tokio::test]
    async fn forks_are_dropped_before_fetching() {
        let org = FakeOrg::default()
            .repo("go-livepeer", false, &[("alice", 5)])
            .repo("ffmpeg", true, &[("alice", 3)]);

        let collected = collect_repositories(
            &org,
            "livepeer",
            &options(ForkPolicy::Exclude, CountWindow::Lifetime),
        )
        .await
        .unwrap();

        assert_eq!(names(&collected), vec!["livepeer/go-livepeer"]);
    }

    #[tokio::test]
    async fn profiles_are_fetched_once_per_login() {
        let org = FakeOrg::default()
            .repo("a", false, &[("alice", 1), ("bob", 1)])
            .repo("b", false, &[("alice", 1)])
            .repo("c", true, &[("bob", 1), ("alice", 2)])
            .profile("alice", "Alice");

        let collected = collect_repositories(
            &org,
            "livepeer",
            &options(ForkPolicy::Separate, CountWindow::Lifetime),
        )
        .await
        .unwrap();

        assert_eq!(collected.repos.len(), 3);
        assert_eq!(org.profile_calls.load(Ordering::SeqCst), 2);
        assert_eq!(org.commit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            collected.repos[1].contributors[0].name.as_deref(),
            Some("Alice")
        );
        assert!(collected.repos[2].fork);
    }

    #[tokio::test]
    async fn yearly_window_queries_commit_counts() {
        let org = FakeOrg::default()
            .repo("a", false, &[("alice", 10), ("bob", 4)])
            .yearly("a", "alice", 6);

        let collected = collect_repositories(
            &org,
            "livepeer",
            &options(ForkPolicy::Exclude, CountWindow::LifetimeAndYearly),
        )
        .await
        .unwrap();

        let yearly: Vec<Option<u64>> = collected.repos[0]
            .contributors
            .iter()
            .map(|c| c.yearly_contributions)
            .collect();
        assert_eq!(yearly, vec![Some(6), Some(0)]);
        assert_eq!(org.commit_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn max_repos_caps_the_walk() {
        let org = FakeOrg::default()
            .repo("a", false, &[("alice", 1)])
            .repo("b", false, &[("bob", 1)])
            .repo("c", false, &[("carol", 1)]);

        let mut opts = options(ForkPolicy::Exclude, CountWindow::Lifetime);
        opts.max_repos = Some(1);
        let collected = collect_repositories(&org, "livepeer", &opts).await.unwrap();

        assert_eq!(names(&collected), vec!["livepeer/a"]);
    }

    #[tokio::test]
    async fn concurrent_fetch_preserves_listing_order() {
        let mut org = FakeOrg::default();
        for i in 0..12 {
            org = org.repo(&format!("repo{i:02}"), false, &[("alice", 1)]);
        }

        let mut opts = options(ForkPolicy::Exclude, CountWindow::Lifetime);
        opts.concurrency = 4;
        let collected = collect_repositories(&org, "livepeer", &opts).await.unwrap();

        let expected: Vec<String> = (0..12).map(|i| format!("livepeer/repo{i:02}")).collect();
        assert_eq!(names(&collected), expected);
    }

    #[tokio::test]
    async fn one_failing_repository_aborts_the_run() {
        let mut org = FakeOrg::default()
            .repo("a", false, &[("alice", 1)])
            .repo("b", false, &[("bob", 1)]);
        org.broken_repo = Some("livepeer/b".to_string());

        let err = collect_repositories(
            &org,
            "livepeer",
            &options(ForkPolicy::Exclude, CountWindow::Lifetime),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("livepeer/b"));
    }
}
