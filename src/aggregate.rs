//! Folds per-repository contributor lists into one profile per login.
//!
//! The fold owns its accumulator and hands it back after every repository,
//! so a caller may fold sequentially or merge results gathered elsewhere as
//! long as repositories are presented in a stable order. Descriptive fields
//! (name, avatar, location, ...) follow [`AttributeMerge`]; counters always
//! accumulate.

use std::collections::HashSet;

use clap::ValueEnum;
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::models::{ContributorProfile, ContributorRecord, RepoContributions};

/// Insertion-ordered `login -> profile` accumulator.
pub type Roster = IndexMap<String, ContributorProfile>;

/// What happens to repositories flagged as forks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ForkPolicy {
    /// Forks are skipped entirely.
    #[default]
    Exclude,
    /// Forks are folded, their counts land in `fork_contributions`.
    Separate,
}

/// Which counters are kept besides the lifetime count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CountWindow {
    /// Lifetime contribution counts only.
    Lifetime,
    /// Lifetime counts plus commits inside the trailing year.
    #[default]
    #[value(name = "yearly")]
    LifetimeAndYearly,
}

/// How descriptive fields are resolved when a login shows up again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AttributeMerge {
    /// Keep the snapshot from the first repository the login appeared in.
    #[default]
    FirstSeen,
    /// Overwrite with every later snapshot.
    LastSeen,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatePolicy {
    pub forks: ForkPolicy,
    pub window: CountWindow,
}

pub struct Aggregator {
    policy: AggregatePolicy,
    merge: AttributeMerge,
    members: HashSet<String>,
}

impl Aggregator {
    /// `members` is the public member list of the organization, gathered
    /// before any repository is folded.
    pub fn new(
        policy: AggregatePolicy,
        merge: AttributeMerge,
        members: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            policy,
            merge,
            members: members.into_iter().collect(),
        }
    }

    /// Fold one repository into `roster` and return it.
    pub fn fold(&self, mut roster: Roster, repo: &RepoContributions) -> Roster {
        if repo.fork && self.policy.forks == ForkPolicy::Exclude {
            return roster;
        }

        for record in &repo.contributors {
            let profile = match roster.entry(record.login.clone()) {
                Entry::Vacant(slot) => slot.insert(self.new_profile(record)),
                Entry::Occupied(slot) => {
                    let profile = slot.into_mut();
                    if self.merge == AttributeMerge::LastSeen {
                        apply_attributes(profile, record);
                    }
                    profile
                }
            };
            self.add_counts(profile, record, repo.fork);
        }

        roster
    }

    /// Fold every repository in order and return the merged profiles.
    pub fn aggregate<'a, I>(&self, repos: I) -> Vec<ContributorProfile>
    where
        I: IntoIterator<Item = &'a RepoContributions>,
    {
        repos
            .into_iter()
            .fold(Roster::new(), |roster, repo| self.fold(roster, repo))
            .into_values()
            .collect()
    }

    fn new_profile(&self, record: &ContributorRecord) -> ContributorProfile {
        let mut profile = ContributorProfile {
            login: record.login.clone(),
            name: None,
            avatar_url: None,
            location: None,
            company: None,
            bio: None,
            blog_url: None,
            twitter_username: None,
            org_member: self.members.contains(&record.login),
            source_contributions: 0,
            fork_contributions: match self.policy.forks {
                ForkPolicy::Separate => Some(0),
                ForkPolicy::Exclude => None,
            },
            yearly_contributions: match self.policy.window {
                CountWindow::LifetimeAndYearly => Some(0),
                CountWindow::Lifetime => None,
            },
        };
        apply_attributes(&mut profile, record);
        profile
    }

    fn add_counts(
        &self,
        profile: &mut ContributorProfile,
        record: &ContributorRecord,
        fork: bool,
    ) {
        match (fork, profile.fork_contributions.as_mut()) {
            (true, Some(forked)) => *forked = forked.saturating_add(record.contributions),
            _ => {
                profile.source_contributions =
                    profile.source_contributions.saturating_add(record.contributions)
            }
        }

        if let Some(yearly) = profile.yearly_contributions.as_mut() {
            *yearly = yearly.saturating_add(record.yearly_contributions.unwrap_or(0));
        }
    }
}

fn apply_attributes(profile: &mut ContributorProfile, record: &ContributorRecord) {
    profile.name = record.name.clone();
    profile.avatar_url = record.avatar_url.clone();
    profile.location = record.location.clone();
    profile.company = record.company.clone();
    profile.bio = record.bio.clone();
    profile.blog_url = record.blog_url.clone();
    profile.twitter_username = record.twitter_username.clone();
}
