//! Records written to the output files, plus the per-repository input the
//! aggregator folds.

use serde::{Deserialize, Serialize};

/// Deduplicated per-login summary written to the contributors file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub blog_url: Option<String>,
    pub twitter_username: Option<String>,
    pub org_member: bool,
    pub source_contributions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_contributions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_contributions: Option<u64>,
}

/// One contributor as seen in a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorRecord {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub blog_url: Option<String>,
    pub twitter_username: Option<String>,
    /// Lifetime contribution count reported for this repository.
    pub contributions: u64,
    /// Commits inside the yearly window, when it was queried.
    pub yearly_contributions: Option<u64>,
}

impl ContributorRecord {
    /// A record with only a login and a count; handy for fixtures.
    pub fn new(login: impl Into<String>, contributions: u64) -> Self {
        Self {
            login: login.into(),
            name: None,
            avatar_url: None,
            location: None,
            company: None,
            bio: None,
            blog_url: None,
            twitter_username: None,
            contributions,
            yearly_contributions: None,
        }
    }
}

/// Contributor list of one repository, in the order the API returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContributions {
    pub full_name: String,
    pub fork: bool,
    pub contributors: Vec<ContributorRecord>,
}

/// Entry of the list-shaped orchestrator file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipEntry {
    pub github: String,
    pub profile_url: String,
}

/// Value of the keyed orchestrator file (`login -> VipInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipInfo {
    pub name: Option<String>,
    pub url: String,
}
