use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, LINK};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::error::SpotlightError;
use crate::source::{OrgSource, RepoContributor, RepoVisibility, Repository, UserProfile};
use crate::window::DateWindow;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("spotlight/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GithubClient {
    token: Arc<String>,
    api_url: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Create a GitHub REST client. The token is sent as-is on every request.
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token: Arc::new(token.into()),
            api_url: Arc::new(api_url.into().trim_end_matches('/').to_string()),
            http: Arc::new(Client::new()),
        }
    }

    /// Low-level GET. Non-2xx statuses become `SpotlightError::Http`; there is
    /// no retry, a failed request fails the run.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let endpoint = format!("{}{path}", self.api_url);
        debug!(%endpoint, ?query, "GET");

        let resp = self
            .http
            .get(&endpoint)
            .bearer_auth(&*self.token)
            .header("User-Agent", USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .query(query)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error requesting {endpoint}: {e}"))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(SpotlightError::Http {
            endpoint,
            status: status.as_u16(),
            body,
        }
        .into())
    }

    /// Collect every page of a list endpoint. A page shorter than `PER_PAGE`
    /// ends the walk; `204 No Content` is treated as an empty list.
    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut page = 1usize;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let resp = self.get(path, &params).await?;
            if is_empty_listing(resp.status()) {
                break;
            }

            let items: Vec<T> = resp
                .json()
                .await
                .with_context(|| format!("Failed to deserialize page {page} of {path}"))?;
            let received = items.len();
            out.extend(items);

            match next_page(page, received) {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(out)
    }
}

impl OrgSource for GithubClient {
    /// Logins of the organization's public members.
    async fn public_members(&self, org: &str) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Member {
            login: String,
        }

        let members: Vec<Member> = self
            .paginate(&format!("/orgs/{org}/public_members"), &[])
            .await
            .with_context(|| format!("Failed to list public members of {org}"))?;

        Ok(members.into_iter().map(|m| m.login).collect())
    }

    async fn org_repos(&self, org: &str, visibility: RepoVisibility) -> Result<Vec<Repository>> {
        self.paginate(
            &format!("/orgs/{org}/repos"),
            &[("type", visibility.as_query().to_string())],
        )
        .await
        .with_context(|| format!("Failed to list repositories of {org}"))
    }

    /// Contributor list of a repository; anonymous entries are not requested.
    async fn repo_contributors(&self, repo: &Repository) -> Result<Vec<RepoContributor>> {
        #[derive(Deserialize)]
        struct ContributorNode {
            login: Option<String>,
            contributions: u64,
        }

        let nodes: Vec<ContributorNode> = self
            .paginate(&format!("/repos/{}/contributors", repo.full_name), &[])
            .await
            .with_context(|| format!("Failed to list contributors of {}", repo.full_name))?;

        Ok(nodes
            .into_iter()
            .filter_map(|n| {
                n.login.map(|login| RepoContributor {
                    login,
                    contributions: n.contributions,
                })
            })
            .collect())
    }

    async fn user_profile(&self, login: &str) -> Result<UserProfile> {
        self.get(&format!("/users/{login}"), &[])
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to deserialize profile of {login}"))
    }

    /// Asks for one commit per page; the page number of the `rel="last"`
    /// link is then the total number of matching commits.
    async fn commit_count(
        &self,
        repo: &Repository,
        login: &str,
        window: &DateWindow,
    ) -> Result<u64> {
        let (since, until) = window.query_bounds();
        let resp = self
            .get(
                &format!("/repos/{}/commits", repo.full_name),
                &[
                    ("author", login.to_string()),
                    ("since", since),
                    ("until", until),
                    ("per_page", "1".to_string()),
                ],
            )
            .await
            .with_context(|| format!("Failed to count commits of {login} in {}", repo.full_name))?;

        let link = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let page: Vec<serde_json::Value> = resp
            .json()
            .await
            .context("Failed to deserialize commits response")?;

        Ok(commit_total(link.as_deref(), &page))
    }
}

/// `204 No Content` is what an empty repository answers on list endpoints.
fn is_empty_listing(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT
}

/// Page to request after `page` returned `received` items; a short page is
/// the last one.
fn next_page(page: usize, received: usize) -> Option<usize> {
    (received >= PER_PAGE).then_some(page + 1)
}

/// Total commits from a `per_page=1` response: the `rel="last"` page number
/// when the results span several pages, otherwise the size of the only page.
fn commit_total(link: Option<&str>, first_page: &[serde_json::Value]) -> u64 {
    link.and_then(last_page).unwrap_or(first_page.len() as u64)
}

/// Page number of the `rel="last"` entry of a `Link` header.
fn last_page(link: &str) -> Option<u64> {
    link.split(',').find_map(|part| {
        let (target, rel) = part.split_once(';')?;
        if rel.trim() != r#"rel="last""# {
            return None;
        }
        let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(url)
            .ok()?
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}
