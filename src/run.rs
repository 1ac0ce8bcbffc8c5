//! One complete pass per subcommand: fetch, shape, save.
//!
//! The output file is only touched once every fetch has succeeded, so a
//! failed run leaves the previous file as it was.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate::Aggregator;
use crate::collect::{CollectOptions, collect_repositories};
use crate::config::{ContributorsConfig, VipConfig, VipFormat};
use crate::filter::{ensure_sequence, vip_entries, vip_index};
use crate::sink::save_json;
use crate::source::{OrgSource, ProfileSource};
use crate::window::DateWindow;

/// Fetch, merge and save organization contributors. Returns the number of
/// profiles written.
pub async fn run_contributors<S: OrgSource>(
    source: &S,
    config: &ContributorsConfig,
    now: DateTime<Utc>,
) -> Result<usize> {
    let opts = CollectOptions {
        visibility: config.visibility,
        policy: config.policy,
        window: DateWindow::trailing_year(now),
        max_repos: config.max_repos,
        concurrency: config.concurrency,
    };
    let collected = collect_repositories(source, &config.org, &opts).await?;

    let aggregator = Aggregator::new(config.policy, config.merge, collected.members);
    let profiles = aggregator.aggregate(&collected.repos);

    save_json(&profiles, &config.output)?;
    Ok(profiles.len())
}

/// Fetch orchestrators, keep the ones with a GitHub handle and save them in
/// the configured shape. Returns the number of entries written.
pub async fn run_vip<P: ProfileSource>(source: &P, config: &VipConfig) -> Result<usize> {
    info!("Fetching orchestrators with GitHub accounts...");
    let payload = source.fetch_profiles().await?;
    let origin = source.origin();
    let records = ensure_sequence(&payload, &origin)?;
    info!("Retrieved {} orchestrator profiles", records.len());

    let written = match config.format {
        VipFormat::Keyed => {
            let index = vip_index(records, &config.explorer_url, &origin)?;
            save_json(&index, &config.output)?;
            index.len()
        }
        VipFormat::List => {
            let entries = vip_entries(records, &config.explorer_url, &origin)?;
            save_json(&entries, &config.output)?;
            entries.len()
        }
    };
    Ok(written)
}
