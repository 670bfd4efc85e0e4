//! Run orchestration
//!
//! Drives one export run: enumerate resources, fetch each resource's change
//! events for the configured window, resolve every event to its detail
//! record. Execution is sequential; the first unrecovered error aborts the
//! remaining run and nothing is exported.

use crate::azure::changes::{get_change_details, list_changes};
use crate::azure::client::ArgClient;
use crate::azure::resources::list_resources;
use crate::config::{ArgApi, RunConfig};
use anyhow::{Context, Result};
use serde_json::Value;

/// Collect the change-detail records for every resource covered by `config`
pub async fn run(
    config: &RunConfig,
    api: &ArgApi,
    client: &ArgClient,
    token: &str,
) -> Result<Vec<Value>> {
    let window = config.time_window()?;

    let resources = list_resources(
        client,
        api,
        token,
        &config.resource_type,
        &config.subscription,
    )
    .await
    .context("Failed to enumerate resources")?;
    tracing::info!("Discovered {} resources", resources.len());

    let mut change_records = Vec::new();

    for resource in &resources {
        tracing::info!("Getting the list of changes for {}...", resource.id);
        let changes = list_changes(client, api, token, &resource.id, &window)
            .await
            .with_context(|| format!("Failed to list changes for {}", resource.id))?;

        for change in &changes {
            tracing::info!("Getting change details for {}...", change.change_id);
            let record = get_change_details(client, api, token, &resource.id, &change.change_id)
                .await
                .with_context(|| {
                    format!(
                        "Failed to get change details for {} of {}",
                        change.change_id, resource.id
                    )
                })?;
            change_records.push(record);
        }
    }

    Ok(change_records)
}
