//! `reqk directory` and `reqk catalog`.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::warn;

use super::{catalog_repository, directory_client, load_engine_config};

pub async fn run_directory(config_paths: &[String], strict: bool) -> Result<()> {
    let (_loaded, cfg) = load_engine_config(config_paths, strict)?;
    let client = directory_client(&cfg)?;

    let users = client.fetch_all_users().await;

    let out = serde_json::to_string_pretty(&users).context("serialize directory")?;
    println!("{out}");
    Ok(())
}

/// The three catalog collections load concurrently once the directory is in;
/// record authors resolve against it.
pub async fn run_catalog(config_paths: &[String], strict: bool) -> Result<()> {
    let (loaded, cfg) = load_engine_config(config_paths, strict)?;
    let client = directory_client(&cfg)?;
    let repo = catalog_repository(&cfg)?;

    let users = client.fetch_all_users().await;
    let (items, details, instructions) = tokio::join!(
        repo.fetch_items(&users),
        repo.fetch_item_details(&users),
        repo.fetch_instructions(&cfg.form.name, &users),
    );

    let (aggregates, report) = reqk_aggregate::build_with_report(&items, &details);
    if !report.orphaned_details.is_empty() {
        warn!(
            orphaned = ?report.orphaned_details,
            "detail rows reference item titles that do not exist"
        );
    }

    let out = json!({
        "config_hash": loaded.config_hash,
        "form": cfg.form.name,
        "aggregates": aggregates,
        "instructions": instructions,
        "report": {
            "skipped_items": report.skipped_items,
            "skipped_details": report.skipped_details,
            "merged_duplicate_items": report.merged_duplicate_items,
            "orphaned_details": report.orphaned_details,
        },
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize catalog")?
    );
    Ok(())
}
