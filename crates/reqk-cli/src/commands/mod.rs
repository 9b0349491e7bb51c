//! Command handler modules for reqk-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod assemble;
pub mod fetch;

use std::time::Duration;

use anyhow::{Context, Result};
use reqk_catalog::{CatalogLists, CatalogRepository, RestQueryRunner};
use reqk_config::{
    report_unused_keys, resolve_secrets, AccessMode, EngineConfig, LoadedConfig, UnusedKeyPolicy,
};
use reqk_directory::{DirectoryClient, DirectoryPolicy, GraphPageFetcher};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config, report unknown keys and decode the typed view.
pub fn load_engine_config(paths: &[String], strict: bool) -> Result<(LoadedConfig, EngineConfig)> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = reqk_config::load_layered_yaml(&path_refs)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        warn!(
            unused = ?report.unused_leaf_pointers,
            "config carries keys the engine does not read"
        );
    }

    let cfg = loaded.engine_config()?;
    info!(config_hash = %loaded.config_hash, "config loaded");
    Ok((loaded, cfg))
}

pub fn directory_client(cfg: &EngineConfig) -> Result<DirectoryClient<GraphPageFetcher>> {
    let secrets = resolve_secrets(cfg, AccessMode::Online)?;
    let token = secrets
        .directory_token
        .context("directory token missing after online resolution")?;

    let fetcher = GraphPageFetcher::new_with_base_url(
        token,
        cfg.directory.page_size,
        cfg.directory.base_url.clone(),
    );
    let policy = DirectoryPolicy::new(
        cfg.directory.max_pages,
        Duration::from_secs(cfg.directory.page_timeout_secs),
    )
    .with_denied(&cfg.directory.denied_email_substrings);

    Ok(DirectoryClient::new(fetcher, policy))
}

pub fn catalog_repository(cfg: &EngineConfig) -> Result<CatalogRepository<RestQueryRunner>> {
    if cfg.catalog.base_url.trim().is_empty() {
        anyhow::bail!("CONFIG_INVALID /catalog/base_url must be set to fetch catalogs");
    }
    let secrets = resolve_secrets(cfg, AccessMode::Online)?;
    let token = secrets
        .catalog_token
        .context("catalog token missing after online resolution")?;

    let runner = RestQueryRunner::new(cfg.catalog.base_url.clone(), token);
    let lists = CatalogLists {
        items: cfg.catalog.items_list.clone(),
        details: cfg.catalog.details_list.clone(),
        instructions: cfg.catalog.instructions_list.clone(),
    };
    Ok(CatalogRepository::new(
        runner,
        lists,
        cfg.catalog.created_offset_minutes,
    ))
}
