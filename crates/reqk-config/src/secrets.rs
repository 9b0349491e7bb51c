//! Bearer-token resolution.
//!
//! Config YAML stores only env var NAMES (`directory.token_env`,
//! `catalog.token_env`). Callers resolve once at startup and pass the result to
//! constructors. `Debug` redacts values; errors name the variable, never the value.

use anyhow::{bail, Result};

use crate::settings::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Nothing is fetched; tokens are optional.
    Offline,
    /// Directory and catalog are fetched; both tokens are required.
    Online,
}

#[derive(Clone)]
pub struct ResolvedSecrets {
    pub directory_token: Option<String>,
    pub catalog_token: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "directory_token",
                &self.directory_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "catalog_token",
                &self.catalog_token.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Returns `None` if the variable is unset or blank.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

pub fn resolve_secrets(cfg: &EngineConfig, mode: AccessMode) -> Result<ResolvedSecrets> {
    resolve_secrets_with(cfg, mode, resolve_env)
}

/// Same as [`resolve_secrets`] with an injectable lookup (tests avoid touching
/// process-global env).
pub fn resolve_secrets_with(
    cfg: &EngineConfig,
    mode: AccessMode,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedSecrets> {
    let directory_token = lookup(&cfg.directory.token_env);
    let catalog_token = lookup(&cfg.catalog.token_env);

    if mode == AccessMode::Online {
        if directory_token.is_none() {
            bail!(
                "SECRETS_MISSING mode=ONLINE: required env var '{}' \
                 (directory token) is not set or empty",
                cfg.directory.token_env,
            );
        }
        if catalog_token.is_none() {
            bail!(
                "SECRETS_MISSING mode=ONLINE: required env var '{}' \
                 (catalog token) is not set or empty",
                cfg.catalog.token_env,
            );
        }
    }

    Ok(ResolvedSecrets {
        directory_token,
        catalog_token,
    })
}
