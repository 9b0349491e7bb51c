//! reqk-config
//!
//! Layered YAML configuration for the requisition engine.
//!
//! Documents are merged in order (earlier = base, later = override), converted
//! to JSON, checked for literal secrets, canonicalised and hashed. The typed
//! view lives in [`settings`]; token resolution in [`secrets`].

pub mod secrets;
pub mod settings;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

pub use secrets::{resolve_secrets, AccessMode, ResolvedSecrets};
pub use settings::{CatalogSettings, DirectorySettings, EngineConfig, FormSettings};

/// Known secret-like prefixes. A leaf string starting with one of these aborts
/// loading with CONFIG_SECRET_DETECTED. Config stores env var names, never tokens.
const SECRET_PREFIXES: &[&str] = &[
    "eyJ",        // JWT (bearer tokens)
    "Bearer ",    // pasted Authorization header
    "sk-",        // generic API key
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "xoxb-",      // Slack bot token
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Registry of JSON-pointer prefixes the engine actually reads.
///
/// Must match [`settings::EngineConfig`] field-for-field.
pub fn consumed_pointers() -> &'static [&'static str] {
    &[
        "/directory/base_url",
        "/directory/token_env",
        "/directory/page_size",
        "/directory/max_pages",
        "/directory/page_timeout_secs",
        "/directory/denied_email_substrings",
        "/catalog/base_url",
        "/catalog/token_env",
        "/catalog/items_list",
        "/catalog/details_list",
        "/catalog/instructions_list",
        "/catalog/created_offset_minutes",
        "/form/name",
        "/form/approval_stages",
    ]
}

/// Produce an unused-key report.
/// `Fail` returns an error when unused keys exist; `Warn` always returns Ok(report).
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers()
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Normalize JSON pointer: leading "/", no trailing "/" unless root.
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but NOT "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.starts_with(prefix)
        && leaf
            .get(prefix.len()..prefix.len() + 1)
            .map(|c| c == "/")
            .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view with defaults applied.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        // An empty YAML document parses to null; it must not erase the base.
        (a_other, Value::Null) => a_other,
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_override_earlier() {
        let base = "directory:\n  page_size: 100\n  max_pages: 10\n";
        let overlay = "directory:\n  page_size: 50\n";
        let loaded = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
        assert_eq!(loaded.config_json["directory"]["page_size"], 50);
        assert_eq!(loaded.config_json["directory"]["max_pages"], 10);
    }

    #[test]
    fn empty_overlay_keeps_base() {
        let loaded = load_layered_yaml_from_strings(&["form:\n  name: PPE\n", ""]).unwrap();
        assert_eq!(loaded.config_json["form"]["name"], "PPE");
    }

    #[test]
    fn pointer_prefix_respects_segment_boundary() {
        assert!(is_prefix_pointer("/form/name", "/form/name"));
        assert!(is_prefix_pointer("/form/approval_stages", "/form/approval_stages/0"));
        assert!(!is_prefix_pointer("/form/name", "/form/names"));
    }

    #[test]
    fn jwt_literal_is_rejected() {
        let yaml = "directory:\n  token_env: \"eyJhbGciOiJIUzI1NiJ9.payload.sig\"\n";
        let err = load_layered_yaml_from_strings(&[yaml]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("CONFIG_SECRET_DETECTED"));
        assert!(!msg.contains("eyJhbGci"), "secret value must not leak: {msg}");
    }

    #[test]
    fn hash_is_stable_across_key_order() {
        let a = "form:\n  name: PPE\ncatalog:\n  items_list: Items\n";
        let b = "catalog:\n  items_list: Items\nform:\n  name: PPE\n";
        let la = load_layered_yaml_from_strings(&[a]).unwrap();
        let lb = load_layered_yaml_from_strings(&[b]).unwrap();
        assert_eq!(la.config_hash, lb.config_hash);
    }
}
