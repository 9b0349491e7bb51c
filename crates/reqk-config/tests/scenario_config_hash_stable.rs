//! Hashing is deterministic: key order never matters, values always do.

use reqk_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
directory:
  page_size: 500
  denied_email_substrings: ["@vendor.example"]
catalog:
  items_list: "Items"
  created_offset_minutes: 480
"#;

const BASE_YAML_REORDERED: &str = r#"
catalog:
  created_offset_minutes: 480
  items_list: "Items"
directory:
  denied_email_substrings: ["@vendor.example"]
  page_size: 500
"#;

const OVERLAY_YAML: &str = r#"
catalog:
  created_offset_minutes: 0
"#;

#[test]
fn same_inputs_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.config_hash.len(), 64);
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn overlay_changes_hash_and_value() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, merged.config_hash);
    let cfg = merged.engine_config().unwrap();
    assert_eq!(cfg.catalog.created_offset_minutes, 0);
    assert_eq!(cfg.directory.page_size, 500);
}
