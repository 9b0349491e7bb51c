//! Unknown config keys are reported; `Fail` turns the report into an error.

use reqk_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const BASE_YAML: &str = r#"
directory:
  base_url: "https://graph.example/v1.0"
  page_size: 200
catalog:
  base_url: "https://sites.example/hse"
  items_list: "PPE Items"
form:
  name: "PPE Request"
"#;

const OVERLAY_WITH_TYPO: &str = r#"
directory:
  page_sise: 100
legacy:
  theme: "dark"
"#;

#[test]
fn known_keys_only_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}

#[test]
fn warn_lists_unknown_leaves_sorted() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_WITH_TYPO]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        ["/directory/page_sise", "/legacy/theme"]
    );
}

#[test]
fn fail_policy_errors_and_names_the_key() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_WITH_TYPO]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/directory/page_sise"));
}

#[test]
fn overlay_values_reach_the_typed_view() {
    let loaded = load_layered_yaml_from_strings(&[
        BASE_YAML,
        "directory:\n  denied_email_substrings: [\"@vendor.example\"]\n",
    ])
    .unwrap();
    let cfg = loaded.engine_config().unwrap();
    assert_eq!(cfg.directory.page_size, 200);
    assert_eq!(cfg.directory.denied_email_substrings, ["@vendor.example"]);
    assert_eq!(cfg.catalog.items_list, "PPE Items");
    assert_eq!(cfg.catalog.details_list, "ItemDetails");
}
