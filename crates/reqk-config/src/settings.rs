//! Typed view over the merged config JSON.
//!
//! Every field has a default so an empty config yields a usable offline engine.
//! Keys here must stay in sync with [`crate::consumed_pointers`].

use anyhow::{bail, Context, Result};
use reqk_schemas::{APPROVAL_STAGE_COUNT, DEFAULT_APPROVAL_STAGES};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub directory: DirectorySettings,
    pub catalog: CatalogSettings,
    pub form: FormSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    pub base_url: String,
    /// Name of the env var holding the directory bearer token.
    pub token_env: String,
    pub page_size: u32,
    /// Hard cap on pages per refresh; a longer cursor chain is treated as a fault.
    pub max_pages: u32,
    pub page_timeout_secs: u64,
    /// Appended to the built-in denylist.
    pub denied_email_substrings: Vec<String>,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: "https://graph.microsoft.com/v1.0".to_string(),
            token_env: "REQK_DIRECTORY_TOKEN".to_string(),
            page_size: 999,
            max_pages: 500,
            page_timeout_secs: 30,
            denied_email_substrings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    pub token_env: String,
    pub items_list: String,
    pub details_list: String,
    pub instructions_list: String,
    /// Fixed offset applied to every `Created` timestamp.
    pub created_offset_minutes: i32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_env: "REQK_CATALOG_TOKEN".to_string(),
            items_list: "Items".to_string(),
            details_list: "ItemDetails".to_string(),
            instructions_list: "InstructionText".to_string(),
            created_offset_minutes: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub name: String,
    pub approval_stages: Vec<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            name: "Equipment Requisition".to_string(),
            approval_stages: DEFAULT_APPROVAL_STAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FormSettings {
    pub fn approval_stages(&self) -> Result<[String; APPROVAL_STAGE_COUNT]> {
        match <[String; APPROVAL_STAGE_COUNT]>::try_from(self.approval_stages.clone()) {
            Ok(stages) => Ok(stages),
            Err(v) => bail!(
                "CONFIG_INVALID /form/approval_stages: expected exactly {} stages, got {}",
                APPROVAL_STAGE_COUNT,
                v.len()
            ),
        }
    }
}

impl EngineConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: EngineConfig =
            serde_json::from_value(config_json.clone()).context("config shape invalid")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.directory.page_size == 0 {
            bail!("CONFIG_INVALID /directory/page_size must be > 0");
        }
        if self.directory.max_pages == 0 {
            bail!("CONFIG_INVALID /directory/max_pages must be > 0");
        }
        if self.directory.page_timeout_secs == 0 {
            bail!("CONFIG_INVALID /directory/page_timeout_secs must be > 0");
        }
        if !(-1439..=1439).contains(&self.catalog.created_offset_minutes) {
            bail!("CONFIG_INVALID /catalog/created_offset_minutes must be strictly within one day");
        }
        self.form.approval_stages()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = EngineConfig::from_json(&json!({})).unwrap();
        assert_eq!(cfg.directory.page_size, 999);
        assert_eq!(cfg.catalog.created_offset_minutes, 480);
        assert_eq!(cfg.form.approval_stages().unwrap()[0], "Requested By");
    }

    #[test]
    fn wrong_stage_count_is_rejected() {
        let err = EngineConfig::from_json(&json!({"form": {"approval_stages": ["a", "b"]}}))
            .unwrap_err();
        assert!(err.to_string().contains("approval_stages"));
    }

    #[test]
    fn zero_max_pages_is_rejected() {
        assert!(EngineConfig::from_json(&json!({"directory": {"max_pages": 0}})).is_err());
    }

    #[test]
    fn offset_must_be_strictly_inside_a_day() {
        for bad in [1440, -1440, 2000] {
            let err = EngineConfig::from_json(&json!({"catalog": {"created_offset_minutes": bad}}))
                .unwrap_err();
            assert!(err.to_string().contains("created_offset_minutes"), "{bad}");
        }
        for ok in [1439, -1439, 0] {
            assert!(EngineConfig::from_json(&json!({"catalog": {"created_offset_minutes": ok}})).is_ok());
        }
    }
}
