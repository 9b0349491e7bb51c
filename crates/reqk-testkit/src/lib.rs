//! Scripted in-memory sources and fixtures for scenario tests.
//!
//! No network I/O. Every call is recorded so tests can assert on what the
//! clients asked for.

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use anyhow::{Context, Result};
use reqk_catalog::{CatalogError, CatalogQueryRunner, ODataQuery, RawRecord};
use reqk_directory::{DirectoryError, DirectoryPage, DirectoryPageFetcher, RawUserRecord};
use reqk_payload::FormState;
use serde_json::{json, Value};

pub mod fixtures;

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Pages keyed by the cursor that requests them (`None` = first page).
#[derive(Default)]
pub struct ScriptedDirectory {
    pages: HashMap<Option<String>, Result<DirectoryPage, DirectoryError>>,
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain `pages` as page 1..N with cursors `p2`, `p3`, ...
    pub fn paged(pages: Vec<Vec<RawUserRecord>>) -> Self {
        let n = pages.len();
        let mut out = Self::new();
        for (i, records) in pages.into_iter().enumerate() {
            let cursor = (i > 0).then(|| format!("p{}", i + 1));
            let next_cursor = (i + 1 < n).then(|| format!("p{}", i + 2));
            out = out.page(cursor.as_deref(), records, next_cursor.as_deref());
        }
        out
    }

    pub fn page(
        mut self,
        cursor: Option<&str>,
        records: Vec<RawUserRecord>,
        next_cursor: Option<&str>,
    ) -> Self {
        self.pages.insert(
            cursor.map(str::to_string),
            Ok(DirectoryPage {
                records,
                next_cursor: next_cursor.map(str::to_string),
            }),
        );
        self
    }

    pub fn failing(mut self, cursor: Option<&str>, err: DirectoryError) -> Self {
        self.pages.insert(cursor.map(str::to_string), Err(err));
        self
    }

    /// Cursors requested so far, in call order.
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DirectoryPageFetcher for ScriptedDirectory {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<DirectoryPage, DirectoryError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cursor.map(str::to_string));
        }
        self.pages
            .get(&cursor.map(str::to_string))
            .cloned()
            .unwrap_or_else(|| {
                Err(DirectoryError::Api {
                    status: Some(404),
                    message: format!("no scripted page for cursor {cursor:?}"),
                })
            })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Rows keyed by collection id. Unknown collections answer with an empty set.
#[derive(Default)]
pub struct ScriptedCatalog {
    collections: HashMap<String, Result<Vec<RawRecord>, CatalogError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `rows` must be JSON objects; anything else is dropped.
    pub fn collection(mut self, id: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .collect();
        self.collections.insert(id.to_string(), Ok(rows));
        self
    }

    pub fn failing(mut self, id: &str, err: CatalogError) -> Self {
        self.collections.insert(id.to_string(), Err(err));
        self
    }

    /// `(collection, rendered query)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl CatalogQueryRunner for ScriptedCatalog {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    async fn query(
        &self,
        collection_id: &str,
        query: &ODataQuery,
    ) -> Result<Vec<RawRecord>, CatalogError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((collection_id.to_string(), query.to_string()));
        }
        self.collections
            .get(collection_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn raw_user(id: &str, display_name: Option<&str>, mail: Option<&str>) -> RawUserRecord {
    RawUserRecord {
        id: Some(id.to_string()),
        display_name: display_name.map(str::to_string),
        mail: mail.map(str::to_string),
        ..RawUserRecord::default()
    }
}

pub fn item_record(id: i64, title: &str, order: Option<f64>, brands: &[&str]) -> Value {
    json!({
        "Id": id,
        "Title": title,
        "Order": order,
        "Brands": brands,
    })
}

pub fn detail_record(id: i64, title: &str, parent: &str, sizes: &[&str]) -> Value {
    json!({
        "Id": id,
        "Title": title,
        "Item": { "Title": parent },
        "Sizes": sizes,
    })
}

pub fn instruction_record(id: i64, title: &str, order: f64, text: &str) -> Value {
    json!({
        "Id": id,
        "Title": title,
        "Order": order,
        "Instruction": text,
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn load_form_state_json(path: &str) -> Result<FormState> {
    let s = fs::read_to_string(path).with_context(|| format!("read form state: {path}"))?;
    let state: FormState = serde_json::from_str(&s).context("parse form state json")?;
    Ok(state)
}
