//! reqk-catalog
//!
//! Reads the three catalog collections (items, item details, instruction text)
//! through an injected [`CatalogQueryRunner`] and maps them into typed records.
//!
//! Transport failures fail closed to an empty result and are logged. Records
//! missing an id or join key are skipped individually.

pub mod mapping;
pub mod provider;
pub mod query;
pub mod rest;

use chrono::{FixedOffset, Offset, Utc};
use reqk_schemas::{CatalogItem, DirectoryUser, InstructionText, ItemDetailVariant};
use tracing::{debug, error, info, warn};

use mapping::{fields, AuthorIndex, MappingContext, RecordAnomaly};

pub use provider::{CatalogError, CatalogQueryRunner, RawRecord};
pub use query::{escape_odata_literal, ODataQuery, SortDirection};
pub use rest::RestQueryRunner;

/// Upper bound on rows requested per collection.
const MAX_ROWS: u32 = 5000;

/// Collection identifiers for the three catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLists {
    pub items: String,
    pub details: String,
    pub instructions: String,
}

impl Default for CatalogLists {
    fn default() -> Self {
        Self {
            items: "Items".to_string(),
            details: "ItemDetails".to_string(),
            instructions: "InstructionText".to_string(),
        }
    }
}

pub struct CatalogRepository<R> {
    runner: R,
    lists: CatalogLists,
    created_offset: FixedOffset,
}

impl<R: CatalogQueryRunner> CatalogRepository<R> {
    /// `created_offset_minutes` must lie strictly inside ±24h; anything else
    /// is logged and falls back to UTC.
    pub fn new(runner: R, lists: CatalogLists, created_offset_minutes: i32) -> Self {
        let created_offset = created_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    created_offset_minutes,
                    "created offset out of range; using UTC"
                );
                Utc.fix()
            });
        Self {
            runner,
            lists,
            created_offset,
        }
    }

    pub fn items_query() -> ODataQuery {
        ODataQuery::new()
            .select(&[
                fields::ID,
                fields::TITLE,
                fields::ORDER,
                fields::BRANDS,
                fields::CREATED,
                fields::AUTHOR_EMAIL,
                fields::AUTHOR_TITLE,
            ])
            .expand(&[fields::AUTHOR])
            .order_by_asc(fields::ORDER)
            .top(MAX_ROWS)
    }

    pub fn details_query() -> ODataQuery {
        ODataQuery::new()
            .select(&[
                fields::ID,
                fields::TITLE,
                fields::ORDER,
                fields::SIZES,
                fields::ITEM_TITLE,
                fields::CREATED,
                fields::AUTHOR_EMAIL,
                fields::AUTHOR_TITLE,
            ])
            .expand(&[fields::ITEM, fields::AUTHOR])
            .order_by_asc(fields::ORDER)
            .top(MAX_ROWS)
    }

    /// Instruction rows whose title contains `form_name`.
    pub fn instructions_query(form_name: &str) -> ODataQuery {
        ODataQuery::new()
            .select(&[
                fields::ID,
                fields::TITLE,
                fields::ORDER,
                fields::INSTRUCTION,
                fields::CREATED,
                fields::AUTHOR_EMAIL,
                fields::AUTHOR_TITLE,
            ])
            .expand(&[fields::AUTHOR])
            .filter_substring(fields::TITLE, form_name)
            .order_by_asc(fields::ORDER)
            .top(MAX_ROWS)
    }

    pub async fn fetch_items(&self, directory: &[DirectoryUser]) -> Vec<CatalogItem> {
        let raw = self.run(&self.lists.items, &Self::items_query()).await;
        self.map_all(&raw, directory, &self.lists.items, mapping::map_item)
    }

    pub async fn fetch_item_details(&self, directory: &[DirectoryUser]) -> Vec<ItemDetailVariant> {
        let raw = self.run(&self.lists.details, &Self::details_query()).await;
        self.map_all(&raw, directory, &self.lists.details, mapping::map_detail)
    }

    pub async fn fetch_instructions(
        &self,
        form_name: &str,
        directory: &[DirectoryUser],
    ) -> Vec<InstructionText> {
        let raw = self
            .run(&self.lists.instructions, &Self::instructions_query(form_name))
            .await;
        self.map_all(&raw, directory, &self.lists.instructions, mapping::map_instruction)
    }

    async fn run(&self, collection: &str, query: &ODataQuery) -> Vec<RawRecord> {
        match self.runner.query(collection, query).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    source = self.runner.source_name(),
                    collection,
                    error = %err,
                    "catalog query failed; returning empty collection"
                );
                Vec::new()
            }
        }
    }

    fn map_all<T>(
        &self,
        raw: &[RawRecord],
        directory: &[DirectoryUser],
        collection: &str,
        map: impl Fn(&RawRecord, &MappingContext<'_>) -> Result<T, RecordAnomaly>,
    ) -> Vec<T> {
        let authors = AuthorIndex::new(directory);
        let ctx = MappingContext {
            authors: &authors,
            created_offset: self.created_offset,
        };

        let mut out = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;
        for rec in raw {
            match map(rec, &ctx) {
                Ok(v) => out.push(v),
                Err(anomaly) => {
                    skipped += 1;
                    debug!(collection, %anomaly, "skipping catalog record");
                }
            }
        }
        info!(collection, mapped = out.len(), skipped, "catalog collection loaded");
        out
    }
}
