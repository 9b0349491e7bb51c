//! Raw record → typed catalog record conversion.
//!
//! Each mapper either yields a record or a [`RecordAnomaly`] naming the missing
//! join key. Anomalies are per-record; callers skip and continue.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use reqk_schemas::{
    CatalogItem, DirectoryUser, InstructionText, ItemDetailVariant, RecordMeta, UserRef,
};
use serde_json::Value;

use crate::provider::RawRecord;

/// Store field names.
pub mod fields {
    pub const ID: &str = "Id";
    pub const TITLE: &str = "Title";
    pub const ORDER: &str = "Order";
    pub const CREATED: &str = "Created";
    pub const AUTHOR: &str = "Author";
    pub const AUTHOR_EMAIL: &str = "Author/EMail";
    pub const AUTHOR_TITLE: &str = "Author/Title";
    pub const EMAIL: &str = "EMail";
    pub const BRANDS: &str = "Brands";
    pub const SIZES: &str = "Sizes";
    pub const ITEM: &str = "Item";
    pub const ITEM_TITLE: &str = "Item/Title";
    pub const INSTRUCTION: &str = "Instruction";
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAnomaly {
    MissingId,
    MissingTitle { id: i64 },
    MissingParentTitle { id: i64 },
}

impl fmt::Display for RecordAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordAnomaly::MissingId => write!(f, "record has no usable id"),
            RecordAnomaly::MissingTitle { id } => write!(f, "record {id} has no title"),
            RecordAnomaly::MissingParentTitle { id } => {
                write!(f, "detail {id} has no parent item title")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Author resolution
// ---------------------------------------------------------------------------

/// Directory users keyed by lower-cased e-mail, built once per fetch.
#[derive(Debug, Default)]
pub struct AuthorIndex {
    by_email: HashMap<String, UserRef>,
}

impl AuthorIndex {
    pub fn new(directory: &[DirectoryUser]) -> Self {
        let mut by_email = HashMap::with_capacity(directory.len());
        for u in directory {
            by_email
                .entry(u.email.to_ascii_lowercase())
                .or_insert_with(|| UserRef::from(u));
        }
        Self { by_email }
    }

    pub fn resolve(&self, email: &str) -> Option<UserRef> {
        self.by_email.get(&email.trim().to_ascii_lowercase()).cloned()
    }
}

/// Shared context for one mapping pass.
pub struct MappingContext<'a> {
    pub authors: &'a AuthorIndex,
    pub created_offset: FixedOffset,
}

impl MappingContext<'_> {
    fn meta(&self, rec: &RawRecord) -> RecordMeta {
        let created = rec
            .get(fields::CREATED)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc).with_timezone(&self.created_offset));
        let created_by = rec
            .get(fields::AUTHOR)
            .and_then(|a| a.get(fields::EMAIL))
            .and_then(Value::as_str)
            .and_then(|email| self.authors.resolve(email));
        RecordMeta {
            created,
            created_by,
        }
    }
}

// ---------------------------------------------------------------------------
// Mappers
// ---------------------------------------------------------------------------

pub fn map_item(rec: &RawRecord, ctx: &MappingContext<'_>) -> Result<CatalogItem, RecordAnomaly> {
    let id = read_id(rec)?;
    let title = read_text(rec, fields::TITLE).ok_or(RecordAnomaly::MissingTitle { id })?;
    Ok(CatalogItem {
        id,
        title,
        order: read_number(rec, fields::ORDER),
        brands: read_multi(rec, fields::BRANDS),
        meta: ctx.meta(rec),
    })
}

pub fn map_detail(
    rec: &RawRecord,
    ctx: &MappingContext<'_>,
) -> Result<ItemDetailVariant, RecordAnomaly> {
    let id = read_id(rec)?;
    let title = read_text(rec, fields::TITLE).ok_or(RecordAnomaly::MissingTitle { id })?;
    let parent_item_title = read_lookup_title(rec, fields::ITEM)
        .ok_or(RecordAnomaly::MissingParentTitle { id })?;
    Ok(ItemDetailVariant {
        id,
        title,
        parent_item_title,
        order: read_number(rec, fields::ORDER),
        sizes: read_multi(rec, fields::SIZES),
        meta: ctx.meta(rec),
    })
}

pub fn map_instruction(
    rec: &RawRecord,
    ctx: &MappingContext<'_>,
) -> Result<InstructionText, RecordAnomaly> {
    let id = read_id(rec)?;
    let title = read_text(rec, fields::TITLE).ok_or(RecordAnomaly::MissingTitle { id })?;
    Ok(InstructionText {
        id,
        title,
        order: read_number(rec, fields::ORDER),
        text: read_text(rec, fields::INSTRUCTION).unwrap_or_default(),
        meta: ctx.meta(rec),
    })
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

/// Int-like id: a JSON integer, an integral float, or a numeric string.
fn read_id(rec: &RawRecord) -> Result<i64, RecordAnomaly> {
    let v = rec.get(fields::ID).ok_or(RecordAnomaly::MissingId)?;
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or(RecordAnomaly::MissingId)
}

fn read_text(rec: &RawRecord, field: &str) -> Option<String> {
    rec.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn read_number(rec: &RawRecord, field: &str) -> Option<f64> {
    match rec.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Expanded lookup (`{"Title": ".."}`) or a plain string.
fn read_lookup_title(rec: &RawRecord, field: &str) -> Option<String> {
    let v = rec.get(field)?;
    let s = match v {
        Value::Object(o) => o.get(fields::TITLE).and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }?;
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Multi-value field: a JSON array, a verbose `{"results": [...]}` wrapper, or a
/// delimited string (`;`, newline, SharePoint `;#`). Commas stay inside values.
fn read_multi(rec: &RawRecord, field: &str) -> Vec<String> {
    let values: Vec<String> = match rec.get(field) {
        Some(Value::Array(arr)) => arr.iter().filter_map(value_text).collect(),
        Some(Value::Object(o)) => match o.get("results") {
            Some(Value::Array(arr)) => arr.iter().filter_map(value_text).collect(),
            _ => Vec::new(),
        },
        Some(Value::String(s)) => s
            .split([';', '\n'])
            .map(|p| p.trim().trim_matches('#').trim().to_string())
            .collect(),
        _ => Vec::new(),
    };
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> RawRecord {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    fn user(id: &str, email: &str) -> DirectoryUser {
        DirectoryUser {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            email: email.to_string(),
            job_title: None,
            department: None,
            office_location: None,
            mobile_phone: None,
            manager: None,
        }
    }

    fn ctx(index: &AuthorIndex) -> MappingContext<'_> {
        MappingContext {
            authors: index,
            created_offset: FixedOffset::east_opt(8 * 3600).unwrap(),
        }
    }

    #[test]
    fn item_maps_string_id_brands_and_author() {
        let index = AuthorIndex::new(&[user("u1", "Ana@Corp.com")]);
        let r = rec(json!({
            "Id": "12",
            "Title": " Safety Helmet ",
            "Order": 200,
            "Brands": {"results": ["MSA", "3M", "MSA"]},
            "Created": "2024-03-01T20:00:00Z",
            "Author": {"EMail": "ana@corp.com", "Title": "Ana"}
        }));
        let item = map_item(&r, &ctx(&index)).unwrap();
        assert_eq!(item.id, 12);
        assert_eq!(item.title, "Safety Helmet");
        assert_eq!(item.order, Some(200.0));
        assert_eq!(item.brands, ["MSA", "3M"]);
        assert_eq!(item.meta.created_by.unwrap().id, "u1");
        assert_eq!(
            item.meta.created.unwrap().to_rfc3339(),
            "2024-03-02T04:00:00+08:00"
        );
    }

    #[test]
    fn unknown_author_resolves_to_none() {
        let index = AuthorIndex::new(&[]);
        let r = rec(json!({"Id": 1, "Title": "Vest", "Author": {"EMail": "ghost@corp.com"}}));
        let item = map_item(&r, &ctx(&index)).unwrap();
        assert_eq!(item.meta.created_by, None);
        assert_eq!(item.order, None);
    }

    #[test]
    fn detail_requires_parent_title() {
        let index = AuthorIndex::default();
        let r = rec(json!({"Id": 5, "Title": "White", "Item": {"Title": "  "}}));
        assert_eq!(
            map_detail(&r, &ctx(&index)).unwrap_err(),
            RecordAnomaly::MissingParentTitle { id: 5 }
        );
    }

    #[test]
    fn detail_sizes_accept_delimited_string() {
        let index = AuthorIndex::default();
        let r = rec(json!({
            "Id": 5, "Title": "White", "Item": "Safety Helmet",
            "Sizes": ";#S;#M;#L;#"
        }));
        let d = map_detail(&r, &ctx(&index)).unwrap();
        assert_eq!(d.parent_item_title, "Safety Helmet");
        assert_eq!(d.sizes, ["S", "M", "L"]);
    }

    #[test]
    fn missing_or_bogus_id_is_an_anomaly() {
        let index = AuthorIndex::default();
        let none = rec(json!({"Title": "Vest"}));
        let bogus = rec(json!({"Id": "abc", "Title": "Vest"}));
        assert_eq!(map_item(&none, &ctx(&index)).unwrap_err(), RecordAnomaly::MissingId);
        assert_eq!(map_item(&bogus, &ctx(&index)).unwrap_err(), RecordAnomaly::MissingId);
    }

    #[test]
    fn instruction_text_defaults_to_empty() {
        let index = AuthorIndex::default();
        let r = rec(json!({"Id": 3, "Title": "PPE Form - Note", "Order": "1.5"}));
        let t = map_instruction(&r, &ctx(&index)).unwrap();
        assert_eq!(t.text, "");
        assert_eq!(t.order, Some(1.5));
    }

    #[test]
    fn commas_stay_inside_delimited_values() {
        let index = AuthorIndex::default();
        let r = rec(json!({
            "Id": 9, "Title": "Gloves",
            "Brands": "Honeywell, Inc.;#3M\nAnsell"
        }));
        let item = map_item(&r, &ctx(&index)).unwrap();
        assert_eq!(item.brands, ["Honeywell, Inc.", "3M", "Ansell"]);
    }
}
