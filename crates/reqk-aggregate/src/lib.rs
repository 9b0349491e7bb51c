//! reqk-aggregate
//!
//! Merges catalog items with their detail variants into [`ItemAggregate`]s.
//!
//! Items and details share no foreign key; they join on the trimmed,
//! lower-cased item title ([`JoinKey`]). A typo in either catalog orphans the
//! detail: it is reported in [`AggregationReport::orphaned_details`] and
//! otherwise ignored.
//!
//! Pure logic. No IO.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use reqk_schemas::{CatalogItem, ItemAggregate, ItemDetailVariant};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Normalized title used to join items and details.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn new(title: &str) -> Self {
        Self(title.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Detail index
// ---------------------------------------------------------------------------

/// Details grouped by parent join key, keys computed once per record.
///
/// Within a group, fetch order is kept and repeated detail titles are dropped
/// (first wins).
#[derive(Debug, Default)]
pub struct DetailIndex {
    by_parent: HashMap<JoinKey, Vec<ItemDetailVariant>>,
    skipped: usize,
}

impl DetailIndex {
    pub fn new(details: &[ItemDetailVariant]) -> Self {
        let mut index = Self::default();
        for d in details {
            let key = JoinKey::new(&d.parent_item_title);
            if key.is_empty() || d.title.trim().is_empty() {
                index.skipped += 1;
                debug!(detail_id = d.id, "detail without title or parent skipped");
                continue;
            }
            let group = index.by_parent.entry(key).or_default();
            if group.iter().any(|g| g.title == d.title) {
                continue;
            }
            group.push(d.clone());
        }
        index
    }

    pub fn get(&self, key: &JoinKey) -> &[ItemDetailVariant] {
        self.by_parent.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn keys(&self) -> impl Iterator<Item = &JoinKey> {
        self.by_parent.keys()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Side information gathered while building aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    /// Items dropped for a blank title.
    pub skipped_items: usize,
    /// Details dropped for a blank title or parent title.
    pub skipped_details: usize,
    /// Items folded into an earlier item with the same join key.
    pub merged_duplicate_items: usize,
    /// Parent join keys of details that matched no item (sorted).
    pub orphaned_details: Vec<String>,
}

impl AggregationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_items == 0
            && self.skipped_details == 0
            && self.merged_duplicate_items == 0
            && self.orphaned_details.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build aggregates; see [`build_with_report`].
pub fn build(items: &[CatalogItem], details: &[ItemDetailVariant]) -> Vec<ItemAggregate> {
    let (aggregates, report) = build_with_report(items, details);
    if !report.orphaned_details.is_empty() {
        warn!(
            orphaned = ?report.orphaned_details,
            "detail rows reference item titles that do not exist"
        );
    }
    aggregates
}

struct Pending<'a> {
    index: usize,
    order: Option<f64>,
    title: &'a str,
    key: JoinKey,
    brands: Vec<String>,
}

/// One aggregate per distinct item join key, sorted by `order` (missing last,
/// ties by fetch position) and renumbered 1..N.
pub fn build_with_report(
    items: &[CatalogItem],
    details: &[ItemDetailVariant],
) -> (Vec<ItemAggregate>, AggregationReport) {
    let index = DetailIndex::new(details);
    let mut report = AggregationReport {
        skipped_details: index.skipped,
        ..AggregationReport::default()
    };

    let mut pending: Vec<Pending<'_>> = Vec::with_capacity(items.len());
    let mut position: HashMap<JoinKey, usize> = HashMap::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let key = JoinKey::new(&item.title);
        if key.is_empty() {
            report.skipped_items += 1;
            debug!(item_id = item.id, "item without title skipped");
            continue;
        }
        match position.get(&key) {
            Some(&p) => {
                report.merged_duplicate_items += 1;
                push_unique(&mut pending[p].brands, &item.brands);
            }
            None => {
                position.insert(key.clone(), pending.len());
                let mut brands = Vec::with_capacity(item.brands.len());
                push_unique(&mut brands, &item.brands);
                pending.push(Pending {
                    index: i,
                    order: item.order,
                    title: item.title.trim(),
                    key,
                    brands,
                });
            }
        }
    }

    // The tie-break on fetch position makes the ordering total, so the result
    // does not depend on sort stability.
    pending.sort_by(|a, b| compare_order(a.order, b.order).then(a.index.cmp(&b.index)));

    let mut orphaned: Vec<String> = index
        .keys()
        .filter(|k| !position.contains_key(*k))
        .map(|k| k.to_string())
        .collect();
    orphaned.sort();
    report.orphaned_details = orphaned;

    let aggregates = pending
        .into_iter()
        .enumerate()
        .map(|(pos, p)| {
            let details = index.get(&p.key).to_vec();
            let mut sizes: Vec<String> = Vec::new();
            for d in &details {
                push_unique(&mut sizes, &d.sizes);
            }
            ItemAggregate {
                title: p.title.to_string(),
                order: pos as u32 + 1,
                brands: p.brands,
                details,
                sizes,
            }
        })
        .collect();

    (aggregates, report)
}

/// `Some` before `None`; numeric values by total order.
fn compare_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Append values not already present (case-sensitive), skipping blanks.
fn push_unique(dst: &mut Vec<String>, src: &[String]) {
    for s in src {
        if !s.trim().is_empty() && !dst.contains(s) {
            dst.push(s.clone());
        }
    }
}
