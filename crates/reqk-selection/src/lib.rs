//! reqk-selection
//!
//! Cascading selection state for the requisition rows.
//!
//! # Design
//!
//! A [`RowSet`] holds one shared [`ItemRow`] per aggregate. Every user edit is a
//! [`SelectionEvent`] applied through [`RowSet::apply`], which returns a new
//! `RowSet`:
//!
//! 1. **Exactly one row changes.** All other rows keep their `Arc` identity,
//!    so a host can diff by pointer.
//! 2. **Illegal or stale events are no-ops.** Out-of-range indices, brands or
//!    details the row does not offer, and unchecks of a value that is not the
//!    current selection leave the set untouched.
//! 3. **Detail changes clear the size.** A size is only ever valid for the
//!    detail it was picked under.
//!
//! ```text
//!   brand ──┐
//!           ├── (independent)
//!   detail ─┴──► size   (reset whenever detail changes)
//! ```

pub mod criteria;

use std::collections::HashSet;
use std::sync::Arc;

use reqk_schemas::{ItemAggregate, ItemRow};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use criteria::{apply_criteria, apply_criteria_for};

// ---------------------------------------------------------------------------
// SelectionEvent
// ---------------------------------------------------------------------------

/// User edits that drive row transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEvent {
    ToggleRequired { checked: bool },
    /// Unchecking clears only when `brand` is the current selection.
    ToggleBrand { brand: String, checked: bool },
    /// Same as brand; any change of the effective detail clears the size.
    ToggleDetail { detail: String, checked: bool },
    /// Selecting the current size clears it.
    ToggleSize { size: String },
    /// Raw text; numeric coercion happens at assembly.
    UpdateQty { raw: String },
    /// "Others" only. Empty text removes the slot.
    UpdateFreeText { slot: String, text: String },
}

// ---------------------------------------------------------------------------
// RowSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    rows: Vec<Arc<ItemRow>>,
}

impl RowSet {
    /// One blank row per aggregate, same order.
    pub fn from_aggregates(aggregates: &[ItemAggregate]) -> Self {
        Self::from_rows(aggregates.iter().map(ItemRow::from_aggregate).collect())
    }

    /// Adopt externally held rows (e.g. a saved draft).
    ///
    /// Rows repeating an earlier item title are dropped, and selections that
    /// break a row invariant are cleared.
    pub fn from_rows(rows: Vec<ItemRow>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !seen.insert(row.item.trim().to_lowercase()) {
                warn!(item = %row.item, "duplicate row dropped");
                continue;
            }
            sanitize(&mut row);
            out.push(Arc::new(row));
        }
        Self { rows: out }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ItemRow> {
        self.rows.get(index).map(Arc::as_ref)
    }

    /// Shared handle to a row, for identity comparisons.
    pub fn shared(&self, index: usize) -> Option<&Arc<ItemRow>> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRow> + Clone {
        self.rows.iter().map(Arc::as_ref)
    }

    pub fn position(&self, item: &str) -> Option<usize> {
        let want = item.trim().to_lowercase();
        self.rows
            .iter()
            .position(|r| r.item.trim().to_lowercase() == want)
    }

    pub fn to_rows(&self) -> Vec<ItemRow> {
        self.iter().cloned().collect()
    }

    /// Apply one event to the row at `index`.
    pub fn apply(&self, index: usize, event: &SelectionEvent) -> RowSet {
        let Some(current) = self.rows.get(index) else {
            return self.clone();
        };
        match transition(current, event) {
            Some(mut next) => {
                next.touched = true;
                self.with_row(index, next)
            }
            None => self.clone(),
        }
    }

    pub fn toggle_required(&self, index: usize, checked: bool) -> RowSet {
        self.apply(index, &SelectionEvent::ToggleRequired { checked })
    }

    pub fn toggle_brand(&self, index: usize, brand: &str, checked: bool) -> RowSet {
        self.apply(
            index,
            &SelectionEvent::ToggleBrand {
                brand: brand.to_string(),
                checked,
            },
        )
    }

    pub fn toggle_detail(&self, index: usize, detail: &str, checked: bool) -> RowSet {
        self.apply(
            index,
            &SelectionEvent::ToggleDetail {
                detail: detail.to_string(),
                checked,
            },
        )
    }

    pub fn toggle_size(&self, index: usize, size: &str) -> RowSet {
        self.apply(
            index,
            &SelectionEvent::ToggleSize {
                size: size.to_string(),
            },
        )
    }

    pub fn update_qty(&self, index: usize, raw: &str) -> RowSet {
        self.apply(
            index,
            &SelectionEvent::UpdateQty {
                raw: raw.to_string(),
            },
        )
    }

    pub fn update_free_text(&self, index: usize, slot: &str, text: &str) -> RowSet {
        self.apply(
            index,
            &SelectionEvent::UpdateFreeText {
                slot: slot.to_string(),
                text: text.to_string(),
            },
        )
    }

    /// Replace one row, sharing every other.
    pub(crate) fn with_row(&self, index: usize, row: ItemRow) -> RowSet {
        let mut rows = self.rows.clone();
        rows[index] = Arc::new(row);
        RowSet { rows }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Next row state, or `None` when the event changes nothing.
fn transition(row: &ItemRow, event: &SelectionEvent) -> Option<ItemRow> {
    match event {
        SelectionEvent::ToggleRequired { checked } => {
            if row.required == *checked {
                return None;
            }
            let mut next = row.clone();
            next.required = *checked;
            Some(next)
        }

        SelectionEvent::ToggleBrand { brand, checked } => {
            let is_current = row.brand_selected.as_deref() == Some(brand.as_str());
            if *checked {
                if is_current || !row.brands.contains(brand) {
                    return None;
                }
                let mut next = row.clone();
                next.brand_selected = Some(brand.clone());
                Some(next)
            } else {
                if !is_current {
                    return None;
                }
                let mut next = row.clone();
                next.brand_selected = None;
                Some(next)
            }
        }

        SelectionEvent::ToggleDetail { detail, checked } => {
            let is_current = row.selected_detail.as_deref() == Some(detail.as_str());
            let target = if *checked {
                if is_current || row.detail(detail).is_none() {
                    return None;
                }
                Some(detail.clone())
            } else {
                if !is_current {
                    return None;
                }
                None
            };
            let mut next = row.clone();
            next.selected_detail = target;
            next.item_size_selected = None;
            Some(next)
        }

        SelectionEvent::ToggleSize { size } => {
            let mut next = row.clone();
            if row.item_size_selected.as_deref() == Some(size.as_str()) {
                next.item_size_selected = None;
            } else if row.selectable_sizes().contains(size) {
                next.item_size_selected = Some(size.clone());
            } else {
                return None;
            }
            Some(next)
        }

        SelectionEvent::UpdateQty { raw } => {
            let qty = (!raw.is_empty()).then(|| raw.clone());
            if row.qty == qty {
                return None;
            }
            let mut next = row.clone();
            next.qty = qty;
            Some(next)
        }

        SelectionEvent::UpdateFreeText { slot, text } => {
            if !row.is_others() || slot.trim().is_empty() {
                return None;
            }
            if !row.details.is_empty() && row.detail(slot).is_none() {
                return None;
            }
            let mut next = row.clone();
            if text.is_empty() {
                next.free_text.remove(slot)?;
            } else {
                if row.free_text.get(slot) == Some(text) {
                    return None;
                }
                next.free_text.insert(slot.clone(), text.clone());
            }
            Some(next)
        }
    }
}

/// Clear any selection that is not offered by the row.
fn sanitize(row: &mut ItemRow) {
    if let Some(b) = &row.brand_selected {
        if !row.brands.contains(b) {
            warn!(item = %row.item, brand = %b, "stale brand selection cleared");
            row.brand_selected = None;
        }
    }
    if let Some(d) = &row.selected_detail {
        if row.detail(d).is_none() {
            warn!(item = %row.item, detail = %d, "stale detail selection cleared");
            row.selected_detail = None;
            row.item_size_selected = None;
        }
    }
    if let Some(s) = &row.item_size_selected {
        if !row.selectable_sizes().contains(s) {
            warn!(item = %row.item, size = %s, "stale size selection cleared");
            row.item_size_selected = None;
        }
    }
}
