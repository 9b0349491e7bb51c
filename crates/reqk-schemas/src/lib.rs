//! reqk-schemas
//!
//! Shared data model for the requisition engine: directory users, catalog
//! records, the per-item aggregate, the mutable row state, employee criteria,
//! the request header and the fixed approval chain.
//!
//! Types only. Fetching lives in `reqk-directory` / `reqk-catalog`, shaping in
//! `reqk-aggregate`, transitions in `reqk-selection`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Title of the sentinel catalog item whose detail slots are free text.
pub const OTHERS_ITEM: &str = "Others";

/// Returns `true` when `title` names the "Others" sentinel (case-insensitive, trimmed).
pub fn is_others(title: &str) -> bool {
    title.trim().eq_ignore_ascii_case(OTHERS_ITEM)
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    pub id: String,
    pub display_name: String,
}

/// A directory user after normalization. Identity key is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    pub mobile_phone: Option<String>,
    pub manager: Option<ManagerRef>,
}

/// Compact author reference attached to catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

impl From<&DirectoryUser> for UserRef {
    fn from(u: &DirectoryUser) -> Self {
        Self {
            id: u.id.clone(),
            display_name: u.display_name.clone(),
            email: u.email.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Audit metadata every catalog record carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Creation time shifted into the configured fixed offset.
    pub created: Option<DateTime<FixedOffset>>,
    /// Author resolved against the directory; `None` when no user matched.
    pub created_by: Option<UserRef>,
}

/// A canonical requisition item (e.g. "Safety Helmet").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    /// Administrative sort key; `None` sorts last.
    pub order: Option<f64>,
    pub brands: Vec<String>,
    #[serde(default)]
    pub meta: RecordMeta,
}

/// A sub-classification of a [`CatalogItem`], joined by parent title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetailVariant {
    pub id: i64,
    pub title: String,
    pub parent_item_title: String,
    pub order: Option<f64>,
    pub sizes: Vec<String>,
    #[serde(default)]
    pub meta: RecordMeta,
}

/// Instruction text displayed with a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionText {
    pub id: i64,
    pub title: String,
    pub order: Option<f64>,
    pub text: String,
    #[serde(default)]
    pub meta: RecordMeta,
}

/// One catalog item merged with its detail variants.
///
/// `order` is the dense 1..N position after sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAggregate {
    pub title: String,
    pub order: u32,
    pub brands: Vec<String>,
    pub details: Vec<ItemDetailVariant>,
    pub sizes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Row state
// ---------------------------------------------------------------------------

/// A selectable detail as exposed on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailChoice {
    pub title: String,
    pub sizes: Vec<String>,
}

/// Mutable form state for one aggregate. Rows are 1:1 with aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item: String,
    pub order: u32,
    pub brands: Vec<String>,
    #[serde(default)]
    pub brand_selected: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Raw user input; coerced to a number only at assembly time.
    #[serde(default)]
    pub qty: Option<String>,
    pub details: Vec<DetailChoice>,
    #[serde(default)]
    pub selected_detail: Option<String>,
    pub item_sizes: Vec<String>,
    #[serde(default)]
    pub item_size_selected: Option<String>,
    /// Free text per nominal detail slot; only used by the "Others" row.
    #[serde(default)]
    pub free_text: BTreeMap<String, String>,
    /// Set once any user-originated transition has been applied.
    #[serde(default)]
    pub touched: bool,
}

impl ItemRow {
    pub fn from_aggregate(agg: &ItemAggregate) -> Self {
        Self {
            item: agg.title.clone(),
            order: agg.order,
            brands: agg.brands.clone(),
            brand_selected: None,
            required: false,
            qty: None,
            details: agg
                .details
                .iter()
                .map(|d| DetailChoice {
                    title: d.title.clone(),
                    sizes: d.sizes.clone(),
                })
                .collect(),
            selected_detail: None,
            item_sizes: agg.sizes.clone(),
            item_size_selected: None,
            free_text: BTreeMap::new(),
            touched: false,
        }
    }

    pub fn is_others(&self) -> bool {
        is_others(&self.item)
    }

    pub fn detail(&self, title: &str) -> Option<&DetailChoice> {
        self.details.iter().find(|d| d.title == title)
    }

    /// Sizes a selection may currently be drawn from.
    ///
    /// "Others" draws from the raw union; every other row only from the
    /// selected detail (empty when no detail is selected).
    pub fn selectable_sizes(&self) -> &[String] {
        if self.is_others() {
            return &self.item_sizes;
        }
        self.selected_detail
            .as_deref()
            .and_then(|t| self.detail(t))
            .map(|d| d.sizes.as_slice())
            .unwrap_or(&[])
    }

    /// Returns `true` when any of required/brand/detail/size is set.
    pub fn has_selection(&self) -> bool {
        self.required
            || self.brand_selected.is_some()
            || self.selected_detail.is_some()
            || self.item_size_selected.is_some()
    }
}

// ---------------------------------------------------------------------------
// Employee criteria
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledFacet {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
}

/// One named facet of an eligibility record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriteriaFacet {
    Flag(bool),
    Labelled(LabelledFacet),
}

impl CriteriaFacet {
    pub fn label(&self) -> Option<&str> {
        match self {
            CriteriaFacet::Labelled(f) => f.label.as_deref().filter(|l| !l.trim().is_empty()),
            CriteriaFacet::Flag(_) => None,
        }
    }
}

/// Prior-assigned equipment for an employee, keyed by facet name (e.g. "Rain Suit").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCriteria {
    pub employee_id: String,
    #[serde(default)]
    pub facets: BTreeMap<String, CriteriaFacet>,
}

// ---------------------------------------------------------------------------
// Header + approvals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    New,
    Replacement,
    Additional,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::New => "New",
            RequestType::Replacement => "Replacement",
            RequestType::Additional => "Additional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub employee_id: String,
    pub employee_name: String,
    #[serde(default)]
    pub employee_email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    pub requested_by: String,
    pub request_date: NaiveDate,
    pub request_type: RequestType,
    #[serde(default)]
    pub replacement_reason: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRow {
    pub sign_off: String,
    pub name: String,
    #[serde(default)]
    pub name_id: Option<String>,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ApprovalRow {
    pub fn pending(sign_off: impl Into<String>) -> Self {
        Self {
            sign_off: sign_off.into(),
            name: String::new(),
            name_id: None,
            status: ApprovalStatus::Pending,
            reason: String::new(),
            date: None,
        }
    }
}

pub const APPROVAL_STAGE_COUNT: usize = 4;

pub const DEFAULT_APPROVAL_STAGES: [&str; APPROVAL_STAGE_COUNT] =
    ["Requested By", "Verified By", "Approved By", "Issued By"];

/// The sign-off chain. Cardinality is fixed by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Approvals(pub [ApprovalRow; APPROVAL_STAGE_COUNT]);

impl Approvals {
    pub fn with_stages(stages: &[String; APPROVAL_STAGE_COUNT]) -> Self {
        Self(std::array::from_fn(|i| ApprovalRow::pending(stages[i].clone())))
    }

    pub fn rows(&self) -> &[ApprovalRow] {
        &self.0
    }
}

impl Default for Approvals {
    fn default() -> Self {
        Self(DEFAULT_APPROVAL_STAGES.map(ApprovalRow::pending))
    }
}
