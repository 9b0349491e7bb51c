use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use reqk_schemas::{Approvals, EmployeeCriteria, ItemRow, RequestHeader, RequestType};
use serde::{Deserialize, Serialize};

/// Whether the record is being saved or submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionMode {
    Draft,
    Submitted,
}

impl SubmissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionMode::Draft => "Draft",
            SubmissionMode::Submitted => "Submitted",
        }
    }
}

/// Why a submission was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The required "Others" row has no size picked.
    MissingOthersSize { item: String },
    /// No row carries any selection.
    NoSelectionMade,
    /// Request type is Replacement and the reason is blank.
    MissingReplacementReason,
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingOthersSize { .. } => "MISSING_OTHERS_SIZE",
            ValidationError::NoSelectionMade => "NO_SELECTION_MADE",
            ValidationError::MissingReplacementReason => "MISSING_REPLACEMENT_REASON",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingOthersSize { item } => {
                write!(f, "{}: '{item}' is required but has no size", self.code())
            }
            ValidationError::NoSelectionMade => {
                write!(f, "{}: select at least one item", self.code())
            }
            ValidationError::MissingReplacementReason => {
                write!(f, "{}: a replacement request needs a reason", self.code())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// One line per row, in row order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLine {
    pub item: String,
    pub required: bool,
    pub brand: Option<String>,
    /// Absent when the raw input is blank or not a whole number.
    pub qty: Option<u32>,
    pub size: Option<String>,
    pub selected_detail: Option<String>,
    /// Free text per slot; present only on the "Others" line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others_text: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub status: SubmissionMode,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub requested_by: String,
    pub request_date: NaiveDate,
    pub request_type: RequestType,
    /// Empty unless the request type is Replacement.
    pub reason: String,
    pub remarks: Option<String>,
    pub lines: Vec<PayloadLine>,
    pub approvals: Approvals,
}

impl Payload {
    pub fn line(&self, item: &str) -> Option<&PayloadLine> {
        self.lines.iter().find(|l| l.item == item)
    }
}

/// A saved form: header, rows as last edited, sign-off chain and the
/// employee's criteria record if one was looked up.
///
/// A state saved before any sign-off has no `approvals`; the caller seeds
/// the chain from the configured stage names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub header: RequestHeader,
    pub rows: Vec<ItemRow>,
    #[serde(default)]
    pub approvals: Option<Approvals>,
    #[serde(default)]
    pub criteria: Option<EmployeeCriteria>,
}
