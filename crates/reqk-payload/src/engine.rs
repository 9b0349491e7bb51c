use reqk_schemas::{Approvals, ItemRow, RequestHeader, RequestType};
use tracing::{debug, info};

use crate::{Payload, PayloadLine, SubmissionMode, ValidationError};

/// Submission checks, first failure wins.
pub fn validate<'a, I>(header: &RequestHeader, rows: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a ItemRow>,
{
    let mut any_selection = false;
    for row in rows {
        if row.is_others() && row.required && row.item_size_selected.is_none() {
            return Err(ValidationError::MissingOthersSize {
                item: row.item.clone(),
            });
        }
        any_selection |= row.has_selection();
    }
    if !any_selection {
        return Err(ValidationError::NoSelectionMade);
    }
    if header.request_type == RequestType::Replacement && replacement_reason(header).is_empty() {
        return Err(ValidationError::MissingReplacementReason);
    }
    Ok(())
}

/// Build the submission record. Only `Submitted` mode validates.
pub fn assemble<'a, I>(
    header: &RequestHeader,
    rows: I,
    approvals: &Approvals,
    mode: SubmissionMode,
) -> Result<Payload, ValidationError>
where
    I: IntoIterator<Item = &'a ItemRow>,
    I::IntoIter: Clone,
{
    let rows = rows.into_iter();
    if mode == SubmissionMode::Submitted {
        validate(header, rows.clone())?;
    }

    let lines: Vec<PayloadLine> = rows.map(to_line).collect();

    let reason = match header.request_type {
        RequestType::Replacement => replacement_reason(header).to_string(),
        RequestType::New | RequestType::Additional => String::new(),
    };

    info!(
        status = mode.as_str(),
        employee_id = %header.employee_id,
        lines = lines.len(),
        "payload assembled"
    );

    Ok(Payload {
        status: mode,
        employee_id: header.employee_id.clone(),
        employee_name: header.employee_name.clone(),
        employee_email: header.employee_email.clone(),
        department: header.department.clone(),
        job_title: header.job_title.clone(),
        requested_by: header.requested_by.clone(),
        request_date: header.request_date,
        request_type: header.request_type,
        reason,
        remarks: header.remarks.clone(),
        lines,
        approvals: approvals.clone(),
    })
}

/// Whole non-negative number after trimming, else `None`.
pub fn parse_qty(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            debug!(raw, "qty is not a whole number; omitted");
            None
        }
    }
}

fn to_line(row: &ItemRow) -> PayloadLine {
    PayloadLine {
        item: row.item.clone(),
        required: row.required,
        brand: row.brand_selected.clone(),
        qty: parse_qty(row.qty.as_deref()),
        size: row.item_size_selected.clone(),
        selected_detail: row.selected_detail.clone(),
        others_text: row.is_others().then(|| row.free_text.clone()),
    }
}

fn replacement_reason(header: &RequestHeader) -> &str {
    header.replacement_reason.as_deref().unwrap_or("").trim()
}
