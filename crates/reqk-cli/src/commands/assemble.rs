//! `reqk assemble`: saved form state in, payload JSON out.
//!
//! Exit codes: 0 payload printed, 2 submission refused, 1 anything else.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use reqk_payload::{assemble, FormState, SubmissionMode};
use reqk_schemas::Approvals;
use reqk_selection::{apply_criteria, RowSet};
use tracing::debug;

use super::load_engine_config;

pub const EXIT_VALIDATION: u8 = 2;

pub fn run_assemble(
    state_path: &str,
    submit: bool,
    config_paths: &[String],
    strict: bool,
) -> Result<ExitCode> {
    let state = load_form_state(state_path)?;
    let approvals = match state.approvals {
        Some(saved) => saved,
        None => seeded_approvals(config_paths, strict)?,
    };

    let mut rows = RowSet::from_rows(state.rows);
    if let Some(criteria) = &state.criteria {
        if criteria.employee_id == state.header.employee_id {
            rows = apply_criteria(&rows, criteria);
        }
    }

    let mode = if submit {
        SubmissionMode::Submitted
    } else {
        SubmissionMode::Draft
    };

    match assemble(&state.header, rows.iter(), &approvals, mode) {
        Ok(payload) => {
            let out = serde_json::to_string_pretty(&payload).context("serialize payload")?;
            println!("{out}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("validation_error={}", err.code());
            eprintln!("{err}");
            Ok(ExitCode::from(EXIT_VALIDATION))
        }
    }
}

/// Pending sign-off chain named by `form.approval_stages`, or the built-in
/// stage names when no config is given.
fn seeded_approvals(config_paths: &[String], strict: bool) -> Result<Approvals> {
    if config_paths.is_empty() {
        debug!("no config given; using built-in approval stages");
        return Ok(Approvals::default());
    }
    let (_loaded, cfg) = load_engine_config(config_paths, strict)?;
    let stages = cfg.form.approval_stages()?;
    Ok(Approvals::with_stages(&stages))
}

fn load_form_state(path: &str) -> Result<FormState> {
    let bytes = fs::read(path).with_context(|| format!("read state failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).context("state file must be UTF-8 text")?;
    let state: FormState =
        serde_json::from_str(raw.trim()).context("state file must contain a valid form state")?;
    Ok(state)
}
