//! Prefill of detail selections from an employee's criteria record.

use reqk_schemas::EmployeeCriteria;
use tracing::debug;

use crate::RowSet;

/// Pick the criteria record for `employee_id` (first match) and apply it.
///
/// No matching record leaves the rows as they are.
pub fn apply_criteria_for(
    rows: &RowSet,
    employee_id: &str,
    records: &[EmployeeCriteria],
) -> RowSet {
    match records.iter().find(|c| c.employee_id == employee_id) {
        Some(c) => apply_criteria(rows, c),
        None => rows.clone(),
    }
}

/// Preselect details named by the criteria's labelled facets.
///
/// A facet applies to the row whose item title equals the facet name
/// (case-insensitive) when its label exactly names one of that row's details.
/// Rows the user has already edited or that already carry a detail are left
/// alone. Boolean facets carry no label and are ignored. The prefill does not
/// mark rows as touched.
pub fn apply_criteria(rows: &RowSet, criteria: &EmployeeCriteria) -> RowSet {
    let mut out = rows.clone();
    for (name, facet) in &criteria.facets {
        let Some(label) = facet.label() else {
            continue;
        };
        let Some(index) = out.position(name) else {
            continue;
        };
        let Some(row) = out.get(index) else {
            continue;
        };
        if row.touched || row.selected_detail.is_some() {
            continue;
        }
        let label = label.trim();
        if row.detail(label).is_none() {
            debug!(item = %row.item, label, "criteria label names no detail");
            continue;
        }
        let mut next = row.clone();
        next.selected_detail = Some(label.to_string());
        next.item_size_selected = None;
        out = out.with_row(index, next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use reqk_schemas::{CriteriaFacet, DetailChoice, ItemRow, LabelledFacet};

    fn row(item: &str, details: &[&str]) -> ItemRow {
        ItemRow {
            item: item.to_string(),
            order: 1,
            brands: vec![],
            brand_selected: None,
            required: false,
            qty: None,
            details: details
                .iter()
                .map(|d| DetailChoice {
                    title: d.to_string(),
                    sizes: vec!["M".to_string()],
                })
                .collect(),
            selected_detail: None,
            item_sizes: vec!["M".to_string()],
            item_size_selected: None,
            free_text: BTreeMap::new(),
            touched: false,
        }
    }

    fn labelled(label: &str) -> CriteriaFacet {
        CriteriaFacet::Labelled(LabelledFacet {
            id: Some(1),
            label: Some(label.to_string()),
        })
    }

    fn criteria(facets: Vec<(&str, CriteriaFacet)>) -> EmployeeCriteria {
        EmployeeCriteria {
            employee_id: "E1".to_string(),
            facets: facets
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn labelled_facet_preselects_matching_detail() {
        let rows = RowSet::from_rows(vec![
            row("Safety Helmet", &["White", "Yellow"]),
            row("Vest", &["Hi-Vis"]),
        ]);
        let out = apply_criteria(&rows, &criteria(vec![("safety helmet", labelled("Yellow"))]));
        let helmet = out.get(0).unwrap();
        assert_eq!(helmet.selected_detail.as_deref(), Some("Yellow"));
        assert!(!helmet.touched);
        assert!(Arc::ptr_eq(rows.shared(1).unwrap(), out.shared(1).unwrap()));
    }

    #[test]
    fn user_edits_are_never_overwritten() {
        let rows = RowSet::from_rows(vec![row("Safety Helmet", &["White", "Yellow"])])
            .toggle_detail(0, "White", true);
        let out = apply_criteria(&rows, &criteria(vec![("Safety Helmet", labelled("Yellow"))]));
        assert_eq!(out.get(0).unwrap().selected_detail.as_deref(), Some("White"));

        let touched = RowSet::from_rows(vec![row("Safety Helmet", &["White", "Yellow"])])
            .toggle_required(0, true);
        let out = apply_criteria(&touched, &criteria(vec![("Safety Helmet", labelled("Yellow"))]));
        assert_eq!(out.get(0).unwrap().selected_detail, None);
    }

    #[test]
    fn flags_and_unknown_labels_are_ignored() {
        let rows = RowSet::from_rows(vec![row("Gloves", &["Nitrile"])]);
        let out = apply_criteria(
            &rows,
            &criteria(vec![
                ("Gloves", CriteriaFacet::Flag(true)),
                ("Boots", labelled("Steel Toe")),
            ]),
        );
        assert_eq!(out, rows);

        let out = apply_criteria(&rows, &criteria(vec![("Gloves", labelled("nitrile"))]));
        assert_eq!(out.get(0).unwrap().selected_detail, None);
    }

    #[test]
    fn record_lookup_by_employee_id() {
        let rows = RowSet::from_rows(vec![row("Gloves", &["Nitrile"])]);
        let records = vec![criteria(vec![("Gloves", labelled("Nitrile"))])];
        let hit = apply_criteria_for(&rows, "E1", &records);
        assert_eq!(hit.get(0).unwrap().selected_detail.as_deref(), Some("Nitrile"));
        let miss = apply_criteria_for(&rows, "E2", &records);
        assert_eq!(miss, rows);
    }
}
