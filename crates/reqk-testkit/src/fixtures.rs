//! A small PPE catalog and directory shared by the scenarios.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqk_catalog::CatalogLists;
use reqk_directory::RawUserRecord;
use reqk_schemas::{
    CriteriaFacet, EmployeeCriteria, LabelledFacet, RequestHeader, RequestType, OTHERS_ITEM,
};

use crate::{detail_record, instruction_record, item_record, raw_user, ScriptedCatalog, ScriptedDirectory};

pub const FORM_NAME: &str = "PPE Request";

/// Two pages; page 2 repeats `u1` and carries a service mailbox.
pub fn directory_pages() -> Vec<Vec<RawUserRecord>> {
    vec![
        vec![
            raw_user("u1", Some("Dana Lee"), Some("dana.lee@corp.example")),
            raw_user("u2", None, Some("sam.cole@corp.example")),
        ],
        vec![
            raw_user("u1", Some("Dana Lee (dup)"), Some("other@corp.example")),
            raw_user("u3", Some("Health"), Some("HealthMailbox01@corp.example")),
            raw_user("u4", Some("No Mail"), None),
        ],
    ]
}

pub fn directory() -> ScriptedDirectory {
    ScriptedDirectory::paged(directory_pages())
}

/// Items out of order, a duplicate title, one orphaned detail and an
/// "Others" row.
pub fn catalog() -> ScriptedCatalog {
    let lists = CatalogLists::default();
    ScriptedCatalog::new()
        .collection(
            &lists.items,
            vec![
                item_record(1, "Safety Helmet", Some(200.0), &["MSA", "3M"]),
                item_record(2, "Vest", Some(100.0), &["Uvex"]),
                item_record(3, "Others", None, &[]),
                item_record(4, "vest", Some(300.0), &["Portwest"]),
            ],
        )
        .collection(
            &lists.details,
            vec![
                detail_record(10, "White", "Safety Helmet", &["M", "L"]),
                detail_record(11, "Yellow", "safety helmet", &["S", "XL"]),
                detail_record(12, "Hi-Vis", "Vest", &["M", "L"]),
                detail_record(13, "Description", OTHERS_ITEM, &["S", "M"]),
                detail_record(14, "Leather", "Glovs", &["9"]),
            ],
        )
        .collection(
            &lists.instructions,
            vec![instruction_record(
                20,
                "PPE Request - Step 1",
                1.0,
                "Pick one size per item.",
            )],
        )
}

pub fn header(request_type: RequestType) -> RequestHeader {
    RequestHeader {
        employee_id: "u1".to_string(),
        employee_name: "Dana Lee".to_string(),
        employee_email: Some("dana.lee@corp.example".to_string()),
        department: Some("Operations".to_string()),
        job_title: Some("Technician".to_string()),
        requested_by: "Dana Lee".to_string(),
        request_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
        request_type,
        replacement_reason: None,
        remarks: None,
    }
}

/// Helmet preselected to "Yellow"; a flag facet that must be ignored.
pub fn criteria() -> EmployeeCriteria {
    let mut facets = BTreeMap::new();
    facets.insert(
        "Safety Helmet".to_string(),
        CriteriaFacet::Labelled(LabelledFacet {
            id: Some(2),
            label: Some("Yellow".to_string()),
        }),
    );
    facets.insert("Vest".to_string(), CriteriaFacet::Flag(true));
    EmployeeCriteria {
        employee_id: "u1".to_string(),
        facets,
    }
}
