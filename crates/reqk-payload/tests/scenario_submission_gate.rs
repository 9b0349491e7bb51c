use chrono::NaiveDate;
use reqk_payload::*;
use reqk_schemas::{
    Approvals, ApprovalStatus, ItemAggregate, ItemDetailVariant, RecordMeta, RequestHeader,
    RequestType, OTHERS_ITEM,
};
use reqk_selection::RowSet;

fn variant(title: &str, parent: &str, sizes: &[&str]) -> ItemDetailVariant {
    ItemDetailVariant {
        id: 0,
        title: title.to_string(),
        parent_item_title: parent.to_string(),
        order: None,
        sizes: sizes.iter().map(|s| s.to_string()).collect(),
        meta: RecordMeta::default(),
    }
}

fn rows() -> RowSet {
    RowSet::from_aggregates(&[
        ItemAggregate {
            title: "Boots".to_string(),
            order: 1,
            brands: vec!["Bata".to_string()],
            details: vec![variant("Steel Toe", "Boots", &["41", "42"])],
            sizes: vec!["41".to_string(), "42".to_string()],
        },
        ItemAggregate {
            title: OTHERS_ITEM.to_string(),
            order: 2,
            brands: vec![],
            details: vec![variant("Description", OTHERS_ITEM, &["S", "M"])],
            sizes: vec!["S".to_string(), "M".to_string()],
        },
    ])
}

fn header() -> RequestHeader {
    RequestHeader {
        employee_id: "E7".to_string(),
        employee_name: "Kim Ito".to_string(),
        employee_email: None,
        department: None,
        job_title: None,
        requested_by: "Kim Ito".to_string(),
        request_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        request_type: RequestType::New,
        replacement_reason: None,
        remarks: Some("site B".to_string()),
    }
}

#[test]
fn scenario_required_others_needs_size_before_submit() {
    let edited = rows()
        .toggle_required(1, true)
        .update_free_text(1, "Description", "cooling vest");

    let err = assemble(
        &header(),
        edited.iter(),
        &Approvals::default(),
        SubmissionMode::Submitted,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingOthersSize {
            item: OTHERS_ITEM.to_string()
        }
    );

    let fixed = edited.toggle_size(1, "M");
    let p = assemble(
        &header(),
        fixed.iter(),
        &Approvals::default(),
        SubmissionMode::Submitted,
    )
    .unwrap();
    let others = p.line(OTHERS_ITEM).unwrap();
    assert_eq!(others.size.as_deref(), Some("M"));
    assert!(others.others_text.is_some());
}

#[test]
fn scenario_full_edit_flow_produces_submitted_payload() {
    let edited = rows()
        .toggle_required(0, true)
        .toggle_brand(0, "Bata", true)
        .toggle_detail(0, "Steel Toe", true)
        .toggle_size(0, "42")
        .update_qty(0, "2");

    let p = assemble(
        &header(),
        edited.iter(),
        &Approvals::default(),
        SubmissionMode::Submitted,
    )
    .unwrap();

    assert_eq!(p.status, SubmissionMode::Submitted);
    assert_eq!(p.lines.len(), 2);
    let boots = p.line("Boots").unwrap();
    assert_eq!(boots.brand.as_deref(), Some("Bata"));
    assert_eq!(boots.selected_detail.as_deref(), Some("Steel Toe"));
    assert_eq!(boots.size.as_deref(), Some("42"));
    assert_eq!(boots.qty, Some(2));
    assert_eq!(p.remarks.as_deref(), Some("site B"));
    assert!(p
        .approvals
        .rows()
        .iter()
        .all(|a| a.status == ApprovalStatus::Pending));
}

#[test]
fn scenario_untouched_form_saves_as_draft_but_not_submit() {
    let untouched = rows();
    assert!(assemble(
        &header(),
        untouched.iter(),
        &Approvals::default(),
        SubmissionMode::Draft
    )
    .is_ok());
    assert_eq!(
        assemble(
            &header(),
            untouched.iter(),
            &Approvals::default(),
            SubmissionMode::Submitted
        )
        .unwrap_err(),
        ValidationError::NoSelectionMade
    );
}
