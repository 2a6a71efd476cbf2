use super::*;
use serde_json::json;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn boxed_item() -> Item {
    let mut item = Item::new("Greek alphabet".to_string(), date(1));
    item.box_id = Some("b1".to_string());
    item.category_id = Some("c1".to_string());
    item
}

#[test]
fn test_patch_distinguishes_absent_and_null() {
    let patch = ItemPatch {
        box_id: Some(None),
        ..Default::default()
    };

    let value = serde_json::to_value(&patch).unwrap();
    assert_eq!(value, json!({ "box_id": null }));

    let parsed: ItemPatch = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.box_id, Some(None));
    assert_eq!(parsed.category_id, None);
}

#[test]
fn test_empty_patch() {
    assert!(ItemPatch::default().is_empty());
    let value = serde_json::to_value(ItemPatch::default()).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn test_response_missing_schedule() {
    let response: ItemResponse = serde_json::from_value(json!({
        "id": "i1",
        "name": "Greek alphabet",
        "box_id": null
    }))
    .unwrap();

    assert_eq!(response.name.as_deref(), Some("Greek alphabet"));
    assert_eq!(response.box_id, Some(None));
    assert_eq!(response.category_id, None);
    assert_eq!(response.review_dates, None);
}

#[test]
fn test_full_response_roundtrips_to_item() {
    let item = boxed_item();
    let response = ItemResponse::from(item.clone());
    assert_eq!(response.into_item().unwrap(), item);
}

#[test]
fn test_into_item_requires_name() {
    let response = ItemResponse {
        id: "i1".to_string(),
        learned_date: Some(date(1)),
        ..Default::default()
    };
    assert!(matches!(response.into_item(), Err(RevisitError::Transport(_))));
}

#[test]
fn test_draft_validation() {
    let today = date(10);
    assert!(ItemDraft::new("ok".to_string(), date(10)).validate(today).is_ok());

    let blank = ItemDraft::new("   ".to_string(), date(1));
    assert!(matches!(
        blank.validate(today),
        Err(RevisitError::Validation { ref field, .. }) if field == "name"
    ));

    let future = ItemDraft::new("later".to_string(), date(11));
    assert!(matches!(
        future.validate(today),
        Err(RevisitError::Validation { ref field, .. }) if field == "learned_date"
    ));

    let mut blank_box = ItemDraft::new("x".to_string(), date(1));
    blank_box.box_id = Some(String::new());
    assert!(blank_box.validate(today).is_err());
}

#[test]
fn test_draft_name_length_limit() {
    let long = ItemDraft::new("a".repeat(MAX_NAME_LEN + 1), date(1));
    assert!(long.validate(date(10)).is_err());
}

#[test]
fn test_patch_validation() {
    let today = date(10);
    let patch = ItemPatch {
        name: Some(String::new()),
        ..Default::default()
    };
    assert!(patch.validate(today).is_err());

    let clear_box = ItemPatch {
        box_id: Some(None),
        ..Default::default()
    };
    assert!(clear_box.validate(today).is_ok());
}

#[test]
fn test_apply_to_patches_only_given_fields() {
    let mut item = boxed_item();
    item.pattern_id = Some("p1".to_string());
    item.review_dates = vec![ReviewDate::new(1, date(2))];

    let patch = ItemPatch {
        name: Some(" Greek letters ".to_string()),
        box_id: Some(None),
        ..Default::default()
    };
    let patched = patch.apply_to(&item);

    assert_eq!(patched.name, "Greek letters");
    assert_eq!(patched.box_id, None);
    assert_eq!(patched.category_id, item.category_id);
    assert_eq!(patched.review_dates, item.review_dates);

    let clear_pattern = ItemPatch {
        pattern_id: Some(None),
        ..Default::default()
    };
    assert!(clear_pattern.apply_to(&item).review_dates.is_empty());
}

#[test]
fn test_placement_target_for_box_move() {
    let item = boxed_item();
    let patch = ItemPatch {
        box_id: Some(Some("b2".to_string())),
        ..Default::default()
    };
    assert_eq!(patch.placement_target(&item), Some(PlacementTarget::Box("b2".to_string())));
}

#[test]
fn test_placement_target_for_unclassify() {
    let item = boxed_item();
    let patch = ItemPatch {
        box_id: Some(None),
        ..Default::default()
    };
    assert_eq!(
        patch.placement_target(&item),
        Some(PlacementTarget::Unclassified { category_id: Some("c1".to_string()) })
    );
}

#[test]
fn test_placement_target_none_when_unchanged() {
    let item = boxed_item();
    let rename = ItemPatch {
        name: Some("Greek letters".to_string()),
        ..Default::default()
    };
    assert_eq!(rename.placement_target(&item), None);

    let same_box = ItemPatch {
        box_id: Some(Some("b1".to_string())),
        ..Default::default()
    };
    assert_eq!(same_box.placement_target(&item), None);
}

#[test]
fn test_todays_filters_default_includes_overdue() {
    let filters = TodaysReviewFilters::default();
    assert!(filters.include_overdue);
    let parsed: TodaysReviewFilters = serde_json::from_value(json!({ "box_id": "b1" })).unwrap();
    assert!(parsed.include_overdue);
    assert_eq!(parsed.box_id.as_deref(), Some("b1"));
}

#[test]
fn test_todays_reviews_total() {
    let review = DueReview {
        item_id: "i1".to_string(),
        item_name: "n".to_string(),
        review_date: ReviewDate::new(1, date(2)),
    };
    let reviews = TodaysReviews {
        groups: vec![
            ReviewGroup { category_id: None, box_id: None, reviews: vec![review.clone()] },
            ReviewGroup {
                category_id: Some("c1".to_string()),
                box_id: Some("b1".to_string()),
                reviews: vec![review.clone(), review],
            },
        ],
    };
    assert_eq!(reviews.total(), 3);
    assert_eq!(reviews.groups[1].location(), LocationKey::Box("b1".to_string()));
}
