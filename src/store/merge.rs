use crate::dto::ItemResponse;
use crate::models::Item;

/// Merges a mutation response onto the item the client already held
///
/// Field precedence:
/// - a field the server sent wins, unless it is a blank string;
/// - a field the server left out keeps the previous value;
/// - an explicit `null` on a nullable field is authoritative (e.g. the item
///   left its box);
/// - an empty schedule only replaces a non-empty one when the merged item
///   has no pattern or is finished, since both mean the schedule is gone.
///
/// The item id is always the previous one.
pub fn merge_item(previous: &Item, response: ItemResponse) -> Item {
    let name = response
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| previous.name.clone());

    let detail = pick_nullable(response.detail, &previous.detail);
    let category_id = pick_nullable(response.category_id, &previous.category_id);
    let box_id = pick_nullable(response.box_id, &previous.box_id);
    let pattern_id = pick_nullable(response.pattern_id, &previous.pattern_id);
    let learned_date = response.learned_date.unwrap_or(previous.learned_date);
    let is_finished = response.is_finished.unwrap_or(previous.is_finished);

    let schedule_gone = pattern_id.is_none() || is_finished;
    let review_dates = match response.review_dates {
        Some(review_dates) if !review_dates.is_empty() || schedule_gone => review_dates,
        _ => previous.review_dates.clone(),
    };

    Item {
        id: previous.id.clone(),
        name,
        detail,
        category_id,
        box_id,
        pattern_id,
        learned_date,
        is_finished,
        review_dates,
    }
}

fn pick_nullable(sent: Option<Option<String>>, previous: &Option<String>) -> Option<String> {
    match sent {
        None => previous.clone(),
        Some(None) => None,
        Some(Some(value)) if value.trim().is_empty() => previous.clone(),
        Some(Some(value)) => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewDate;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn previous() -> Item {
        let mut item = Item::new("Chess openings".to_string(), date(1));
        item.detail = Some("Sicilian first".to_string());
        item.category_id = Some("c1".to_string());
        item.box_id = Some("b1".to_string());
        item.pattern_id = Some("p1".to_string());
        item.review_dates = vec![ReviewDate::new(1, date(2)), ReviewDate::new(2, date(5))];
        item
    }

    fn response_for(item: &Item) -> ItemResponse {
        ItemResponse {
            id: item.id.clone(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_response_keeps_everything() {
        let prev = previous();
        let merged = merge_item(&prev, response_for(&prev));
        assert_eq!(merged, prev);
    }

    #[test]
    fn test_full_response_wins() {
        let prev = previous();
        let mut server = prev.clone();
        server.name = "Chess endgames".to_string();
        server.box_id = Some("b2".to_string());
        server.review_dates[0].is_completed = true;

        let merged = merge_item(&prev, ItemResponse::from(server.clone()));
        assert_eq!(merged, server);
    }

    #[test]
    fn test_missing_schedule_falls_back() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.name = Some("Renamed".to_string());
        response.review_dates = Some(Vec::new());

        let merged = merge_item(&prev, response);
        assert_eq!(merged.name, "Renamed");
        assert_eq!(merged.review_dates, prev.review_dates);
    }

    #[test]
    fn test_blank_name_falls_back() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.name = Some("  ".to_string());

        assert_eq!(merge_item(&prev, response).name, prev.name);
    }

    #[test]
    fn test_explicit_null_clears_box() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.box_id = Some(None);

        let merged = merge_item(&prev, response);
        assert_eq!(merged.box_id, None);
        assert_eq!(merged.category_id, prev.category_id);
    }

    #[test]
    fn test_cleared_pattern_clears_schedule() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.pattern_id = Some(None);
        response.review_dates = Some(Vec::new());

        let merged = merge_item(&prev, response);
        assert_eq!(merged.pattern_id, None);
        assert!(merged.review_dates.is_empty());
    }

    #[test]
    fn test_finished_with_empty_schedule() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.is_finished = Some(true);
        response.review_dates = Some(Vec::new());

        let merged = merge_item(&prev, response);
        assert!(merged.is_finished);
        assert!(merged.review_dates.is_empty());
    }

    #[test]
    fn test_finished_without_schedule_field_keeps_dates() {
        let prev = previous();
        let mut response = response_for(&prev);
        response.is_finished = Some(true);

        let merged = merge_item(&prev, response);
        assert!(merged.is_finished);
        assert_eq!(merged.review_dates, prev.review_dates);
    }
}
