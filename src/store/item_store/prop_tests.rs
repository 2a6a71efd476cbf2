use super::*;
use chrono::NaiveDate;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_placement() -> impl Strategy<Value = (Option<String>, Option<String>)> {
    (
        proptest::option::of(prop_oneof![Just("a".to_string()), Just("b".to_string())]),
        proptest::option::of(prop_oneof![Just("c1".to_string()), Just("c2".to_string())]),
    )
}

fn all_queries() -> Vec<QueryKey> {
    let boxes = [None, Some("a"), Some("b")];
    let categories = [None, Some("c1"), Some("c2")];
    boxes
        .iter()
        .flat_map(|b| {
            categories
                .iter()
                .map(move |c| QueryKey::new(b.map(str::to_string), c.map(str::to_string)))
        })
        .collect()
}

fn item_at(placement: &(Option<String>, Option<String>)) -> Item {
    let mut item = Item::new("item".to_string(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    item.box_id = placement.0.clone();
    item.category_id = placement.1.clone();
    item
}

// ============================================================================
// S1: Single-location invariant
// ============================================================================

proptest! {
    /// S1.1: After any sequence of moves the item is in exactly one location
    /// list, and in exactly the cached queries that resolve to it
    #[test]
    fn prop_s1_1_single_location_after_moves(
        moves in prop::collection::vec(arb_placement(), 1..8),
    ) {
        let mut store = ItemStore::new();
        for key in all_queries() {
            store.set_query(key, Vec::new());
        }

        let mut current = item_at(&moves[0]);
        store.apply(None, &current);

        for placement in &moves[1..] {
            let mut next = current.clone();
            next.box_id = placement.0.clone();
            next.category_id = placement.1.clone();
            store.apply(Some(&current), &next);
            current = next;
        }

        let home = current.location();
        for key in all_queries() {
            let expected = usize::from(key.location() == home);
            prop_assert_eq!(store.count_in_query(&key, &current.id), expected);
            prop_assert_eq!(store.count_at(&key.location(), &current.id), expected);
        }
    }

    /// S1.2: Finishing removes the item from every view regardless of history
    #[test]
    fn prop_s1_2_finished_is_nowhere(placement in arb_placement()) {
        let mut store = ItemStore::new();
        for key in all_queries() {
            store.set_query(key, Vec::new());
        }
        let item = item_at(&placement);
        store.apply(None, &item);

        let mut finished = item.clone();
        finished.is_finished = true;
        store.apply(Some(&item), &finished);

        prop_assert!(store.find(&item.id).is_none());
    }
}
