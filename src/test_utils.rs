use crate::models::{Pattern, Step, TargetWeight};
use crate::scheduling::OverduePolicy;
use chrono::NaiveDate;
use proptest::prelude::*;

/// Generates an arbitrary NaiveDate within 2020-01-01 to 2030-01-01
pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0u64..3653).prop_map(move |days| start + chrono::Days::new(days))
}

/// Generates 1 to 8 positive step intervals of at most 60 days
pub fn arb_intervals() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=60, 1..=8)
}

/// Generates an arbitrary TargetWeight variant
pub fn arb_target_weight() -> impl Strategy<Value = TargetWeight> {
    prop_oneof![
        Just(TargetWeight::Heavy),
        Just(TargetWeight::Normal),
        Just(TargetWeight::Light),
        Just(TargetWeight::Unset),
    ]
}

/// Generates a valid pattern with a fresh id
pub fn arb_pattern() -> impl Strategy<Value = Pattern> {
    (arb_messy_string(), arb_target_weight(), arb_intervals())
        .prop_map(|(name, weight, intervals)| Pattern::new(name, weight, &intervals))
}

/// Generates intervals together with their steps in shuffled storage order
pub fn arb_shuffled_steps() -> impl Strategy<Value = (Vec<u32>, Vec<Step>)> {
    arb_intervals().prop_flat_map(|intervals| {
        let steps: Vec<Step> = intervals
            .iter()
            .enumerate()
            .map(|(index, &interval)| Step::new(index as u32 + 1, interval))
            .collect();
        (Just(intervals), Just(steps).prop_shuffle())
    })
}

/// Generates an arbitrary OverduePolicy variant
pub fn arb_overdue_policy() -> impl Strategy<Value = OverduePolicy> {
    prop_oneof![
        Just(OverduePolicy::CompressAsCompleted),
        Just(OverduePolicy::PinToToday),
    ]
}

/// Generates strings with unicode, whitespace and punctuation mixed in
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,30}",
        "\\PC{1,20}",
        "[ \t]*[a-z]{1,10}[ \t]*",
    ]
}
