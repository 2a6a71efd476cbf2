use crate::models::Pattern;

/// Structural pattern comparison
///
/// Two patterns are compatible when, ordered by step number, they have the
/// same number of steps and the same interval at every position. Ids and
/// names are ignored, so an item's existing schedule keeps its meaning under
/// either pattern.
pub fn compatible(a: &Pattern, b: &Pattern) -> bool {
    a.steps.len() == b.steps.len() && a.intervals() == b.intervals()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Step, TargetWeight};
    use crate::test_utils::arb_pattern;
    use proptest::prelude::*;

    fn pattern(name: &str, intervals: &[u32]) -> Pattern {
        Pattern::new(name.to_string(), TargetWeight::Unset, intervals)
    }

    #[test]
    fn test_same_intervals_different_names() {
        assert!(compatible(&pattern("a", &[1, 3, 7]), &pattern("b", &[1, 3, 7])));
    }

    #[test]
    fn test_different_last_interval() {
        assert!(!compatible(&pattern("a", &[1, 3, 7]), &pattern("b", &[1, 3, 8])));
    }

    #[test]
    fn test_prefix_is_not_compatible() {
        assert!(!compatible(&pattern("a", &[1, 3]), &pattern("b", &[1, 3, 7])));
    }

    #[test]
    fn test_storage_order_is_ignored() {
        let shuffled = Pattern::new_with_fields(
            "s".to_string(),
            "shuffled".to_string(),
            TargetWeight::Heavy,
            vec![Step::new(2, 3), Step::new(3, 7), Step::new(1, 1)],
        );
        assert!(compatible(&shuffled, &pattern("a", &[1, 3, 7])));
    }

    proptest! {
        /// C1.1: Every pattern is compatible with itself
        #[test]
        fn prop_c1_1_reflexive(a in arb_pattern()) {
            prop_assert!(compatible(&a, &a));
        }

        /// C1.2: Compatibility is symmetric
        #[test]
        fn prop_c1_2_symmetric(a in arb_pattern(), b in arb_pattern()) {
            prop_assert_eq!(compatible(&a, &b), compatible(&b, &a));
        }

        /// C1.3: A copy with a new id and name stays compatible
        #[test]
        fn prop_c1_3_identity_irrelevant(a in arb_pattern()) {
            let b = pattern("copy", &a.intervals());
            prop_assert!(compatible(&a, &b));
        }

        /// C1.4: Changing any one interval breaks compatibility
        #[test]
        fn prop_c1_4_interval_change_detected(
            a in arb_pattern(),
            index in any::<prop::sample::Index>(),
        ) {
            let mut intervals = a.intervals();
            let i = index.index(intervals.len());
            intervals[i] += 1;
            prop_assert!(!compatible(&a, &pattern("changed", &intervals)));
        }
    }
}
