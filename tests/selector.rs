// Property tests for day selection.

use proptest::prelude::*;
use wordle_archive::Navigation;
use wordle_archive::puzzle::resolve_day;

proptest! {
    #[test]
    fn in_range_query_resolves_to_itself(max_day in 1u32..5000, pick in any::<u32>()) {
        let day = pick % max_day + 1;
        prop_assert_eq!(resolve_day(Some(&format!("?{day}")), max_day), day);
    }

    #[test]
    fn out_of_range_query_resolves_to_max(max_day in 1u32..5000, over in 1u32..10_000) {
        prop_assert_eq!(resolve_day(Some(&format!("?{}", max_day + over)), max_day), max_day);
        prop_assert_eq!(resolve_day(Some("?0"), max_day), max_day);
    }

    #[test]
    fn non_numeric_query_resolves_to_max(max_day in 1u32..5000, junk in "[a-zA-Z_ .-]{1,12}") {
        prop_assert_eq!(resolve_day(Some(&format!("?{junk}")), max_day), max_day);
    }

    #[test]
    fn navigation_never_leaves_range(
        max_day in 1u32..5000,
        current in 0u32..6000,
        entropy in any::<u64>(),
    ) {
        for nav in [
            Navigation::First,
            Navigation::Previous,
            Navigation::Next,
            Navigation::Last,
            Navigation::Random { entropy },
        ] {
            let day = nav.target_day(current, max_day);
            prop_assert!((1..=max_day).contains(&day), "{:?} gave {}", nav, day);
        }
    }
}
