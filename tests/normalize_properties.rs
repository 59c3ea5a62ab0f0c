//! Property tests for drawn-number ordering.

use proptest::prelude::*;
use std::collections::BTreeSet;

use lotofacil::normalize::{normalize_draw, sort_numbers};
use lotofacil::{CurrencyStyle, Draw, DrawnNumbers};

/// An integer as the API may send it: zero-padded, possibly with spaces.
fn arb_numeric() -> impl Strategy<Value = (i64, String)> {
    (-1000i64..1000, 0usize..4, any::<bool>()).prop_map(|(n, width, spaced)| {
        let text = format!("{:0width$}", n, width = width);
        let text = if spaced { format!(" {} ", text) } else { text };
        (n, text)
    })
}

/// A list with at least one entry that is not an integer, in random order.
fn arb_mixed() -> impl Strategy<Value = Vec<String>> {
    (
        prop::collection::vec(arb_numeric().prop_map(|(_, text)| text), 0..15),
        prop::collection::vec("[a-z]{1,4}", 1..3),
    )
        .prop_flat_map(|(numbers, words)| {
            let mut all = numbers;
            all.extend(words);
            Just(all).prop_shuffle()
        })
}

fn draw_with(numbers: Vec<String>) -> Draw {
    Draw {
        number: 1,
        drawn_at: String::new(),
        numbers,
        rolled_over: false,
        next_draw_date: None,
        next_draw_estimated_prize: None,
        prize_tiers: Vec::new(),
    }
}

proptest! {
    #[test]
    fn prop_numeric_sort_keeps_multiset(
        input in prop::collection::vec(arb_numeric(), 0..30)
    ) {
        let raw: Vec<String> = input.iter().map(|(_, text)| text.clone()).collect();
        let mut expected: Vec<i64> = input.iter().map(|(n, _)| *n).collect();
        expected.sort();

        match sort_numbers(&raw) {
            DrawnNumbers::Numeric(sorted) => {
                prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
                prop_assert_eq!(sorted, expected);
            }
            DrawnNumbers::Lexical(_) => prop_assert!(false, "integers fell back to lexical order"),
        }
    }

    #[test]
    fn prop_distinct_numbers_strictly_ascending(
        input in prop::collection::btree_set(1i64..=25, 0..=15)
            .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<_>>()).prop_shuffle())
    ) {
        let raw: Vec<String> = input.iter().map(|n| format!("{:02}", n)).collect();
        let expected: Vec<i64> = input.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        let DrawnNumbers::Numeric(sorted) = sort_numbers(&raw) else {
            return Err(TestCaseError::fail("integers fell back to lexical order"));
        };
        prop_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_non_numeric_entry_sorts_lexically(raw in arb_mixed()) {
        let mut expected = raw.clone();
        expected.sort();

        let DrawnNumbers::Lexical(sorted) = sort_numbers(&raw) else {
            return Err(TestCaseError::fail("non-numeric input was sorted numerically"));
        };
        prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_normalize_draw_never_drops_numbers(raw in arb_mixed()) {
        let resolved = normalize_draw(&draw_with(raw.clone()), CurrencyStyle::BrazilianLocale);
        prop_assert_eq!(resolved.numbers.len(), raw.len());
        prop_assert!(matches!(resolved.numbers, DrawnNumbers::Lexical(_)));
    }
}
