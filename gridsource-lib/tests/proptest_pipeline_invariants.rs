//! Property-based invariant tests for the filter → sort → page pipeline.
//!
//! 1. Filtering is idempotent
//! 2. Filtering never reorders surviving rows
//! 3. Sorting is idempotent
//! 4. Sorted output is ordered by the sort keys, including integers and
//!    floats past the exact `f64` range
//! 5. Page count and page lengths agree with the filtered total
//! 6. Three header clicks without modifier leave a column unsorted

use gridsource_lib::model::ColumnState;
use gridsource_lib::model::Item;
use gridsource_lib::model::Sorting;
use gridsource_lib::model::Value;
use gridsource_lib::pagination::Pagination;
use gridsource_lib::pipeline::Filter;
use gridsource_lib::pipeline::OrderBy;
use gridsource_lib::pipeline::PageWindow;
use gridsource_lib::pipeline::filter_items;
use gridsource_lib::pipeline::page_items;
use gridsource_lib::pipeline::sort_items;
use gridsource_lib::sort::SortStack;
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

/// Integers and floats around 2^53, where `f64` stops representing every
/// integer.
fn arb_wide_number() -> impl Strategy<Value = Value> {
    const EDGE: i64 = 1 << 53;
    prop_oneof![
        (-3i64..=3).prop_map(|d| Value::Long(EDGE + d)),
        (-3i64..=3).prop_map(|d| Value::Float((EDGE + d) as f64)),
        (-3i64..=3).prop_map(|d| Value::Float((EDGE + d) as f64 - 0.5)),
    ]
}

fn arb_item() -> impl Strategy<Value = Item> {
    (
        0i64..20,
        "[a-c]{0,3}",
        prop::option::of(-5i32..5),
        arb_wide_number(),
        any::<u64>(),
    )
        .prop_map(|(n, s, opt, wide, seq)| {
            Item::new()
                .set("n", n)
                .set("s", s)
                .set("opt", opt)
                .set("wide", wide)
                .set("seq", seq.to_string())
        })
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::vec(arb_item(), 0..=60)
}

fn arb_filters() -> impl Strategy<Value = Vec<Filter>> {
    proptest::collection::vec(
        (prop::sample::select(vec!["n", "s", "opt"]), "[a-c0-9]{0,2}")
            .prop_map(|(field, text)| Filter::contains(field, text)),
        0..=3,
    )
}

fn arb_order() -> impl Strategy<Value = OrderBy> {
    proptest::collection::vec(
        (prop::sample::select(vec!["n", "s", "opt", "wide"]), any::<bool>()),
        1..=3,
    )
    .prop_map(|keys| {
        keys.into_iter().fold(OrderBy::default(), |order, (field, asc)| {
            if asc {
                order.then_asc(field)
            } else {
                order.then_desc(field)
            }
        })
    })
}

// ═════════════════════════════════════════════════════════════════════
// 1-2. Filter stage
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn filtering_is_idempotent(items in arb_items(), filters in arb_filters()) {
        let once = filter_items(&items, &filters);
        let twice = filter_items(&once, &filters);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filtering_preserves_relative_order(items in arb_items(), filters in arb_filters()) {
        let kept = filter_items(&items, &filters);
        let mut cursor = items.iter();
        for item in &kept {
            prop_assert!(cursor.any(|candidate| candidate == item));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════
// 3-4. Sort stage
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sorting_is_idempotent(items in arb_items(), order in arb_order()) {
        let mut once = items.clone();
        sort_items(&mut once, &order);
        let mut twice = once.clone();
        sort_items(&mut twice, &order);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sorted_rows_are_ordered(items in arb_items(), order in arb_order()) {
        let mut sorted = items.clone();
        sort_items(&mut sorted, &order);
        prop_assert_eq!(sorted.len(), items.len());
        for pair in sorted.windows(2) {
            prop_assert_ne!(order.compare(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn wide_numbers_sort_into_a_total_order(items in arb_items(), asc in any::<bool>()) {
        let order = if asc { OrderBy::asc("wide") } else { OrderBy::desc("wide") };
        let mut sorted = items;
        sort_items(&mut sorted, &order);
        for (i, earlier) in sorted.iter().enumerate() {
            for later in &sorted[i + 1..] {
                prop_assert_ne!(order.compare(earlier, later), std::cmp::Ordering::Greater);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════
// 5. Page stage
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pages_cover_the_filtered_rows(count in 0usize..200, page_size in 0usize..30) {
        let items: Vec<Item> = (0..count).map(|i| Item::new().set("i", i as i64)).collect();
        let mut pagination = Pagination::new(page_size);
        pagination.update_count(count);
        let size = pagination.page_size();
        prop_assert!(size > 0);
        prop_assert_eq!(pagination.page_count(), count.div_ceil(size));

        let mut seen = Vec::new();
        for page in 1..=pagination.page_count() {
            let rows = page_items(items.clone(), PageWindow::new(page, size));
            prop_assert!(!rows.is_empty() && rows.len() <= size);
            seen.extend(rows);
        }
        prop_assert_eq!(&seen, &items);

        let past_end = page_items(items, PageWindow::new(pagination.page_count() + 1, size));
        prop_assert!(past_end.is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════
// 6. Sort tracker
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn three_clicks_unsort_a_column(columns in 1usize..6, pick in any::<prop::sample::Index>(),
                                    warmup in proptest::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 0..8)) {
        let mut states = vec![ColumnState::default(); columns];
        let mut stack = SortStack::new();
        for (index, additive) in warmup {
            stack.toggle(&mut states, index.index(columns), additive);
        }

        let column = pick.index(columns);
        // Bring the column back to none first so the three clicks start the cycle.
        while states[column].sorting != Sorting::None {
            stack.toggle(&mut states, column, false);
        }
        for _ in 0..3 {
            stack.toggle(&mut states, column, false);
        }

        prop_assert_eq!(states[column].sorting, Sorting::None);
        prop_assert!(!stack.contains(column));
        prop_assert!(stack.is_empty());
    }
}
