//! Property-based tests for the task mirror and its view filters.
//!
//! Uses proptest to verify:
//! 1. The All filter hides nothing and keeps display order.
//! 2. Active and Completed partition the list with no overlap or loss.
//! 3. Every filter agrees with `Filter::matches`, preserving order.
//! 4. Flipping a row's completed flag twice restores the list.
//! 5. Clearing completed rows leaves exactly the active ones, in order.
//! 6. Prepend and remove touch exactly one row.

use std::collections::HashSet;

use chrono::DateTime;
use proptest::prelude::*;
use uuid::Uuid;

use termtodo::store::{Filter, TaskList};
use termtodo_api::task::{TaskId, TaskRecord};

// --- Strategies ---

/// Strategy for one task row with a deterministic id.
fn arb_record() -> impl Strategy<Value = TaskRecord> {
    (
        any::<u128>(),
        "[a-z][a-z ]{0,23}",
        any::<bool>(),
        0i64..4_102_444_800,
    )
        .prop_map(|(id, text, completed, secs)| TaskRecord {
            id: TaskId::from_uuid(Uuid::from_u128(id)),
            text,
            completed,
            created_at: DateTime::from_timestamp(secs, 0).expect("timestamp in range"),
            updated_at: None,
            user_id: None,
        })
}

/// Strategy for a mirror with unique row ids.
fn arb_list() -> impl Strategy<Value = TaskList> {
    prop::collection::vec(arb_record(), 0..24).prop_map(|rows| {
        // Shrinking can collapse several random ids to the same value;
        // the table never holds duplicate ids, so drop them here.
        let mut seen = HashSet::new();
        let rows: Vec<TaskRecord> = rows.into_iter().filter(|r| seen.insert(r.id)).collect();
        let mut list = TaskList::new();
        list.reset(rows);
        list
    })
}

/// Strategy covering every filter.
fn arb_filter() -> impl Strategy<Value = Filter> {
    prop_oneof![
        Just(Filter::All),
        Just(Filter::Active),
        Just(Filter::Completed),
    ]
}

// --- Property tests ---

proptest! {
    /// The All filter hides nothing and keeps display order.
    #[test]
    fn all_filter_is_identity(list in arb_list()) {
        let visible: Vec<TaskId> = list.visible(Filter::All).iter().map(|t| t.id).collect();
        let full: Vec<TaskId> = list.iter().map(|t| t.id).collect();
        prop_assert_eq!(visible, full);
    }

    /// Active and Completed split the list without overlap or loss.
    #[test]
    fn active_and_completed_partition_the_list(list in arb_list()) {
        let active = list.visible(Filter::Active);
        let completed = list.visible(Filter::Completed);
        prop_assert_eq!(active.len() + completed.len(), list.len());
        prop_assert!(active.iter().all(|t| !t.completed));
        prop_assert!(completed.iter().all(|t| t.completed));
        prop_assert_eq!(active.len(), list.active_count());
        prop_assert_eq!(completed.len(), list.completed_count());
    }

    /// Every filter shows exactly the rows it matches, in list order.
    #[test]
    fn visible_agrees_with_matches(list in arb_list(), filter in arb_filter()) {
        let expected: Vec<TaskId> = list
            .iter()
            .filter(|t| filter.matches(t.completed))
            .map(|t| t.id)
            .collect();
        let visible: Vec<TaskId> = list.visible(filter).iter().map(|t| t.id).collect();
        prop_assert_eq!(visible, expected);
    }

    /// Flipping any row's completed flag twice restores the whole list.
    #[test]
    fn toggle_twice_is_identity(list in arb_list()) {
        let ids: Vec<TaskId> = list.iter().map(|t| t.id).collect();
        for id in ids {
            let mut work = list.clone();
            let mut flipped = work.get(id).expect("row exists").clone();
            flipped.completed = !flipped.completed;
            prop_assert!(work.replace(flipped.clone()));
            flipped.completed = !flipped.completed;
            prop_assert!(work.replace(flipped));
            prop_assert_eq!(&work, &list);
        }
    }

    /// Removing the completed ids leaves exactly the active rows, in order.
    #[test]
    fn clear_completed_leaves_actives(list in arb_list()) {
        let mut work = list.clone();
        let completed_ids: Vec<TaskId> =
            work.visible(Filter::Completed).iter().map(|t| t.id).collect();
        let actives_before: Vec<TaskId> =
            work.visible(Filter::Active).iter().map(|t| t.id).collect();

        let removed = work.remove_many(&completed_ids);

        prop_assert_eq!(removed, completed_ids.len());
        prop_assert!(!work.has_completed());
        let after: Vec<TaskId> = work.iter().map(|t| t.id).collect();
        prop_assert_eq!(after, actives_before);
    }

    /// Prepending puts the new row first and leaves the rest untouched.
    #[test]
    fn prepend_preserves_existing_order(list in arb_list(), record in arb_record()) {
        prop_assume!(list.get(record.id).is_none());

        let mut work = list.clone();
        work.prepend(record.clone());

        prop_assert_eq!(work.len(), list.len() + 1);
        let mut rows = work.iter();
        prop_assert_eq!(rows.next().map(|t| t.id), Some(record.id));
        let rest: Vec<TaskId> = rows.map(|t| t.id).collect();
        let before: Vec<TaskId> = list.iter().map(|t| t.id).collect();
        prop_assert_eq!(rest, before);
    }

    /// Removing one id drops exactly that row and nothing else.
    #[test]
    fn remove_drops_exactly_the_named_row(list in arb_list()) {
        let ids: Vec<TaskId> = list.iter().map(|t| t.id).collect();
        for id in ids {
            let mut work = list.clone();
            prop_assert!(work.remove(id));
            prop_assert_eq!(work.len(), list.len() - 1);
            prop_assert!(work.get(id).is_none());
        }
    }
}
