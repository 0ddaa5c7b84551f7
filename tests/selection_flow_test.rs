//! End-to-end selection flow through the public library API.

mod common;

use std::time::Duration;

use common::{drain, Harness};
use pretty_assertions::assert_eq;
use selectrix_lib::bus::ChangeEvent;
use selectrix_lib::core::{ModifyTask, PageRequest};
use selectrix_lib::runtime::SchedulerConfig;

#[test]
fn select_reorder_and_read_back() {
    let harness = Harness::seeded(100);
    let mut events = harness.bus.subscribe();

    harness.queue.enqueue_modify(ModifyTask::Select(3));
    harness.queue.enqueue_modify(ModifyTask::Select(1));
    harness.queue.enqueue_modify(ModifyTask::Move {
        dragged_id: 1,
        target_id: None,
    });
    let changes = harness.scheduler.run_modify_cycle();

    assert_eq!(harness.selection(), vec![3, 1]);
    assert_eq!(
        changes,
        vec![
            ChangeEvent::ItemSelected(3),
            ChangeEvent::ItemSelected(1),
            ChangeEvent::ItemMoved {
                dragged_id: 1,
                target_id: None,
            },
        ]
    );
    assert_eq!(drain(&mut events), vec![ChangeEvent::BatchUpdate(changes)]);

    let selected = harness.query.selected(&PageRequest::default());
    assert_eq!(selected.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 1]);

    let available = harness.query.available(&PageRequest::new(1, 3, ""));
    assert_eq!(available.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 4, 5]);
    assert_eq!(available.total_count, 98);
}

#[test]
fn select_then_deselect_leaves_item_available() {
    let harness = Harness::seeded(10);
    let mut events = harness.bus.subscribe();

    harness.queue.enqueue_modify(ModifyTask::Select(5));
    harness.queue.enqueue_modify(ModifyTask::Deselect(5));
    harness.scheduler.run_modify_cycle();

    assert!(harness.selection().is_empty());
    assert_eq!(
        drain(&mut events),
        vec![ChangeEvent::BatchUpdate(vec![
            ChangeEvent::ItemSelected(5),
            ChangeEvent::ItemDeselected(5),
        ])]
    );
    assert_eq!(harness.query.available(&PageRequest::default()).total_count, 10);
}

#[test]
fn moving_unselected_item_changes_nothing() {
    let harness = Harness::seeded(10);
    harness.queue.enqueue_modify(ModifyTask::Select(2));
    harness.scheduler.run_modify_cycle();
    let mut events = harness.bus.subscribe();

    harness.queue.enqueue_modify(ModifyTask::Move {
        dragged_id: 8,
        target_id: Some(2),
    });
    harness.scheduler.run_modify_cycle();

    assert_eq!(harness.selection(), vec![2]);
    assert_eq!(harness.store.len(), 10);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn repeated_adds_collapse_into_one_insert() {
    let harness = Harness::seeded(10);
    let mut events = harness.bus.subscribe();

    assert!(harness.queue.enqueue_add(15).is_ok());
    assert!(harness.queue.enqueue_add(15).is_ok());
    assert!(harness.queue.enqueue_add(10).is_err());
    harness.scheduler.run_add_cycle();
    harness.scheduler.run_add_cycle();

    assert_eq!(drain(&mut events), vec![ChangeEvent::NewItemsAdded(vec![15])]);
    assert_eq!(harness.store.len(), 11);
}

#[tokio::test(start_paused = true)]
async fn timed_loops_deliver_to_subscribers() {
    let harness = Harness::seeded(50);
    let mut first = harness.bus.subscribe();
    let mut second = harness.bus.subscribe();
    let handle = harness.scheduler.clone().start(SchedulerConfig::default());

    harness.queue.enqueue_modify(ModifyTask::Select(7));
    harness.queue.enqueue_modify(ModifyTask::Select(17));
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let expected = vec![ChangeEvent::BatchUpdate(vec![
        ChangeEvent::ItemSelected(7),
        ChangeEvent::ItemSelected(17),
    ])];
    assert_eq!(drain(&mut first), expected);
    assert_eq!(drain(&mut second), expected);

    handle.shutdown().await;
}
