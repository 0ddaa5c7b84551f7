//! Application of queued selection changes to a working copy of the order.

use thiserror::Error;

use crate::bus::ChangeEvent;
use crate::core::{ItemId, ModifyTask};
use crate::store::ItemStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("cannot select item {0}: not in the store")]
    UnknownItem(ItemId),
}

/// Apply one task to `order`.
///
/// Returns the event the task produced, or `None` for a move of an item that
/// is not selected.
pub fn apply_task(
    store: &ItemStore,
    order: &mut Vec<ItemId>,
    task: ModifyTask,
) -> Result<Option<ChangeEvent>, ApplyError> {
    match task {
        ModifyTask::Select(id) => {
            if !order.contains(&id) {
                if !store.exists(id) {
                    return Err(ApplyError::UnknownItem(id));
                }
                order.push(id);
            }
            Ok(Some(ChangeEvent::ItemSelected(id)))
        }
        ModifyTask::Deselect(id) => {
            order.retain(|selected| *selected != id);
            Ok(Some(ChangeEvent::ItemDeselected(id)))
        }
        ModifyTask::Move {
            dragged_id,
            target_id,
        } => {
            let Some(from) = order.iter().position(|selected| *selected == dragged_id) else {
                return Ok(None);
            };
            order.remove(from);

            let to = target_id
                .and_then(|target| order.iter().position(|selected| *selected == target))
                .unwrap_or(order.len());
            order.insert(to, dragged_id);

            Ok(Some(ChangeEvent::ItemMoved {
                dragged_id,
                target_id,
            }))
        }
    }
}

/// Apply `tasks` in order. A failing task is logged and skipped; the rest of
/// the batch still runs.
pub fn apply_batch(
    store: &ItemStore,
    order: &mut Vec<ItemId>,
    tasks: impl IntoIterator<Item = ModifyTask>,
) -> Vec<ChangeEvent> {
    let mut changes = Vec::new();
    for task in tasks {
        match apply_task(store, order, task) {
            Ok(Some(change)) => changes.push(change),
            Ok(None) => tracing::debug!(
                action = task.action(),
                id = task.subject(),
                "task had no effect"
            ),
            Err(e) => tracing::warn!(action = task.action(), "skipping task: {e}"),
        }
    }
    changes
}
