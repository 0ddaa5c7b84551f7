use serde::{Deserialize, Serialize};

/// Identifier of an item. Always positive once past the request boundary.
pub type ItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
}

impl Item {
    pub fn new(id: ItemId) -> Self {
        Self { id }
    }
}

/// A pending selection-state change. Validity is decided when the task is
/// applied, never when it is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyTask {
    Select(ItemId),
    Deselect(ItemId),
    Move {
        dragged_id: ItemId,
        target_id: Option<ItemId>,
    },
}

impl ModifyTask {
    /// Short label used in log lines.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Deselect(_) => "deselect",
            Self::Move { .. } => "move",
        }
    }

    /// The id whose selection state the task acts on.
    pub fn subject(&self) -> ItemId {
        match *self {
            Self::Select(id) | Self::Deselect(id) => id,
            Self::Move { dragged_id, .. } => dragged_id,
        }
    }
}
