//! Change events pushed to live listeners.
//!
//! Wire shape is `{"type": <snake_case name>, "payload": ...}`, one event per
//! stream frame.

use serde::{Deserialize, Serialize};

use crate::core::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Ids actually inserted by one add cycle.
    NewItemsAdded(Vec<ItemId>),
    ItemSelected(ItemId),
    ItemDeselected(ItemId),
    ItemMoved {
        #[serde(rename = "draggedItemId")]
        dragged_id: ItemId,
        #[serde(rename = "targetItemId")]
        target_id: Option<ItemId>,
    },
    /// Every event from one modify cycle, in application order.
    BatchUpdate(Vec<ChangeEvent>),
}

impl ChangeEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewItemsAdded(_) => "new_items_added",
            Self::ItemSelected(_) => "item_selected",
            Self::ItemDeselected(_) => "item_deselected",
            Self::ItemMoved { .. } => "item_moved",
            Self::BatchUpdate(_) => "batch_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_update_wire_shape() {
        let event = ChangeEvent::BatchUpdate(vec![
            ChangeEvent::ItemSelected(3),
            ChangeEvent::ItemDeselected(4),
            ChangeEvent::ItemMoved {
                dragged_id: 3,
                target_id: None,
            },
        ]);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "batch_update",
                "payload": [
                    { "type": "item_selected", "payload": 3 },
                    { "type": "item_deselected", "payload": 4 },
                    { "type": "item_moved", "payload": { "draggedItemId": 3, "targetItemId": null } }
                ]
            })
        );
    }

    #[test]
    fn test_new_items_added_wire_shape() {
        let value = serde_json::to_value(ChangeEvent::NewItemsAdded(vec![7, 9])).unwrap();
        assert_eq!(value, json!({ "type": "new_items_added", "payload": [7, 9] }));
    }

    #[test]
    fn test_event_type_matches_serialized_tag() {
        let event = ChangeEvent::ItemMoved {
            dragged_id: 1,
            target_id: Some(2),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.event_type());
    }
}
