//! Paginated, filtered read views over the available and selected sets.
//!
//! Reads go straight to the store and never wait on the mutation queue. The
//! selection is snapshotted first; since items are never removed, every
//! selected id in that snapshot is still present when the items are read.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Item, ItemId};
use crate::store::ItemStore;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_MAX_LIMIT: usize = 1000;

/// One page request. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
    pub filter: String,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize, filter: impl Into<String>) -> Self {
        Self {
            page,
            limit,
            filter: filter.into(),
        }
    }

    /// Build from raw query-string values. Missing, non-numeric, zero or
    /// negative page/limit fall back to the defaults.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, filter: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
            filter: filter.unwrap_or_default().to_string(),
        }
    }

    fn matches(&self, id: ItemId) -> bool {
        self.filter.is_empty() || id.to_string().contains(&self.filter)
    }

    fn offset(&self, limit: usize) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT, "")
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok().filter(|value| *value > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Item>,
    pub total_count: usize,
}

#[derive(Clone)]
pub struct QueryService {
    store: Arc<ItemStore>,
    max_limit: usize,
}

impl QueryService {
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self::with_max_limit(store, DEFAULT_MAX_LIMIT)
    }

    pub fn with_max_limit(store: Arc<ItemStore>, max_limit: usize) -> Self {
        Self {
            store,
            max_limit: max_limit.max(1),
        }
    }

    /// Stored items not currently selected, in ascending id order.
    pub fn available(&self, request: &PageRequest) -> Page {
        let limit = self.effective_limit(request);
        let offset = request.offset(limit);
        let selection = self.store.selection_order();
        let selected: HashSet<ItemId> = selection.iter().copied().collect();

        let mut items = Vec::new();
        let mut total_count = 0;
        self.store.scan_ids(|id| {
            if !selected.contains(&id) && request.matches(id) {
                if total_count >= offset && items.len() < limit {
                    items.push(Item::new(id));
                }
                total_count += 1;
            }
            ControlFlow::Continue(())
        });

        Page { items, total_count }
    }

    /// Selected items in their current display order.
    pub fn selected(&self, request: &PageRequest) -> Page {
        let limit = self.effective_limit(request);
        let offset = request.offset(limit);
        let selection = self.store.selection_order();

        let matching: Vec<ItemId> = selection
            .iter()
            .copied()
            .filter(|id| request.matches(*id))
            .collect();
        let items = matching
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.store.get(*id).ok())
            .collect();

        Page {
            items,
            total_count: matching.len(),
        }
    }

    fn effective_limit(&self, request: &PageRequest) -> usize {
        request.limit.clamp(1, self.max_limit)
    }
}
