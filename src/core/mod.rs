//! Shared domain types and read-side views.
//!
//! - `item`: item identifiers and the queued selection-change tasks
//! - `query`: paginated, filtered views over the available and selected sets

pub mod item;
pub mod query;

pub use item::{Item, ItemId, ModifyTask};
pub use query::{Page, PageRequest, QueryService};
