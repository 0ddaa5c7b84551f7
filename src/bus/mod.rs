//! Event system for live change notifications.
//!
//! The event bus provides:
//! - Publish-subscribe fan-out of change events to stream listeners
//! - An independent bounded buffer per subscriber (drop-oldest on overflow)
//! - Sequence-stamped envelopes so transports can expose an event id
//!
//! # Architecture
//!
//! Events flow from the batch scheduler → EventBus → Subscription → client:
//! - `EventBus`: in-memory broadcast channel, live-only, no replay
//! - `Subscription`: one listener's cursor; dropping it unsubscribes
//! - `ChangeEvent`: the JSON wire shape forwarded verbatim to clients

mod event_bus;
pub mod event_types;

pub use event_bus::{BusEvent, EventBus, Subscription, DEFAULT_BUS_CAPACITY};
pub use event_types::ChangeEvent;
