//! Crate-level scenario tests.
//!
//! This module provides shared fixtures for the scenario test files.

use crate::config::AppConfig;
use crate::store::ItemStore;
use crate::AppState;



/// App state over a store seeded with `1..=size` and default settings.
pub fn seeded_state(size: u64) -> AppState {
    AppState::with_store(ItemStore::seeded(1..=size), &AppConfig::default())
}
