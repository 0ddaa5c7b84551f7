//! Periodic batch application of queued mutations.
//!
//! Two independent loops drain the mutation queue on their own period:
//! additions are bulk and low-urgency, selection changes drive interactive
//! feedback. Each tick is one drain-apply-publish step; the same steps are
//! exposed for manual invocation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::apply::apply_batch;
use crate::bus::{ChangeEvent, EventBus};
use crate::store::{ItemStore, MutationQueue};

pub const DEFAULT_ADD_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MODIFY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub add_interval: Duration,
    pub modify_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            add_interval: DEFAULT_ADD_INTERVAL,
            modify_interval: DEFAULT_MODIFY_INTERVAL,
        }
    }
}

pub struct BatchScheduler {
    store: Arc<ItemStore>,
    queue: Arc<MutationQueue>,
    bus: Arc<EventBus>,
    // Serializes cycles so only one mutator touches the store at a time.
    apply_lock: Mutex<()>,
}

impl BatchScheduler {
    pub fn new(store: Arc<ItemStore>, queue: Arc<MutationQueue>, bus: Arc<EventBus>) -> Self {
        Self {
            store,
            queue,
            bus,
            apply_lock: Mutex::new(()),
        }
    }

    /// Drain pending additions and insert the ones still absent.
    ///
    /// Publishes and returns `NewItemsAdded` listing only ids actually
    /// inserted, or `None` when nothing was.
    pub fn run_add_cycle(&self) -> Option<ChangeEvent> {
        let _guard = self.apply_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let pending = self.queue.drain_adds();
        if pending.is_empty() {
            return None;
        }

        let inserted = self.store.insert_missing(&pending);
        tracing::debug!(
            pending = pending.len(),
            inserted = inserted.len(),
            total = self.store.len(),
            "add cycle applied"
        );
        if inserted.is_empty() {
            return None;
        }

        let change = ChangeEvent::NewItemsAdded(inserted);
        self.bus.publish(change.clone());
        Some(change)
    }

    /// Drain pending selection changes and apply them in queue order.
    ///
    /// Returns the per-task events in application order. When there is at
    /// least one, they are published together as a single `BatchUpdate`.
    pub fn run_modify_cycle(&self) -> Vec<ChangeEvent> {
        let _guard = self.apply_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let tasks = self.queue.drain_modifies();
        if tasks.is_empty() {
            return Vec::new();
        }

        let task_count = tasks.len();
        let mut order = self.store.selection_order().as_ref().clone();
        let changes = apply_batch(&self.store, &mut order, tasks);
        self.store.replace_selection_order(order);

        tracing::debug!(
            tasks = task_count,
            events = changes.len(),
            selected = self.store.selected_len(),
            "modify cycle applied"
        );
        if !changes.is_empty() {
            self.bus.publish(ChangeEvent::BatchUpdate(changes.clone()));
        }
        changes
    }

    /// Spawn both periodic loops. The first tick of each fires one full period
    /// after start.
    pub fn start(self: Arc<Self>, config: SchedulerConfig) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let adds = spawn_loop(
            "add",
            config.add_interval,
            shutdown_rx.clone(),
            {
                let scheduler = self.clone();
                move || {
                    scheduler.run_add_cycle();
                }
            },
        );
        let modifies = spawn_loop("modify", config.modify_interval, shutdown_rx, move || {
            self.run_modify_cycle();
        });

        tracing::info!(
            add_interval_ms = config.add_interval.as_millis() as u64,
            modify_interval_ms = config.modify_interval.as_millis() as u64,
            "batch scheduler started"
        );
        SchedulerHandle {
            shutdown: shutdown_tx,
            tasks: vec![adds, modifies],
        }
    }
}

fn spawn_loop(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    step: impl Fn() + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => step(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!(cycle = name, "batch loop stopped");
    })
}

/// Controls the running scheduler loops.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop scheduling further cycles and wait for both loops to exit. A cycle
    /// already in progress runs to completion; queued work not yet drained is
    /// dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("batch loop ended abnormally: {e}");
            }
        }
        tracing::info!("batch scheduler stopped");
    }
}
