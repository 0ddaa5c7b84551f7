pub mod apply;
pub mod scheduler;

pub use apply::ApplyError;
pub use scheduler::{BatchScheduler, SchedulerConfig, SchedulerHandle};
