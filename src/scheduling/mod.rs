mod queue;
mod scheduler;

pub mod delivery;

pub use queue::ReminderQueue;
pub use scheduler::{ReminderScheduler, SchedulerError, WatchHandle};
