use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::delivery::DeliveryChannel;
use super::queue::ReminderQueue;
use crate::reminder::Reminder;
use crate::storage::{self, StorageError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("no reminders are pending")]
    Empty,
}

/// Handle to a running watcher. `stop` cancels the loop and waits for it to
/// wind down, up to the given timeout.
pub struct WatchHandle {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl WatchHandle {
    pub async fn stop(self, timeout: std::time::Duration) {
        self.cancellation_token.cancel();
        let stop_with_timeout = time::timeout(timeout, self.task_handle);
        let _ = stop_with_timeout.await;
    }
}

/// Owns the pending set, its on-disk copy and the wake-up signal for the
/// watcher.
///
/// Mutations never persist on their own. Callers finish a logical change
/// with `save` and `notify`; the watcher persists after each delivery so the
/// file tracks what is still pending.
pub struct ReminderScheduler {
    queue: Mutex<ReminderQueue>,
    file: PathBuf,
    activity: Notify,
}

impl ReminderScheduler {
    /// Loads the pending set from `file`. A missing or malformed file is not
    /// fatal: the scheduler starts empty and writes a fresh valid file in its
    /// place.
    pub fn initialize(file: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let file = file.into();
        let reminders = match storage::load(&file) {
            Ok(reminders) => reminders,
            Err(error @ (StorageError::NotFound { .. } | StorageError::Parse { .. })) => {
                log::warn!("Starting with an empty reminder set: {error}");
                storage::save(&file, &[])?;
                Vec::new()
            }
            Err(error) => return Err(error),
        };

        log::info!(
            "Loaded {} pending reminders from {}",
            reminders.len(),
            file.display()
        );

        Ok(Self {
            queue: Mutex::new(ReminderQueue::from_reminders(reminders)),
            file,
            activity: Notify::new(),
        })
    }

    /// Builds a reminder and inserts it into the pending set. Does not
    /// persist and does not wake the watcher; callers follow up with `save`
    /// and `notify` once they are done mutating.
    pub async fn add(
        &self,
        who: impl Into<String>,
        what: impl Into<String>,
        channel: impl Into<String>,
        when: DateTime<Utc>,
    ) -> Reminder {
        let reminder = Reminder::new(who, what, channel, when);
        self.queue.lock().await.insert(reminder.clone());

        log::debug!("Added reminder for {} due {}", reminder.who, reminder.when);

        reminder
    }

    /// Wakes a watcher blocked in its wait so it re-reads the pending set.
    /// Fire-and-forget: with no watcher running the wake-up is held as a
    /// single stored permit, and a watcher re-checks the set after every
    /// wake anyway, so collapsed signals are fine.
    pub fn notify(&self, reminder: &Reminder) {
        log::debug!("Waking the watcher for a reminder due {}", reminder.when);
        self.activity.notify_one();
    }

    /// Due time of the earliest pending reminder.
    pub async fn peek_next_time(&self) -> Result<DateTime<Utc>, SchedulerError> {
        self.queue
            .lock()
            .await
            .peek_earliest()
            .map(|reminder| reminder.when)
            .ok_or(SchedulerError::Empty)
    }

    /// Removes and returns the earliest pending reminder. This is the only
    /// way a reminder leaves the set.
    pub async fn next(&self) -> Result<Reminder, SchedulerError> {
        self.queue
            .lock()
            .await
            .remove_earliest()
            .ok_or(SchedulerError::Empty)
    }

    /// Rewrites the reminder file from the current pending set. Holds the
    /// queue lock for the whole write, so a concurrent mutation cannot
    /// produce a torn snapshot.
    pub async fn save(&self) -> Result<(), StorageError> {
        let queue = self.queue.lock().await;
        storage::save(&self.file, &queue.snapshot())
    }

    /// Pending reminders sorted by due time.
    pub async fn pending(&self) -> Vec<Reminder> {
        let mut reminders = self.queue.lock().await.snapshot();
        reminders.sort_by_key(|reminder| reminder.when);
        reminders
    }

    /// Spawns the watcher that delivers reminders as they come due. It
    /// sleeps until the earliest due time or until `notify` wakes it early,
    /// whichever comes first, and re-reads the pending set on every wake.
    /// Delivery runs on its own task so a slow channel never stalls the
    /// loop.
    pub fn watch(self: Arc<Self>, delivery: Arc<dyn DeliveryChannel>) -> WatchHandle {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();

        let task_handle = tokio::spawn(async move {
            self.run_watch(task_cancellation_token, delivery).await;
        });

        WatchHandle {
            task_handle,
            cancellation_token,
        }
    }

    async fn run_watch(
        &self,
        cancellation_token: CancellationToken,
        delivery: Arc<dyn DeliveryChannel>,
    ) {
        log::info!("Reminder watcher started");

        loop {
            let next_due = self.next_due().await;

            match next_due {
                None => {
                    tokio::select! {
                        _ = cancellation_token.cancelled() => break,
                        _ = self.activity.notified() => {}
                    }
                }
                Some(due) => {
                    // An already-due reminder gets a zero delay and fires on
                    // this cycle.
                    let delay = (due - Utc::now())
                        .to_std()
                        .unwrap_or(std::time::Duration::ZERO);

                    tokio::select! {
                        _ = cancellation_token.cancelled() => break,
                        _ = self.activity.notified() => {}
                        _ = time::sleep(delay) => self.fire_earliest(&delivery).await,
                    }
                }
            }
        }

        log::info!("Reminder watcher stopped");
    }

    async fn next_due(&self) -> Option<DateTime<Utc>> {
        self.queue
            .lock()
            .await
            .peek_earliest()
            .map(|reminder| reminder.when)
    }

    async fn fire_earliest(&self, delivery: &Arc<dyn DeliveryChannel>) {
        // The set may have been drained since the peek; an empty pop just
        // means another cycle.
        let Ok(reminder) = self.next().await else {
            return;
        };

        if let Err(error) = self.save().await {
            log::warn!("Could not persist reminders after a delivery: {error}");
        }

        log::info!(
            "Delivering reminder for {} due {}",
            reminder.who,
            reminder.when
        );

        let delivery = Arc::clone(delivery);
        tokio::spawn(async move {
            if let Err(error) = delivery.deliver(&reminder).await {
                log::warn!("Reminder delivery failed, the reminder is lost: {error}");
            }
        });
    }
}
