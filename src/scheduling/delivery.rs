use async_trait::async_trait;

use crate::reminder::Reminder;

/// Outbound side of the scheduler. Implementations push a fired reminder to
/// whatever destination its `channel` field names.
#[async_trait]
pub trait DeliveryChannel: Send + Sync + 'static {
    async fn deliver(&self, reminder: &Reminder) -> anyhow::Result<()>;
}
