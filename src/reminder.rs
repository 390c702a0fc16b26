use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled notification. Records are immutable once created, the
/// scheduler only ever removes them when they fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub who: String,
    pub what: String,
    #[serde(rename = "where")]
    pub channel: String,
    pub when: DateTime<Utc>,
}

impl Reminder {
    pub fn new(
        who: impl Into<String>,
        what: impl Into<String>,
        channel: impl Into<String>,
        when: DateTime<Utc>,
    ) -> Self {
        Self {
            who: who.into(),
            what: what.into(),
            channel: channel.into(),
            when,
        }
    }
}
