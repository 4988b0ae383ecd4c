use chrono::{DateTime, Duration, TimeZone, Utc};

/// How long a cached dataset stays usable after it was fetched
pub const FRESHNESS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// When a dataset was written to the store, in epoch milliseconds.
///
/// Stored as a plain base-10 integer string next to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheStamp(i64);

impl CacheStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time.timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Parse a stored stamp; anything that isn't an integer yields `None`
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<i64>().ok().map(Self)
    }

    pub fn encode(&self) -> String {
        self.0.to_string()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// Milliseconds between this stamp and `now`; negative if the stamp is ahead
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.0)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.elapsed_ms(now) < FRESHNESS_WINDOW_MS
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let minutes = Duration::milliseconds(self.elapsed_ms(now)).num_minutes();
        if minutes < 1 {
            // Includes clock skew where the stamp is in the future
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}
