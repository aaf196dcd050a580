use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("incident trigger has no start instant")]
pub struct InvalidTriggerError;

/// Start/end of a detected incident. An open incident has no end yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTrigger {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl IncidentTrigger {
    pub fn new(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> Self {
        Self { started_at: Some(started_at), ended_at }
    }

    /// Trigger from alert epoch seconds; zero and out-of-range values read as unset.
    pub fn from_epoch_secs(started_at: Option<i64>, ended_at: Option<i64>) -> Self {
        Self {
            started_at: started_at.and_then(epoch_secs),
            ended_at: ended_at.and_then(epoch_secs),
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

fn epoch_secs(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// Absolute query window, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl IncidentWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}

/// `t - d`, pinned to the earliest representable instant on overflow.
pub(crate) fn saturating_sub(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    t.checked_sub_signed(d).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `t + d`, pinned to the latest representable instant on overflow.
pub(crate) fn saturating_add(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    t.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Widen an incident into a query window.
///
/// The lead buffer is subtracted from the start; the trail buffer is added to
/// the end, or to `now` while the incident is still open. Negative buffers
/// count as zero, and buffers too large for the calendar saturate at its
/// bounds.
pub fn resolve(
    trigger: &IncidentTrigger,
    before: Duration,
    after: Duration,
    now: DateTime<Utc>,
) -> Result<IncidentWindow, InvalidTriggerError> {
    let started_at = trigger.started_at.ok_or(InvalidTriggerError)?;
    let before = before.max(Duration::zero());
    let after = after.max(Duration::zero());

    let start = saturating_sub(started_at, before);
    let end = saturating_add(trigger.ended_at.unwrap_or(now), after);
    Ok(IncidentWindow { start, end: end.max(start) })
}
