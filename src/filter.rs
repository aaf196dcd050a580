use crate::record::Severity;
use crate::window::{saturating_sub, IncidentWindow};
use chrono::{DateTime, Duration, Utc};

/// Time bounds for a query; the end is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end: Some(end) }
    }

    /// Open range starting `lookback` before `now`; saturates at the earliest
    /// representable instant.
    pub fn lookback(lookback: Duration, now: DateTime<Utc>) -> Self {
        Self::since(saturating_sub(now, lookback))
    }
}

impl From<IncidentWindow> for TimeRange {
    fn from(w: IncidentWindow) -> Self {
        Self::between(w.start, w.end)
    }
}

/// Accumulates filter clauses for the log source. Clauses render one per line
/// and are implicitly AND-ed by the source.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    clauses: Vec<String>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self { clauses: Vec::new() }
    }

    pub fn with_severity_floor(mut self, severity: Severity) -> Self {
        self.clauses.push(format!("severity >= {severity}"));
        self
    }

    pub fn with_resource_type(mut self, resource_type: &str) -> Self {
        if resource_type.is_empty() {
            log::debug!("empty resource type ignored");
            return self;
        }
        self.clauses.push(format!("resource.type=\"{resource_type}\""));
        self
    }

    pub fn with_resource_label(mut self, key: &str, value: &str) -> Self {
        self.clauses.push(format!("resource.labels.{key}=\"{value}\""));
        self
    }

    pub fn with_time_window(mut self, window: impl Into<TimeRange>) -> Self {
        let window = window.into();
        self.clauses.push(format!("timestamp >= \"{}\"", rfc3339(window.start)));
        if let Some(end) = window.end {
            self.clauses.push(format!("timestamp <= \"{}\"", rfc3339(end)));
        }
        self
    }

    /// Open-ended window reaching `lookback` into the past from `now`.
    pub fn with_lookback(self, lookback: Duration, now: DateTime<Utc>) -> Self {
        self.with_time_window(TimeRange::lookback(lookback, now))
    }

    /// Free-text search. The text is quoted verbatim; callers keep quotes and
    /// newlines out of it.
    pub fn with_text_search(mut self, text: &str) -> Self {
        self.clauses.push(format!("\"{text}\""));
        self
    }

    pub fn with_raw_clause(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn build(&self) -> String {
        self.clauses.join("\n")
    }
}

// RFC 3339 at second precision. `format` rather than `to_rfc3339_opts`, which
// panics on years outside 0..=9999.
fn rfc3339(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
