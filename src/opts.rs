use crate::filter::{FilterBuilder, TimeRange};
use crate::incident::{Incident, IncidentError};
use crate::record::Severity;
use crate::window::IncidentWindow;
use chrono::Duration;

/// Plain parameters for one triage run.
#[derive(Debug, Clone)]
pub struct TriageOpts {
    pub severity_floor: Option<Severity>,
    pub resource_type: Option<String>,
    pub text_search: Option<String>,
    pub raw_filter: Option<String>,
    /// Lead buffer before an incident starts.
    pub before: Duration,
    /// Trail buffer after an incident ends.
    pub after: Duration,
    pub max_records: Option<usize>,
    pub top_groups: usize,
    /// Narrow incident filters to `severity >= ERROR`. Off by default so the
    /// records leading up to a failure are collected too.
    pub errors_only: bool,
}

impl Default for TriageOpts {
    fn default() -> Self {
        Self {
            severity_floor: Some(Severity::Error),
            resource_type: None,
            text_search: None,
            raw_filter: None,
            before: Duration::minutes(1),
            after: Duration::minutes(1),
            max_records: Some(100),
            top_groups: 10,
            errors_only: false,
        }
    }
}

impl TriageOpts {
    /// Filter for an ad-hoc query: severity, time, resource, text, then the
    /// raw clause.
    pub fn filter(&self, range: Option<TimeRange>) -> FilterBuilder {
        let mut b = FilterBuilder::new();
        if let Some(sev) = self.severity_floor {
            b = b.with_severity_floor(sev);
        }
        if let Some(range) = range {
            b = b.with_time_window(range);
        }
        if let Some(rt) = self.resource_type.as_deref() {
            b = b.with_resource_type(rt);
        }
        if let Some(text) = self.text_search.as_deref() {
            b = b.with_text_search(text);
        }
        if let Some(raw) = self.raw_filter.as_deref() {
            b = b.with_raw_clause(raw);
        }
        b
    }

    /// Filter for an incident's resource within `window`.
    pub fn incident_filter(
        &self,
        incident: &Incident,
        window: &IncidentWindow,
    ) -> Result<String, IncidentError> {
        incident.log_filter(window, !self.errors_only)
    }
}
