use crate::filter::FilterBuilder;
use crate::record::Severity;
use crate::window::{IncidentTrigger, IncidentWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IncidentError {
    #[error("alert payload parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("incident has no resource type")]
    MissingResourceType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Incident section of a monitoring alert notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Incident {
    pub incident_id: Option<String>,
    pub scoping_project_id: Option<String>,
    /// Epoch seconds.
    pub started_at: Option<i64>,
    /// Epoch seconds; null or zero while the incident is open.
    pub ended_at: Option<i64>,
    pub state: Option<String>,
    pub summary: Option<String>,
    pub policy_name: Option<String>,
    pub condition_name: Option<String>,
    pub url: Option<String>,
    pub resource: MonitoredResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub incident: Incident,
}

impl AlertPayload {
    pub fn from_json(text: &str) -> Result<Self, IncidentError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Incident {
    pub fn trigger(&self) -> IncidentTrigger {
        IncidentTrigger::from_epoch_secs(self.started_at, self.ended_at)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.scoping_project_id
            .as_deref()
            .or_else(|| self.resource.labels.get("project_id").map(String::as_str))
    }

    /// Filter selecting the incident's resource within `window`. Severity is
    /// left open unless `include_all_severities` is false.
    pub fn log_filter(
        &self,
        window: &IncidentWindow,
        include_all_severities: bool,
    ) -> Result<String, IncidentError> {
        let resource_type = self
            .resource
            .resource_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(IncidentError::MissingResourceType)?;

        let mut builder = FilterBuilder::new().with_resource_type(resource_type);
        for (k, v) in &self.resource.labels {
            builder = builder.with_resource_label(k, v);
        }
        builder = builder.with_time_window(*window);
        if !include_all_severities {
            builder = builder.with_severity_floor(Severity::Error);
        }
        Ok(builder.build())
    }
}
