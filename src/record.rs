use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Record severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Provider level names fold onto the five-step scale.
        match s.trim().to_ascii_uppercase().as_str() {
            "DEFAULT" | "DEBUG" | "TRACE" => Ok(Severity::Debug),
            "INFO" | "NOTICE" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" | "ERR" => Ok(Severity::Error),
            "CRITICAL" | "ALERT" | "EMERGENCY" | "FATAL" => Ok(Severity::Critical),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Payload carried by a fetched entry, before message extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Map<String, Value>),
    None,
}

const MESSAGE_KEYS: [&str; 4] = ["message", "error", "msg", "text"];

/// Pick the human-readable message out of a payload.
///
/// Structured payloads are searched for `message`, `error`, `msg` and `text`
/// in that order; when none is present the whole payload is rendered. Empty or
/// missing payloads fall back to `fallback`, the entry's own textual form.
pub fn extract_message(payload: &Payload, fallback: impl FnOnce() -> String) -> String {
    match payload {
        Payload::Text(s) if !s.is_empty() => s.clone(),
        Payload::Json(map) if !map.is_empty() => MESSAGE_KEYS
            .iter()
            .find_map(|k| map.get(*k))
            .map(value_text)
            .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        _ => fallback(),
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One fetched log entry. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub resource_type: String,
    #[serde(default)]
    pub resource_labels: BTreeMap<String, String>,
    pub message: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub insert_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl Record {
    /// Minimal record; the remaining fields start empty.
    pub fn new(
        timestamp: DateTime<Utc>,
        severity: Severity,
        resource_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            severity,
            resource_type: resource_type.into(),
            resource_labels: BTreeMap::new(),
            message: message.into(),
            labels: BTreeMap::new(),
            insert_id: String::new(),
            trace: None,
            log_name: None,
            span_id: None,
            http_status: None,
        }
    }

    pub fn with_insert_id(mut self, insert_id: impl Into<String>) -> Self {
        self.insert_id = insert_id.into();
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_resource_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.resource_labels.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// `service_name` resource label, as set by serverless runtimes.
    pub fn service(&self) -> Option<&str> {
        self.resource_labels.get("service_name").map(String::as_str)
    }

    pub fn revision(&self) -> Option<&str> {
        self.resource_labels.get("revision_name").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn message_keys_are_searched_in_priority_order() {
        let p = Payload::Json(obj(json!({"text": "t", "msg": "m", "error": "e"})));
        assert_eq!(extract_message(&p, String::new), "e");
        let p = Payload::Json(obj(json!({"text": "t", "message": "first"})));
        assert_eq!(extract_message(&p, String::new), "first");
    }

    #[test]
    fn non_string_message_values_use_json_text() {
        let p = Payload::Json(obj(json!({"error": {"code": 7}})));
        assert_eq!(extract_message(&p, String::new), r#"{"code":7}"#);
    }

    #[test]
    fn payload_without_known_keys_is_rendered_whole() {
        let p = Payload::Json(obj(json!({"status": 500})));
        assert_eq!(extract_message(&p, String::new), r#"{"status":500}"#);
    }

    #[test]
    fn empty_payload_uses_fallback() {
        assert_eq!(extract_message(&Payload::None, || "entry".into()), "entry");
        assert_eq!(extract_message(&Payload::Text(String::new()), || "entry".into()), "entry");
        assert_eq!(extract_message(&Payload::Json(Map::new()), || "entry".into()), "entry");
    }

    #[test]
    fn builders_fill_optional_fields() {
        let ts = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap();
        let r = Record::new(ts, Severity::Error, "cloud_run_revision", "boom")
            .with_resource_label("service_name", "api")
            .with_resource_label("revision_name", "api-00007")
            .with_label("instanceId", "00bf")
            .with_insert_id("i-1");
        assert_eq!(r.service(), Some("api"));
        assert_eq!(r.revision(), Some("api-00007"));
        assert_eq!(r.labels.get("instanceId").map(String::as_str), Some("00bf"));

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["labels"]["instanceId"], "00bf");
        assert!(v.get("trace").is_none());
        let back: Record = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn severity_aliases_and_order() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("EMERGENCY".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("DEFAULT".parse::<Severity>(), Ok(Severity::Debug));
        assert!("loud".parse::<Severity>().is_err());
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Critical);
    }
}
