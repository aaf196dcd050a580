use crate::record::{extract_message, Payload, Record, Severity};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const MAX_ERROR_SAMPLES: usize = 5;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("entry is not a JSON object")]
    NotObject,
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry has no parseable timestamp")]
    MissingTimestamp,
    #[error(transparent)]
    Severity(#[from] crate::record::UnknownSeverity),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSample {
    pub entry: usize,
    pub error: String,
}

/// Entries that could not be turned into records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadErrors {
    pub total: usize,
    pub samples: Vec<ErrorSample>,
}

impl LoadErrors {
    fn push(&mut self, entry: usize, err: &ParseError) {
        self.total += 1;
        if self.samples.len() < MAX_ERROR_SAMPLES {
            self.samples.push(ErrorSample { entry, error: err.to_string() });
        }
    }
}

#[derive(Debug, Default)]
pub struct Loaded {
    pub records: Vec<Record>,
    pub errors: LoadErrors,
}

impl Loaded {
    pub fn append(&mut self, other: Loaded) {
        self.records.extend(other.records);
        self.errors.total += other.errors.total;
        let room = MAX_ERROR_SAMPLES.saturating_sub(self.errors.samples.len());
        self.errors.samples.extend(other.errors.samples.into_iter().take(room));
    }
}

/// Parse fetched entries from a saved-logs document (`{"logs": [...]}`), a
/// JSON array, or JSON Lines. Bad entries are counted and skipped.
pub fn parse_document(text: &str) -> Loaded {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => parse_entries(items.iter()),
        Ok(Value::Object(mut doc)) => match doc.remove("logs") {
            Some(Value::Array(items)) => parse_entries(items.iter()),
            _ => parse_entries(std::iter::once(&Value::Object(doc))),
        },
        _ => parse_lines(text),
    }
}

fn parse_entries<'a>(items: impl Iterator<Item = &'a Value>) -> Loaded {
    let mut out = Loaded::default();
    for (idx, item) in items.enumerate() {
        match parse_entry(item) {
            Ok(r) => out.records.push(r),
            Err(e) => {
                log::warn!("skipping entry {}: {}", idx + 1, e);
                out.errors.push(idx + 1, &e);
            }
        }
    }
    out
}

fn parse_lines(text: &str) -> Loaded {
    let mut out = Loaded::default();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(r) => out.records.push(r),
            Err(e) => {
                log::warn!("skipping line {}: {}", idx + 1, e);
                out.errors.push(idx + 1, &e);
            }
        }
    }
    out
}

pub fn parse_line(line: &str) -> Result<Record, ParseError> {
    let v: Value = serde_json::from_str(line)?;
    parse_entry(&v)
}

/// Map one collector entry onto a [`Record`].
pub fn parse_entry(v: &Value) -> Result<Record, ParseError> {
    let obj = v.as_object().ok_or(ParseError::NotObject)?;

    let timestamp = obj
        .get("timestamp")
        .or_else(|| obj.get("receive_timestamp"))
        .and_then(parse_ts_value)
        .ok_or(ParseError::MissingTimestamp)?;

    let severity = match obj.get("severity").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.parse::<Severity>()?,
        _ => Severity::Debug,
    };

    let resource = obj.get("resource").and_then(Value::as_object);
    let resource_type = resource
        .and_then(|r| r.get("type"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let resource_labels = resource.and_then(|r| r.get("labels")).map(string_map).unwrap_or_default();

    let payload = if let Some(Value::String(s)) = obj.get("text_payload") {
        Payload::Text(s.clone())
    } else if let Some(Value::Object(m)) = obj.get("json_payload") {
        Payload::Json(m.clone())
    } else if let Some(p) = obj.get("payload") {
        Payload::Text(match p {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    } else {
        Payload::None
    };
    let message = extract_message(&payload, || v.to_string());

    let http_status = obj
        .get("http_request")
        .and_then(|h| h.get("status"))
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());

    Ok(Record {
        timestamp,
        severity,
        resource_type,
        resource_labels,
        message,
        labels: obj.get("labels").map(string_map).unwrap_or_default(),
        insert_id: str_field(obj, "insert_id").unwrap_or_default(),
        trace: str_field(obj, "trace"),
        log_name: str_field(obj, "log_name"),
        span_id: str_field(obj, "span_id"),
        http_status,
    })
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

fn string_map(v: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Value::Object(map) = v {
        for (k, v) in map {
            let s = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.insert(k.clone(), s);
        }
    }
    out
}

fn parse_ts_value(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_ts_candidate(s),
        Value::Number(n) => n.as_i64().and_then(|i| parse_ts_number_string(&i.to_string())),
        _ => None,
    }
}

pub fn parse_ts_candidate(s: &str) -> Option<DateTime<Utc>> {
    parse_ts_string(s).or_else(|| parse_ts_number_string(s))
}

fn parse_ts_string(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let fmts = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%:z",
    ];
    for f in fmts.iter() {
        if let Ok(dt) = DateTime::parse_from_str(s, f) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // Naive forms are taken as UTC.
    let naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for f in naive.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

fn parse_ts_number_string(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n = s.parse::<i64>().ok()?;
    match s.len() {
        10 => DateTime::<Utc>::from_timestamp(n, 0),
        13 => DateTime::<Utc>::from_timestamp_millis(n),
        16 => DateTime::<Utc>::from_timestamp_micros(n),
        _ => None,
    }
}
