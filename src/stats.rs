use crate::record::{Record, Severity};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_log_name: BTreeMap<String, usize>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub unique_traces: usize,
    pub http_status_codes: BTreeMap<u16, usize>,
}

impl RecordStats {
    pub fn collect<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut out = RecordStats::default();
        let mut log_names: AHashMap<&str, usize> = AHashMap::new();
        let mut traces: AHashSet<&str> = AHashSet::new();

        for r in records {
            out.total += 1;
            *out.by_severity.entry(r.severity).or_insert(0) += 1;
            *log_names.entry(short_log_name(r.log_name.as_deref())).or_insert(0) += 1;
            out.earliest = Some(out.earliest.map_or(r.timestamp, |t| t.min(r.timestamp)));
            out.latest = Some(out.latest.map_or(r.timestamp, |t| t.max(r.timestamp)));
            if let Some(t) = r.trace.as_deref() {
                traces.insert(t);
            }
            if let Some(code) = r.http_status {
                *out.http_status_codes.entry(code).or_insert(0) += 1;
            }
        }

        out.by_log_name = log_names.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        out.unique_traces = traces.len();
        out
    }
}

// "projects/p/logs/run.googleapis.com%2Fstderr" -> "run.googleapis.com%2Fstderr"
fn short_log_name(name: Option<&str>) -> &str {
    match name {
        Some(n) => n.rsplit('/').next().unwrap_or(n),
        None => "unknown",
    }
}
