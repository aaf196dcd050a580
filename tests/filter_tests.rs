use chrono::{Duration, TimeZone, Utc};
use logtriage::filter::{FilterBuilder, TimeRange};
use logtriage::record::Severity;
use logtriage::window::IncidentWindow;

#[test]
fn severity_resource_and_open_window_render_three_clauses() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let filter = FilterBuilder::new()
        .with_severity_floor(Severity::Error)
        .with_resource_type("cloud_run_revision")
        .with_time_window(TimeRange::since(t0))
        .build();
    assert_eq!(
        filter,
        "severity >= ERROR\nresource.type=\"cloud_run_revision\"\ntimestamp >= \"2024-01-01T12:00:00Z\""
    );
    assert!(!filter.contains("timestamp <="));
}

#[test]
fn closed_window_adds_upper_bound() {
    let w = IncidentWindow {
        start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
    };
    let filter = FilterBuilder::new().with_time_window(w).build();
    assert_eq!(
        filter,
        "timestamp >= \"2024-01-01T00:00:00Z\"\ntimestamp <= \"2024-01-01T01:00:00Z\""
    );
}

#[test]
fn empty_builder_selects_everything() {
    let b = FilterBuilder::new();
    assert!(b.is_empty());
    assert_eq!(b.build(), "");
}

#[test]
fn text_search_and_raw_clause_are_verbatim() {
    let filter = FilterBuilder::new()
        .with_text_search("division by zero")
        .with_raw_clause("labels.error_type=\"CALCULATION_ERROR\"")
        .build();
    assert_eq!(filter, "\"division by zero\"\nlabels.error_type=\"CALCULATION_ERROR\"");
}

#[test]
fn empty_resource_type_adds_nothing() {
    let b = FilterBuilder::new().with_resource_type("");
    assert!(b.clauses().is_empty());
}

#[test]
fn build_is_repeatable() {
    let b = FilterBuilder::new()
        .with_severity_floor(Severity::Warning)
        .with_resource_label("service_name", "api");
    let first = b.build();
    assert_eq!(b.build(), first);
    assert_eq!(first, "severity >= WARNING\nresource.labels.service_name=\"api\"");
}

#[test]
fn lookback_is_relative_to_injected_now() {
    let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
    let filter = FilterBuilder::new().with_lookback(Duration::hours(24), now).build();
    assert_eq!(filter, "timestamp >= \"2024-05-01T00:00:00Z\"");
}

#[test]
fn opts_render_clauses_in_query_order() {
    let opts = logtriage::opts::TriageOpts {
        resource_type: Some("gce_instance".into()),
        text_search: Some("boom".into()),
        raw_filter: Some("logName:\"stderr\"".into()),
        ..Default::default()
    };
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let filter = opts.filter(Some(TimeRange::since(t0))).build();
    let lines: Vec<&str> = filter.lines().collect();
    assert_eq!(
        lines,
        vec![
            "severity >= ERROR",
            "timestamp >= \"2024-01-01T00:00:00Z\"",
            "resource.type=\"gce_instance\"",
            "\"boom\"",
            "logName:\"stderr\"",
        ]
    );
}

#[test]
fn oversized_lookback_saturates() {
    let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
    let range = TimeRange::lookback(Duration::MAX, now);
    assert_eq!(range.start, chrono::DateTime::<Utc>::MIN_UTC);
    let filter = FilterBuilder::new().with_lookback(Duration::MAX, now).build();
    assert!(filter.starts_with("timestamp >= \"-"), "{filter}");
}
