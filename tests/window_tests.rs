use chrono::{DateTime, Duration, Utc};
use logtriage::window::{resolve, IncidentTrigger, InvalidTriggerError};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

#[test]
fn open_incident_ends_at_now_plus_trail() {
    let trigger = IncidentTrigger { started_at: Some(at(1000)), ended_at: None };
    let w = resolve(&trigger, Duration::seconds(60), Duration::seconds(60), at(1500)).unwrap();
    assert_eq!(w.start, at(940));
    assert_eq!(w.end, at(1560));
}

#[test]
fn closed_incident_ignores_now() {
    let trigger = IncidentTrigger::new(at(1000), Some(at(1200)));
    let w = resolve(&trigger, Duration::minutes(10), Duration::minutes(2), at(99_999)).unwrap();
    assert_eq!(w.start, at(400));
    assert_eq!(w.end, at(1320));
    assert_eq!(w.duration(), Duration::seconds(920));
}

#[test]
fn missing_start_is_an_error() {
    let trigger = IncidentTrigger { started_at: None, ended_at: Some(at(10)) };
    let err = resolve(&trigger, Duration::zero(), Duration::zero(), at(20)).unwrap_err();
    assert_eq!(err, InvalidTriggerError);
    assert_eq!(err.to_string(), "incident trigger has no start instant");
}

#[test]
fn start_never_exceeds_end() {
    let starts = [0i64, 1000, 5000];
    let ends = [None, Some(0i64), Some(1000), Some(10_000)];
    let buffers = [0i64, 1, 60, 3600];
    for s in starts {
        for e in ends {
            for b in buffers {
                for a in buffers {
                    let trigger = IncidentTrigger {
                        started_at: Some(at(s)),
                        ended_at: e.map(at),
                    };
                    let w = resolve(&trigger, Duration::seconds(b), Duration::seconds(a), at(2000)).unwrap();
                    assert!(w.start <= w.end, "start={s} end={e:?} before={b} after={a}");
                }
            }
        }
    }
}

#[test]
fn negative_buffers_count_as_zero() {
    let trigger = IncidentTrigger::new(at(1000), Some(at(1100)));
    let w = resolve(&trigger, Duration::seconds(-30), Duration::seconds(-30), at(0)).unwrap();
    assert_eq!(w.start, at(1000));
    assert_eq!(w.end, at(1100));
}

#[test]
fn epoch_trigger_from_alert_fields() {
    let t = IncidentTrigger::from_epoch_secs(Some(1000), None);
    assert_eq!(t.started_at, Some(at(1000)));
    assert!(t.is_open());
    let w = resolve(&t, Duration::seconds(60), Duration::seconds(60), at(1500)).unwrap();
    assert!(w.contains(at(1000)));
    assert!(!w.contains(at(1560)));
}

#[test]
fn oversized_buffers_saturate_at_calendar_bounds() {
    let trigger = IncidentTrigger::new(at(1000), None);
    let w = resolve(&trigger, Duration::MAX, Duration::zero(), at(1500)).unwrap();
    assert_eq!(w.start, DateTime::<Utc>::MIN_UTC);
    assert_eq!(w.end, at(1500));

    let w = resolve(&trigger, Duration::zero(), Duration::MAX, at(1500)).unwrap();
    assert_eq!(w.start, at(1000));
    assert_eq!(w.end, DateTime::<Utc>::MAX_UTC);
    assert!(w.start <= w.end);
}
