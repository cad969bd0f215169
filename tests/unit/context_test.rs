//! Unit tests for the alert context builder
//!
//! Tests titles, duration units, deep links, restart fields and malformed input.

use rstest::rstest;
use streamx_alert::error::AlertError;
use streamx_alert::models::{AlertKind, AppState, DurationUnit, ExecutionMode, RestartInfo};
use streamx_alert::services::AlertContextBuilder;

use crate::common::{at_millis, EventBuilder, BASE_MILLIS};

fn builder() -> AlertContextBuilder {
    AlertContextBuilder::new(Some("http://rm.internal:8088".to_string()))
}

// =============================================================================
// Titles and Kinds
// =============================================================================

#[test]
fn test_state_change_titles() {
    let event = EventBuilder::new().with_state(AppState::Canceled).build();
    let record = builder().build(&event, at_millis(BASE_MILLIS)).unwrap();

    assert_eq!(record.kind, AlertKind::StateChange);
    assert_eq!(record.kind_code, 1);
    assert_eq!(record.status, "CANCELED");
    assert_eq!(record.title, "Notify: orders-etl CANCELED");
    assert_eq!(record.subject, "Alert: orders-etl CANCELED");
    assert!(record.checkpoint.is_none());
}

#[test]
fn test_checkpoint_failure_titles() {
    let event = EventBuilder::new()
        .with_state(AppState::Running)
        .checkpoint_failed()
        .build();
    let record = builder().build(&event, at_millis(BASE_MILLIS)).unwrap();

    assert_eq!(record.kind, AlertKind::CheckpointFailure);
    assert_eq!(record.title, "Notify: orders-etl checkpoint FAILED");
    assert_eq!(record.subject, "Alert: orders-etl, checkPoint is Failed");
    assert!(record.checkpoint.is_some());
}

// =============================================================================
// Duration
// =============================================================================

#[test]
fn test_checkpoint_duration_in_seconds_while_running() {
    let event = EventBuilder::new()
        .with_state(AppState::Running)
        .checkpoint_failed()
        .with_end_millis(None)
        .build();

    let record = builder()
        .build(&event, at_millis(BASE_MILLIS + 90_000))
        .unwrap();

    assert_eq!(record.duration.unit, DurationUnit::Seconds);
    assert_eq!(record.duration.value, 90);
    assert_eq!(record.duration.to_string(), "90s");
}

#[rstest]
#[case(false, DurationUnit::Minutes, 20)]
#[case(true, DurationUnit::Seconds, 1_200)]
fn test_duration_unit_depends_on_kind(
    #[case] checkpoint: bool,
    #[case] unit: DurationUnit,
    #[case] value: i64,
) {
    let mut builder_event = EventBuilder::new().with_end_millis(Some(BASE_MILLIS + 1_200_000));
    if checkpoint {
        builder_event = builder_event.checkpoint_failed();
    }
    let event = builder_event.build();

    let record = builder()
        .build(&event, at_millis(BASE_MILLIS + 9_999_999))
        .unwrap();

    assert_eq!(record.duration.unit, unit);
    assert_eq!(record.duration.value, value);
}

#[test]
fn test_end_time_falls_back_to_now() {
    let event = EventBuilder::new().with_end_millis(None).build();
    let now = at_millis(BASE_MILLIS + 180_000);

    let record = builder().build(&event, now).unwrap();
    let explicit = builder()
        .build(
            &EventBuilder::new()
                .with_end_millis(Some(BASE_MILLIS + 180_000))
                .build(),
            at_millis(0),
        )
        .unwrap();

    assert_eq!(record.duration.value, 3);
    assert_eq!(record.end_time, explicit.end_time);
}

#[test]
fn test_long_state_change_duration_reads_in_hours() {
    let event = EventBuilder::new()
        .with_end_millis(Some(BASE_MILLIS + 125 * 60_000))
        .build();

    let record = builder().build(&event, at_millis(BASE_MILLIS)).unwrap();

    assert_eq!(record.duration.value, 125);
    assert_eq!(record.duration.to_string(), "2h 5m");
}

// =============================================================================
// Deep Links
// =============================================================================

#[rstest]
#[case(ExecutionMode::YarnPerJob, true)]
#[case(ExecutionMode::YarnSession, true)]
#[case(ExecutionMode::YarnApplication, true)]
#[case(ExecutionMode::Local, false)]
#[case(ExecutionMode::Remote, false)]
#[case(ExecutionMode::KubernetesNativeSession, false)]
#[case(ExecutionMode::KubernetesNativeApplication, false)]
fn test_deep_link_by_execution_mode(#[case] mode: ExecutionMode, #[case] has_link: bool) {
    let event = EventBuilder::new()
        .with_mode(mode)
        .with_app_id(Some("application_42_0007"))
        .build();

    let record = builder().build(&event, at_millis(BASE_MILLIS)).unwrap();

    if has_link {
        assert_eq!(
            record.link,
            "http://rm.internal:8088/proxy/application_42_0007/"
        );
    } else {
        assert!(record.link.is_empty());
    }
}

// =============================================================================
// Restart Section
// =============================================================================

#[rstest]
#[case(true, 2, 5, Some(RestartInfo { index: 2, total: 5 }))]
#[case(true, 0, 5, None)]
#[case(false, 3, 5, None)]
fn test_restart_section(
    #[case] need_restart: bool,
    #[case] count: u32,
    #[case] size: u32,
    #[case] expected: Option<RestartInfo>,
) {
    let event = EventBuilder::new()
        .with_restart(need_restart, count, size)
        .build();

    let record = builder().build(&event, at_millis(BASE_MILLIS)).unwrap();
    assert_eq!(record.restart, expected);
}

// =============================================================================
// Malformed Events
// =============================================================================

#[test]
fn test_missing_start_time_is_malformed() {
    let event = EventBuilder::new()
        .with_entity_id(17)
        .with_start_millis(None)
        .build();

    match builder().build(&event, at_millis(BASE_MILLIS)) {
        Err(AlertError::MalformedEvent { entity_id, .. }) => assert_eq!(entity_id, 17),
        other => panic!("expected malformed event, got {:?}", other),
    }
}

#[test]
fn test_end_before_start_is_malformed() {
    let event = EventBuilder::new()
        .with_end_millis(Some(BASE_MILLIS - 1))
        .build();

    assert!(matches!(
        builder().build(&event, at_millis(BASE_MILLIS)),
        Err(AlertError::MalformedEvent { .. })
    ));
}

#[test]
fn test_now_before_start_is_malformed() {
    let event = EventBuilder::new().with_end_millis(None).build();

    assert!(matches!(
        builder().build(&event, at_millis(BASE_MILLIS - 60_000)),
        Err(AlertError::MalformedEvent { .. })
    ));
}
