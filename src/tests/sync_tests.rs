// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::Config;
use crate::error::KernelError;
use crate::event::DispenseEvent;
use crate::storage::ring::EventRing;
use crate::sync::{SyncDecision, SyncMode, SyncPhase, SyncScheduler};
use crate::types::id::{MachineId, ProductId};

fn enabled_config(interval: u32) -> Config {
    Config {
        machine_id: MachineId(7),
        enable_external_sync: true,
        buffer_capacity: 16,
        aggregation_interval_seconds: interval,
        ..Config::default()
    }
}

fn ring_at(timestamps: &[u32]) -> EventRing {
    let mut ring = EventRing::with_capacity(16).unwrap();
    for &ts in timestamps {
        ring.push(DispenseEvent::new(ts, MachineId(7), ProductId(1)));
    }
    ring
}

#[test]
fn test_disabled_sync_never_starts() {
    let cfg = Config { enable_external_sync: false, ..enabled_config(10) };
    let ring = ring_at(&[1_005]);
    let mut sched = SyncScheduler::new(1_000);

    assert!(!sched.is_due(&cfg, 5_000));
    let decision = sched.begin(&cfg, &ring, 5_000, SyncMode::Forced).unwrap();
    assert!(matches!(decision, SyncDecision::Disabled));
    assert_eq!(sched.phase(), SyncPhase::Idle);
}

#[test]
fn test_periodic_waits_for_interval() {
    let cfg = enabled_config(60);
    let ring = ring_at(&[1_010]);
    let mut sched = SyncScheduler::new(1_000);

    assert!(!sched.is_due(&cfg, 1_059));
    assert!(matches!(
        sched.begin(&cfg, &ring, 1_059, SyncMode::Periodic).unwrap(),
        SyncDecision::NotDue
    ));

    assert!(sched.is_due(&cfg, 1_060));
    assert!(matches!(
        sched.begin(&cfg, &ring, 1_060, SyncMode::Periodic).unwrap(),
        SyncDecision::Ready(_)
    ));
}

#[test]
fn test_clock_behind_watermark_is_not_due() {
    let cfg = enabled_config(60);
    let sched = SyncScheduler::new(10_000);
    assert!(!sched.is_due(&cfg, 9_000));
}

#[test]
fn test_forced_bypasses_interval() {
    let cfg = enabled_config(3_600);
    let ring = ring_at(&[1_001]);
    let mut sched = SyncScheduler::new(1_000);

    match sched.begin(&cfg, &ring, 1_002, SyncMode::Forced).unwrap() {
        SyncDecision::Ready(ticket) => {
            assert_eq!(ticket.aggregate().period_start, 1_000);
            assert_eq!(ticket.aggregate().period_end, 1_002);
            assert_eq!(ticket.aggregate().total_events, 1);
            assert_eq!(ticket.started_at(), 1_002);
        }
        other => panic!("Expected Ready, got {:?}", other),
    }
    assert_eq!(sched.phase(), SyncPhase::InFlight);
}

#[test]
fn test_second_attempt_rejected_while_in_flight() {
    let cfg = enabled_config(0);
    let ring = ring_at(&[1_001]);
    let mut sched = SyncScheduler::new(1_000);

    let ticket = match sched.begin(&cfg, &ring, 1_005, SyncMode::Periodic).unwrap() {
        SyncDecision::Ready(t) => t,
        other => panic!("Expected Ready, got {:?}", other),
    };

    assert!(!sched.is_due(&cfg, 1_006));
    assert_eq!(
        sched.begin(&cfg, &ring, 1_006, SyncMode::Forced).unwrap_err(),
        KernelError::ApiError
    );

    sched.finish(ticket, true);
    assert_eq!(sched.phase(), SyncPhase::Idle);
}

#[test]
fn test_empty_window_returns_to_idle_without_advancing() {
    let cfg = enabled_config(10);
    let ring = ring_at(&[]);
    let mut sched = SyncScheduler::new(1_000);

    assert!(matches!(
        sched.begin(&cfg, &ring, 2_000, SyncMode::Periodic).unwrap(),
        SyncDecision::Empty
    ));
    assert_eq!(sched.phase(), SyncPhase::Idle);
    assert_eq!(sched.last_aggregation(), 1_000);
    assert_eq!(sched.last_sync(), 0);
}

#[test]
fn test_success_advances_watermarks() {
    let cfg = enabled_config(10);
    let ring = ring_at(&[1_001, 1_500]);
    let mut sched = SyncScheduler::new(1_000);

    let ticket = match sched.begin(&cfg, &ring, 2_000, SyncMode::Periodic).unwrap() {
        SyncDecision::Ready(t) => t,
        other => panic!("Expected Ready, got {:?}", other),
    };
    sched.finish(ticket, true);

    assert_eq!(sched.last_sync(), 2_000);
    assert_eq!(sched.last_aggregation(), 2_000);
    assert!(!sched.is_due(&cfg, 2_005));
}

#[test]
fn test_failure_keeps_window_for_retry() {
    let cfg = enabled_config(10);
    let mut ring = ring_at(&[1_001]);
    let mut sched = SyncScheduler::new(1_000);

    let ticket = match sched.begin(&cfg, &ring, 2_000, SyncMode::Periodic).unwrap() {
        SyncDecision::Ready(t) => t,
        other => panic!("Expected Ready, got {:?}", other),
    };
    sched.finish(ticket, false);

    assert_eq!(sched.phase(), SyncPhase::Idle);
    assert_eq!(sched.last_aggregation(), 1_000);
    assert_eq!(sched.last_sync(), 0);

    // Same window plus the newcomer on the next attempt.
    ring.push(DispenseEvent::new(2_050, MachineId(7), ProductId(2)));
    match sched.begin(&cfg, &ring, 2_100, SyncMode::Periodic).unwrap() {
        SyncDecision::Ready(t) => {
            assert_eq!(t.aggregate().period_start, 1_000);
            assert_eq!(t.aggregate().total_events, 2);
        }
        other => panic!("Expected Ready, got {:?}", other),
    }
}
