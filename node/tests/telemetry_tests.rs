// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
mod common;

use common::{sync_config, tracker_with, MACHINE};
use consumption_node::telemetry::{init_telemetry, render_metrics};

#[test]
fn test_tracker_activity_shows_up_in_rendered_metrics() {
    init_telemetry();
    let (_platform, tracker) = tracker_with(sync_config(10, 60));
    tracker.report_dispense(MACHINE, 1).unwrap();
    tracker.report_dispense(MACHINE, 2).unwrap();
    tracker.report_fault(0x0042);
    tracker.flush().unwrap();

    let text = render_metrics();
    assert!(text.contains("consumption_events_total 2"), "{}", text);
    assert!(text.contains("consumption_faults_total 1"), "{}", text);
    assert!(text.contains("consumption_flush_total 1"), "{}", text);
    assert!(text.contains("consumption_buffered_events 2"), "{}", text);
}
