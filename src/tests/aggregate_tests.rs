// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::aggregate::{aggregate, Aggregate};
use crate::event::DispenseEvent;
use crate::storage::ring::EventRing;
use crate::types::id::{MachineId, ProductId};
use std::vec::Vec;

const MACHINE: MachineId = MachineId(42);

fn ring_with(events: &[(u32, u8)], capacity: usize) -> EventRing {
    let mut ring = EventRing::with_capacity(capacity).unwrap();
    for &(ts, product) in events {
        ring.push(DispenseEvent::new(ts, MACHINE, ProductId(product)));
    }
    ring
}

#[test]
fn test_window_is_inclusive_on_both_ends() {
    let ring = ring_with(&[(900, 1), (1500, 2), (1999, 3), (2500, 4)], 10);
    let agg = aggregate(&ring, MACHINE, 1000, 2000);

    assert_eq!(agg.total_events, 2);
    assert_eq!(agg.count(ProductId(2)), 1);
    assert_eq!(agg.count(ProductId(3)), 1);
    assert_eq!(agg.count(ProductId(1)), 0);
    assert_eq!(agg.count(ProductId(4)), 0);

    let edges = ring_with(&[(1000, 5), (2000, 5)], 10);
    assert_eq!(aggregate(&edges, MACHINE, 1000, 2000).total_events, 2);
}

#[test]
fn test_evicted_events_are_not_counted() {
    // Every timestamp is inside the window, but only the last three survive.
    let ring = ring_with(&[(10, 1), (11, 1), (12, 2), (13, 2), (14, 3)], 3);
    let agg = aggregate(&ring, MACHINE, 0, 100);

    assert_eq!(agg.total_events, 3);
    assert_eq!(agg.count(ProductId(1)), 0);
    assert_eq!(agg.count(ProductId(2)), 2);
    assert_eq!(agg.count(ProductId(3)), 1);
}

#[test]
fn test_aggregate_metadata() {
    let ring = ring_with(&[(5, 9)], 4);
    let agg = aggregate(&ring, MACHINE, 1, 7);
    assert_eq!(agg.machine_id, MACHINE);
    assert_eq!(agg.period_start, 1);
    assert_eq!(agg.period_end, 7);
    assert_eq!(agg.product_counts[0], 0);
}

#[test]
fn test_empty_window() {
    let ring = ring_with(&[(5, 1), (6, 2)], 4);
    let agg = aggregate(&ring, MACHINE, 100, 200);
    assert!(agg.is_empty());
    assert_eq!(agg, Aggregate::empty(MACHINE, 100, 200));
    assert_eq!(agg.products().count(), 0);
}

#[test]
fn test_products_lists_nonzero_in_id_order() {
    let ring = ring_with(&[(1, 200), (2, 3), (3, 200), (4, 255), (5, 3), (6, 3)], 10);
    let agg = aggregate(&ring, MACHINE, 0, 10);

    let listed: Vec<(u8, u32)> = agg.products().map(|(p, c)| (p.0, c)).collect();
    assert_eq!(listed, vec![(3, 3), (200, 2), (255, 1)]);
    assert_eq!(agg.total_events, 6);
}
