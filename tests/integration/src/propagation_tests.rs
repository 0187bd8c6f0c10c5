//! Multi-station propagation tests
//!
//! Stations exchange their outbound records directly, standing in for the
//! radio transport.

use crate::test_utils::*;
use ultrarf_mesh::{RejectReason, RouteAnnouncement, RouteMetric, RouteUpdateResult};

#[test]
fn test_three_station_chain_learns_far_end() {
    init_tracing();
    let stations = chain(3, 0.9);
    let (a, b, c) = (&stations[0], &stations[1], &stations[2]);

    let results = relay(b, c);

    let route = c.find_route(a.node_id()).expect("C learns A through B");
    assert_eq!(route.next_hop, b.node_id());
    assert_eq!(route.hop_count, 2);
    // B's record for C comes back as a route to self
    assert!(results.contains(&RouteUpdateResult::Rejected(RejectReason::RouteToSelf)));
    assert!(c.find_route(c.node_id()).is_none());
}

#[test]
fn test_relayed_signal_slot_carries_bandwidth() {
    let stations = chain(3, 0.3);
    let (b, c) = (&stations[1], &stations[2]);

    let records = b.get_route_announcements();
    assert!(records.iter().all(|r| (r.signal_strength - 15.0).abs() < 1e-9));

    relay(b, c);

    // 15.0 taken as signal strength classifies as excellent at any depth
    let route = c.find_route("N0").unwrap();
    assert_eq!(route.metric, RouteMetric::Excellent);
}

#[test]
fn test_hop_limit_bounds_chain_reach() {
    let stations = chain(7, 0.9);
    for _ in 0..stations.len() {
        gossip_round(&stations);
    }

    let tail = &stations[6];
    let route = tail.find_route("N1").expect("five hops is within reach");
    assert_eq!(route.hop_count, 5);
    assert_eq!(route.next_hop, "N5");
    assert!(tail.find_route("N0").is_none());

    for route in tail.routes() {
        assert!(route.hop_count <= tail.config().max_hop_count);
        assert_ne!(route.destination, tail.node_id());
        assert_eq!(route.next_hop, "N5");
    }
    assert_eq!(tail.routes().len(), 5);
}

#[test]
fn test_converged_chain_uses_shortest_paths() {
    let stations = chain(5, 0.9);
    for _ in 0..3 {
        gossip_round(&stations);
    }

    for (i, station) in stations.iter().enumerate() {
        for (j, other) in stations.iter().enumerate() {
            if i == j {
                continue;
            }
            let route = station
                .find_route(other.node_id())
                .unwrap_or_else(|| panic!("N{} has no route to N{}", i, j));
            assert_eq!(route.hop_count as usize, i.abs_diff(j));
            let expected_next = if j > i { i + 1 } else { i - 1 };
            assert_eq!(route.next_hop, format!("N{}", expected_next));
        }
    }
}

#[test]
fn test_link_failure_drops_relayed_routes() {
    let stations = chain(3, 0.9);
    gossip_round(&stations);
    let c = &stations[2];
    assert_eq!(c.routes().len(), 2);

    let dropped = c.remove_neighbor("N1");

    assert_eq!(dropped, 2);
    assert!(c.routes().is_empty());
    assert!(c.neighbors().is_empty());
    assert!(c.get_node("N1").is_none());
}

#[test]
fn test_alternate_path_after_link_failure() {
    let stations = chain(3, 0.9);
    gossip_round(&stations);
    let c = &stations[2];
    c.remove_neighbor("N1");

    // A fresh report through another relay restores reachability
    let results = c.process_route_announcement("relay-X", &[RouteAnnouncement::new("N0", 2, 0.9)]);

    assert_eq!(results, vec![RouteUpdateResult::NewRoute]);
    assert_eq!(c.get_next_hop("N0").as_deref(), Some("relay-X"));
    assert_eq!(c.find_route("N0").unwrap().hop_count, 3);
}
