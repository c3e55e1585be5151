//! Universal properties (§8) that must hold regardless of the
//! specific network under test.

use transit_raptor::config::RouterConfig;
use transit_raptor::footpath::build_footpaths;
use transit_raptor::geomath::{haversine_meters, walk_seconds};
use transit_raptor::journey::Leg;
use transit_raptor::model::{Stop, StopId};
use transit_raptor::raptor::RaptorEngine;
use transit_raptor::timetable::TimetableBuilder;

/// Property 1 — monotone arrival: each leg's arrival is no later than
/// the next leg's departure, and the journey's own `arrival_time`
/// matches the last leg's.
#[test]
fn monotone_arrival_across_legs() {
    let mut builder = TimetableBuilder::new();
    let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
    let x = builder.add_stop("X".into(), "X".into(), 0.0, 0.01);
    let b = builder.add_stop("B".into(), "B".into(), 0.0, 0.02);
    let r1 = builder.add_route("R1".into(), Some("1".into()), None, None, vec![a, x]);
    builder.add_trip(r1, "T1".into(), None, vec![0, 100], vec![0, 100]);
    let r2 = builder.add_route("R2".into(), Some("2".into()), None, None, vec![x, b]);
    builder.add_trip(r2, "T2".into(), None, vec![300, 400], vec![300, 400]);
    let mut store = builder.build();
    store.set_footpaths(vec![Vec::new(), Vec::new(), Vec::new()]);

    let config = RouterConfig::default();
    let journeys = RaptorEngine::new(&store, &config).query(a, b, 0);

    assert_eq!(journeys.len(), 1);
    let journey = &journeys[0];
    for window in journey.legs.windows(2) {
        assert!(window[0].arrival_time() <= window[1].departure_time());
    }
    assert_eq!(journey.arrival_time, journey.legs.last().unwrap().arrival_time());
}

/// Property 3 — Pareto soundness: no journey in the returned set
/// dominates another (strictly better or equal on both criteria, with
/// at least one strict).
#[test]
fn pareto_soundness_no_domination() {
    let mut builder = TimetableBuilder::new();
    let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
    let x = builder.add_stop("X".into(), "X".into(), 0.0, 0.01);
    let b = builder.add_stop("B".into(), "B".into(), 0.0, 0.02);
    let direct = builder.add_route("DIRECT".into(), Some("D".into()), None, None, vec![a, b]);
    builder.add_trip(direct, "TD".into(), None, vec![0, 1000], vec![0, 1000]);
    let leg1 = builder.add_route("L1".into(), Some("L1".into()), None, None, vec![a, x]);
    builder.add_trip(leg1, "T1".into(), None, vec![0, 100], vec![0, 100]);
    let leg2 = builder.add_route("L2".into(), Some("L2".into()), None, None, vec![x, b]);
    builder.add_trip(leg2, "T2".into(), None, vec![300, 500], vec![300, 500]);
    let mut store = builder.build();
    store.set_footpaths(vec![Vec::new(), Vec::new(), Vec::new()]);

    let config = RouterConfig::default();
    let journeys = RaptorEngine::new(&store, &config).query(a, b, 0);

    for i in 0..journeys.len() {
        for j in 0..journeys.len() {
            if i == j {
                continue;
            }
            let dominates = journeys[i].arrival_time <= journeys[j].arrival_time
                && journeys[i].num_transfers <= journeys[j].num_transfers
                && (journeys[i].arrival_time < journeys[j].arrival_time
                    || journeys[i].num_transfers < journeys[j].num_transfers);
            assert!(!dominates, "journey {i} dominates journey {j}: {journeys:?}");
        }
    }
}

/// Property 5 — footpath admissibility: no emitted footpath exceeds
/// the configured radius, and duration matches the haversine formula.
#[test]
fn footpath_admissibility() {
    let stops = vec![
        Stop { id: StopId(0), external_id: "A".into(), name: "A".into(), lat: 47.6062, lon: -122.3321 },
        Stop { id: StopId(1), external_id: "B".into(), name: "B".into(), lat: 47.6065, lon: -122.3321 },
        Stop { id: StopId(2), external_id: "C".into(), name: "C".into(), lat: 48.0, lon: -121.0 },
    ];
    let config = RouterConfig::default();
    let footpaths = build_footpaths(&stops, &config);

    for (from_idx, edges) in footpaths.iter().enumerate() {
        for edge in edges {
            let from = &stops[from_idx];
            let to = &stops[edge.to.0];
            let distance = haversine_meters(from.lat, from.lon, to.lat, to.lon);
            assert!(distance <= config.footpath_radius_m);
            assert_eq!(edge.duration_seconds, walk_seconds(distance, config.walk_speed_mps));
        }
    }
}

/// Property 7 — determinism: identical store and args produce
/// byte-identical (here, value-identical) output across repeated runs.
#[test]
fn determinism_across_repeated_queries() {
    let mut builder = TimetableBuilder::new();
    let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
    let b = builder.add_stop("B".into(), "B".into(), 0.0, 0.01);
    let route = builder.add_route("R1".into(), Some("1".into()), None, None, vec![a, b]);
    builder.add_trip(route, "T1".into(), None, vec![0, 100], vec![0, 100]);
    let mut store = builder.build();
    store.set_footpaths(vec![Vec::new(), Vec::new()]);

    let config = RouterConfig::default();
    let engine = RaptorEngine::new(&store, &config);
    let first = engine.query(a, b, 0);
    let second = engine.query(a, b, 0);
    assert_eq!(first, second);
}

/// Leg helper sanity: a walk leg's departure/arrival accessors line up
/// with its fields (exercises the `Leg` wire type directly).
#[test]
fn walk_leg_accessors() {
    let leg = Leg::Walk {
        from_stop_id: "A".into(),
        to_stop_id: "B".into(),
        departure_time: 10,
        arrival_time: 70,
    };
    assert_eq!(leg.departure_time(), 10);
    assert_eq!(leg.arrival_time(), 70);
}
