//! The RAPTOR engine (component D, §5): round-based multi-criteria
//! search over a [`TimetableStore`], optimising the Pareto frontier of
//! (arrival time, number of transfers).
//!
//! Grounded on `original_source/backend/raptor_engine.py::run_raptor_worker`,
//! which is already essentially this algorithm; the structuring here
//! (flat per-round arrays, a `RaptorContext` holding shared borrows,
//! `earliest_trip_from` via binary search) follows the teacher's
//! `route.rs` (`RouterContext`, `do_round`, `explore_routes_for_marked_stop`).
//! Unlike the teacher, every round keeps enough state to emit the full
//! Pareto set on (arrival_time, num_transfers) rather than a single
//! cheapest path.

use std::collections::HashMap;

use crate::config::RouterConfig;
use crate::geomath::haversine_meters;
use crate::journey::{Journey, Leg};
use crate::model::{RouteId, StopId, TripId};
use crate::timetable::TimetableStore;

const INFINITY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
enum ParentPointer {
    Transit {
        route: RouteId,
        trip: TripId,
        board_stop: StopId,
        board_time: u32,
    },
    Walk {
        from_stop: StopId,
        departure_time: u32,
    },
}

/// Per-query scratch state. One of these lives on each worker thread;
/// nothing here is shared across queries (§5, "Store is read-only").
struct RaptorScratch {
    /// `arrival[k][stop]`: best known arrival at `stop` using at most
    /// `k` rounds (transit boardings) plus any trailing walk.
    arrival: Vec<Vec<u32>>,
    /// `tau_star[stop]`: best arrival at `stop` across all rounds so
    /// far, used for A* pruning.
    tau_star: Vec<u32>,
    parent: Vec<Vec<Option<ParentPointer>>>,
    rounds: usize,
}

impl RaptorScratch {
    fn new(stop_count: usize, max_rounds: usize) -> Self {
        RaptorScratch {
            arrival: vec![vec![INFINITY; stop_count]; max_rounds + 1],
            tau_star: vec![INFINITY; stop_count],
            parent: vec![vec![None; stop_count]; max_rounds + 1],
            rounds: max_rounds,
        }
    }
}

pub struct RaptorEngine<'a> {
    store: &'a TimetableStore,
    config: &'a RouterConfig,
}

impl<'a> RaptorEngine<'a> {
    pub fn new(store: &'a TimetableStore, config: &'a RouterConfig) -> Self {
        RaptorEngine { store, config }
    }

    /// Runs one RAPTOR search from `origin` at `departure_time`, toward
    /// `target`, returning the Pareto-optimal journeys found (§5).
    pub fn query(&self, origin: StopId, target: StopId, departure_time: u32) -> Vec<Journey> {
        let stop_count = self.store.stop_count();
        let max_rounds = self.config.max_rounds as usize;
        let mut scratch = RaptorScratch::new(stop_count, max_rounds);

        scratch.arrival[0][origin.0] = departure_time;
        scratch.tau_star[origin.0] = departure_time;
        let mut marked = vec![false; stop_count];
        marked[origin.0] = true;
        self.relax_footpaths(&mut scratch, 0, &mut marked, target);

        for k in 1..=max_rounds {
            scratch.arrival[k] = scratch.arrival[k - 1].clone();

            let routes_to_scan = self.routes_touching(&scratch, k, &marked, target);
            let mut newly_marked = vec![false; stop_count];

            for (route_id, earliest_pos) in routes_to_scan {
                self.scan_route(&mut scratch, k, route_id, earliest_pos, target, &mut newly_marked);
            }

            self.relax_footpaths(&mut scratch, k, &mut newly_marked, target);

            if !newly_marked.iter().any(|&m| m) {
                break;
            }
            marked = newly_marked;
        }

        self.collect_pareto_journeys(&scratch, origin, target)
    }

    /// Same as [`RaptorEngine::query`], but takes external stop ids and
    /// resolves them against the store. An unresolved id yields an
    /// empty journey set rather than an error (§6, §7) — there's no
    /// journey to report for a stop that isn't in the timetable.
    pub fn query_by_id(&self, origin_id: &str, target_id: &str, departure_time: u32) -> Vec<Journey> {
        let (Some(origin), Some(target)) = (self.store.stop_id(origin_id), self.store.stop_id(target_id)) else {
            return Vec::new();
        };
        self.query(origin, target, departure_time)
    }

    /// For every marked stop, the earliest position at which it
    /// appears along each route serving it — routes are only scanned
    /// from the first marked stop onward (§4.4.2 step 1). A marked
    /// stop is skipped entirely when the optional A* lower bound
    /// proves it cannot improve `τ*[target]` (§4.4.4) — distinct from,
    /// and independent of, the mandatory relax-arrivals check applied
    /// later in `scan_route`.
    fn routes_touching(
        &self,
        scratch: &RaptorScratch,
        k: usize,
        marked: &[bool],
        target: StopId,
    ) -> Vec<(RouteId, usize)> {
        let mut earliest: HashMap<RouteId, usize> = HashMap::new();
        for (stop_idx, &is_marked) in marked.iter().enumerate() {
            if !is_marked {
                continue;
            }
            let stop = StopId(stop_idx);
            if self.pruned_by_lower_bound(scratch, k, stop, target) {
                continue;
            }
            for &(route_id, pos) in self.store.routes_serving(stop) {
                earliest
                    .entry(route_id)
                    .and_modify(|existing| *existing = (*existing).min(pos))
                    .or_insert(pos);
            }
        }
        earliest.into_iter().collect()
    }

    /// §4.4.4's optional A* lower bound: true if `stop` provably
    /// cannot improve the best known target arrival, so route
    /// collection can skip it. Disabled entirely when
    /// `config.astar_max_speed_mps` is `None`.
    fn pruned_by_lower_bound(&self, scratch: &RaptorScratch, k: usize, stop: StopId, target: StopId) -> bool {
        let Some(max_speed) = self.config.astar_max_speed_mps else {
            return false;
        };
        let best_target = scratch.tau_star[target.0];
        if best_target == INFINITY {
            return false;
        }
        let curr_arrival = scratch.arrival[k - 1][stop.0];
        if curr_arrival == INFINITY {
            return false;
        }
        let distance = haversine_meters(
            self.store.stop(stop).lat,
            self.store.stop(stop).lon,
            self.store.stop(target).lat,
            self.store.stop(target).lon,
        );
        let lower_bound_seconds = (distance / max_speed).floor() as u32;
        curr_arrival.saturating_add(lower_bound_seconds) >= best_target
    }

    fn scan_route(
        &self,
        scratch: &mut RaptorScratch,
        k: usize,
        route_id: RouteId,
        earliest_pos: usize,
        target: StopId,
        newly_marked: &mut [bool],
    ) {
        let route = self.store.route(route_id);
        let mut boarded: Option<(TripId, usize, StopId, usize, u32)> = None; // trip, trip_index, board_stop, board_pos, board_time

        for pos in earliest_pos..route.stops.len() {
            let stop = route.stops[pos];

            if let Some((trip_id, _trip_index, board_stop, _board_pos, board_time)) = boarded {
                let trip = self.store.trip(trip_id);
                let candidate_arrival = trip.arrival[pos];
                // Mandatory check (§4.4.2 step 2.1): relax only if this
                // beats both the stop's own best-so-far and the best
                // known target arrival. Applies regardless of whether
                // the optional A* bound (§4.4.4) is enabled.
                if candidate_arrival < scratch.arrival[k][stop.0].min(scratch.tau_star[target.0]) {
                    scratch.arrival[k][stop.0] = candidate_arrival;
                    scratch.tau_star[stop.0] = scratch.tau_star[stop.0].min(candidate_arrival);
                    scratch.parent[k][stop.0] = Some(ParentPointer::Transit {
                        route: route_id,
                        trip: trip_id,
                        board_stop,
                        board_time,
                    });
                    newly_marked[stop.0] = true;
                }
            }

            // Can we catch an earlier (or first) trip at this stop using
            // the previous round's arrival time? Trips are sorted, so
            // re-boarding only ever helps when the stop was reachable
            // earlier than whatever trip we're already on.
            let prior_arrival = scratch.arrival[k - 1][stop.0];
            if prior_arrival == INFINITY {
                continue;
            }
            let boardable_from = if k > 1 {
                prior_arrival.saturating_add(self.config.transfer_buffer_seconds)
            } else {
                prior_arrival
            };
            let should_try_board = match boarded {
                None => true,
                Some((trip_id, ..)) => boardable_from < self.store.trip(trip_id).departure[pos],
            };
            if should_try_board {
                if let Some((trip_id, trip_index)) =
                    self.earliest_trip_from(route_id, pos, boardable_from)
                {
                    let better = match boarded {
                        None => true,
                        Some((_, existing_index, ..)) => trip_index < existing_index,
                    };
                    if better {
                        boarded = Some((
                            trip_id,
                            trip_index,
                            stop,
                            pos,
                            self.store.trip(trip_id).departure[pos],
                        ));
                    }
                }
            }
        }
    }

    /// Binary search over the route's departure column at `pos` for the
    /// first trip departing at or after `earliest_departure`. Relies on
    /// the no-overtaking invariant: a route's trips keep the same
    /// relative order at every stop, so the column is sorted (§3, §9).
    fn earliest_trip_from(
        &self,
        route_id: RouteId,
        pos: usize,
        earliest_departure: u32,
    ) -> Option<(TripId, usize)> {
        let column = self.store.departure_column(route_id, pos);
        let idx = column.partition_point(|&departure| departure < earliest_departure);
        if idx >= column.len() {
            return None;
        }
        let trip_id = self.store.route(route_id).trips[idx];
        Some((trip_id, idx))
    }

    fn relax_footpaths(&self, scratch: &mut RaptorScratch, k: usize, marked: &mut [bool], target: StopId) {
        let touched: Vec<StopId> = marked
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m)
            .map(|(i, _)| StopId(i))
            .collect();

        for stop in touched {
            let base_arrival = scratch.arrival[k][stop.0];
            if base_arrival == INFINITY {
                continue;
            }
            for footpath in self.store.footpaths_from(stop) {
                let candidate = base_arrival.saturating_add(footpath.duration_seconds);
                // Mandatory check (§4.4.2 step 3), same form as the
                // transit relax in `scan_route`.
                if candidate < scratch.arrival[k][footpath.to.0].min(scratch.tau_star[target.0]) {
                    scratch.arrival[k][footpath.to.0] = candidate;
                    scratch.tau_star[footpath.to.0] = scratch.tau_star[footpath.to.0].min(candidate);
                    scratch.parent[k][footpath.to.0] = Some(ParentPointer::Walk {
                        from_stop: stop,
                        departure_time: base_arrival,
                    });
                    marked[footpath.to.0] = true;
                }
            }
        }
    }

    /// Walks every round's arrival at `target`, keeping only the rounds
    /// that strictly improve on the previous round (those are the
    /// Pareto-optimal (arrival, transfers) pairs — a later round that
    /// doesn't improve arrival time is dominated, §5).
    fn collect_pareto_journeys(
        &self,
        scratch: &RaptorScratch,
        origin: StopId,
        target: StopId,
    ) -> Vec<Journey> {
        let mut journeys = Vec::new();
        let mut best_so_far = INFINITY;

        for k in 0..=scratch.rounds {
            let arrival = scratch.arrival[k][target.0];
            if arrival == INFINITY || arrival >= best_so_far {
                continue;
            }
            best_so_far = arrival;
            if let Some(journey) = self.reconstruct(scratch, k, origin, target) {
                journeys.push(journey);
            }
        }
        journeys
    }

    fn reconstruct(
        &self,
        scratch: &RaptorScratch,
        k: usize,
        origin: StopId,
        target: StopId,
    ) -> Option<Journey> {
        let mut legs = Vec::new();
        let mut round = k;
        let mut stop = target;

        while stop != origin {
            let pointer = scratch.parent[round][stop.0]?;
            match pointer {
                ParentPointer::Transit {
                    route,
                    trip,
                    board_stop,
                    board_time,
                    ..
                } => {
                    let trip_data = self.store.trip(trip);
                    let route_data = self.store.route(route);
                    legs.push(Leg::Transit {
                        trip_id: trip_data.external_id.clone(),
                        route_id: route_data.feed_route_id.clone(),
                        route_name: route_data.display_name().to_string(),
                        agency_id: route_data.agency_id.clone(),
                        from_stop_id: self.store.stop(board_stop).external_id.clone(),
                        to_stop_id: self.store.stop(stop).external_id.clone(),
                        departure_time: board_time,
                        arrival_time: scratch.arrival[round][stop.0],
                        shape_id: trip_data.shape_id.clone(),
                    });
                    stop = board_stop;
                    if round > 0 {
                        round -= 1;
                    }
                }
                ParentPointer::Walk { from_stop, departure_time } => {
                    legs.push(Leg::Walk {
                        from_stop_id: self.store.stop(from_stop).external_id.clone(),
                        to_stop_id: self.store.stop(stop).external_id.clone(),
                        departure_time,
                        arrival_time: scratch.arrival[round][stop.0],
                    });
                    stop = from_stop;
                }
            }
        }

        if legs.is_empty() {
            return None;
        }
        legs.reverse();

        let num_transfers = legs
            .iter()
            .filter(|leg| matches!(leg, Leg::Transit { .. }))
            .count()
            .saturating_sub(1) as u32;

        Some(Journey {
            departure_time: legs.first().map(Leg::departure_time).unwrap_or(0),
            arrival_time: legs.last().map(Leg::arrival_time).unwrap_or(0),
            num_transfers,
            legs,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Footpath;
    use crate::timetable::TimetableBuilder;

    fn simple_store() -> TimetableStore {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
        let b = builder.add_stop("B".into(), "B".into(), 0.0, 0.01);
        let c = builder.add_stop("C".into(), "C".into(), 0.0, 0.02);
        let route = builder.add_route("R1".into(), Some("1".into()), None, None, vec![a, b, c]);
        builder.add_trip(route, "T1".into(), None, vec![0, 100, 300], vec![0, 110, 300]);
        let mut store = builder.build();
        store.set_footpaths(vec![Vec::new(), Vec::new(), Vec::new()]);
        store
    }

    #[test]
    fn single_leg_journey_found() {
        let store = simple_store();
        let config = RouterConfig::default();
        let engine = RaptorEngine::new(&store, &config);
        let journeys = engine.query(StopId(0), StopId(2), 0);
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].arrival_time, 300);
        assert_eq!(journeys[0].num_transfers, 0);
        assert_eq!(journeys[0].legs.len(), 1);
    }

    #[test]
    fn unreachable_target_yields_no_journeys() {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
        let b = builder.add_stop("B".into(), "B".into(), 1.0, 1.0);
        let store = {
            let mut s = builder.build();
            s.set_footpaths(vec![Vec::new(), Vec::new()]);
            s
        };
        let config = RouterConfig::default();
        let engine = RaptorEngine::new(&store, &config);
        let journeys = engine.query(a, b, 0);
        assert!(journeys.is_empty());
    }

    #[test]
    fn mandatory_pruning_applies_with_astar_disabled() {
        let store = simple_store();
        let config = RouterConfig {
            astar_max_speed_mps: None,
            ..RouterConfig::default()
        };
        let engine = RaptorEngine::new(&store, &config);
        let journeys = engine.query(StopId(0), StopId(2), 0);
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].arrival_time, 300);
    }

    #[test]
    fn walk_only_journey_uses_footpath() {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop("A".into(), "A".into(), 0.0, 0.0);
        let b = builder.add_stop("B".into(), "B".into(), 0.0, 0.001);
        let mut store = builder.build();
        store.set_footpaths(vec![
            vec![Footpath { to: b, duration_seconds: 60 }],
            vec![Footpath { to: a, duration_seconds: 60 }],
        ]);
        let config = RouterConfig::default();
        let engine = RaptorEngine::new(&store, &config);
        let journeys = engine.query(a, b, 1000);
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].arrival_time, 1060);
        assert!(matches!(journeys[0].legs[0], Leg::Walk { .. }));
    }
}
