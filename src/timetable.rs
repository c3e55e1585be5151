//! The Timetable Store (component A, §3): an immutable, contiguous
//! representation of stops, trips, routes, and footpaths, plus the
//! derived indices the RAPTOR engine binary-searches against.
//!
//! Built once by [`crate::feed::FeedLoader`] and [`crate::footpath`],
//! then handed out read-only behind an `Arc` for the lifetime of a
//! router (§5). There is no in-place mutation after construction; a
//! new snapshot is built and the `Arc` swapped to replace one.

use std::collections::HashMap;

use crate::model::{Footpath, Route, RouteId, Shape, Stop, StopId, Trip, TripId};

#[derive(Debug, Clone, Default)]
pub struct TimetableStore {
    stops: Vec<Stop>,
    stop_index: HashMap<String, StopId>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    /// `stop_routes[stop.0]` = the (route, position-in-route) pairs
    /// serving that stop. A stop that appears at several positions of
    /// one route gets one entry per appearance (§3).
    stop_routes: Vec<Vec<(RouteId, usize)>>,
    /// `footpaths[stop.0]` = outgoing walk edges from that stop.
    footpaths: Vec<Vec<Footpath>>,
    /// `departure_columns[route.0][pos]` = departure times of
    /// `route.trips`, at that position, in the same (ascending) order
    /// as `route.trips` — the dense column the engine binary-searches
    /// (§3 "Derived indices"), built the same way the teacher's
    /// `_build_trip_times_cache` builds `route_stop_times_cache`.
    departure_columns: Vec<Vec<Vec<u32>>>,
    shapes: HashMap<String, Shape>,
}

impl TimetableStore {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.0]
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn route(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn trip(&self, id: TripId) -> &Trip {
        &self.trips[id.0]
    }

    pub fn stop_id(&self, external_id: &str) -> Option<StopId> {
        self.stop_index.get(external_id).copied()
    }

    pub fn routes_serving(&self, stop: StopId) -> &[(RouteId, usize)] {
        &self.stop_routes[stop.0]
    }

    pub fn footpaths_from(&self, stop: StopId) -> &[Footpath] {
        &self.footpaths[stop.0]
    }

    /// Sorted departure times of `route` at stop-position `pos`,
    /// parallel to `route.trips`.
    pub fn departure_column(&self, route: RouteId, pos: usize) -> &[u32] {
        &self.departure_columns[route.0][pos]
    }

    pub fn shape(&self, shape_id: &str) -> Option<&Shape> {
        self.shapes.get(shape_id)
    }
}

/// Builds a [`TimetableStore`] from already-clustered routes and
/// trips. [`crate::feed::FeedLoader`] produces these; this type just
/// freezes them into the derived indices.
pub struct TimetableBuilder {
    stops: Vec<Stop>,
    stop_index: HashMap<String, StopId>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    shapes: HashMap<String, Shape>,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        TimetableBuilder {
            stops: Vec::new(),
            stop_index: HashMap::new(),
            routes: Vec::new(),
            trips: Vec::new(),
            shapes: HashMap::new(),
        }
    }

    pub fn add_stop(&mut self, external_id: String, name: String, lat: f64, lon: f64) -> StopId {
        if let Some(&id) = self.stop_index.get(&external_id) {
            return id;
        }
        let id = StopId(self.stops.len());
        self.stops.push(Stop {
            id,
            external_id: external_id.clone(),
            name,
            lat,
            lon,
        });
        self.stop_index.insert(external_id, id);
        id
    }

    pub fn add_route(
        &mut self,
        feed_route_id: String,
        short_name: Option<String>,
        long_name: Option<String>,
        agency_id: Option<String>,
        stops: Vec<StopId>,
    ) -> RouteId {
        let id = RouteId(self.routes.len());
        self.routes.push(Route {
            id,
            feed_route_id,
            short_name,
            long_name,
            agency_id,
            stops,
            trips: Vec::new(),
        });
        id
    }

    pub fn add_trip(
        &mut self,
        route: RouteId,
        external_id: String,
        shape_id: Option<String>,
        arrival: Vec<u32>,
        departure: Vec<u32>,
    ) -> TripId {
        let id = TripId(self.trips.len());
        self.trips.push(Trip {
            id,
            route,
            external_id,
            shape_id,
            arrival,
            departure,
        });
        self.routes[route.0].trips.push(id);
        id
    }

    pub fn add_shape(&mut self, shape_id: String, points: Shape) {
        self.shapes.insert(shape_id, points);
    }

    pub fn stop_id(&self, external_id: &str) -> Option<StopId> {
        self.stop_index.get(external_id).copied()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Freezes the builder into a [`TimetableStore`], computing the
    /// derived stop->routes index and the per-route departure
    /// columns. Footpaths, if any were attached via
    /// [`TimetableBuilder::set_footpaths`], are carried through;
    /// otherwise every stop starts with none (the footpath builder
    /// runs as a separate pass, §4.2).
    pub fn build(self) -> TimetableStore {
        #[cfg(feature = "enforce_invariants")]
        for route in &self.routes {
            for pos in 0..route.stops.len() {
                let departures: Vec<u32> = route
                    .trips
                    .iter()
                    .map(|&trip_id| self.trips[trip_id.0].departure[pos])
                    .collect();
                assert!(
                    departures.windows(2).all(|w| w[0] <= w[1]),
                    "route {} violates no-overtaking at position {pos}",
                    route.feed_route_id
                );
            }
        }

        let mut stop_routes: Vec<Vec<(RouteId, usize)>> = vec![Vec::new(); self.stops.len()];
        for route in &self.routes {
            for (pos, &stop) in route.stops.iter().enumerate() {
                stop_routes[stop.0].push((route.id, pos));
            }
        }

        let departure_columns: Vec<Vec<Vec<u32>>> = self
            .routes
            .iter()
            .map(|route| {
                (0..route.stops.len())
                    .map(|pos| {
                        route
                            .trips
                            .iter()
                            .map(|&trip_id| self.trips[trip_id.0].departure[pos])
                            .collect()
                    })
                    .collect()
            })
            .collect();

        TimetableStore {
            stops: self.stops,
            stop_index: self.stop_index,
            routes: self.routes,
            trips: self.trips,
            stop_routes,
            footpaths: vec![Vec::new(); 0],
            departure_columns,
            shapes: self.shapes,
        }
        .with_footpath_slots()
    }
}

impl Default for TimetableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableStore {
    fn with_footpath_slots(mut self) -> Self {
        self.footpaths = vec![Vec::new(); self.stops.len()];
        self
    }

    /// Attaches footpaths computed by [`crate::footpath::build_footpaths`].
    /// Only ever called once, between freezing the store and handing it
    /// out to queries — still immutable from the router's perspective.
    pub fn set_footpaths(&mut self, footpaths: Vec<Vec<Footpath>>) {
        assert_eq!(footpaths.len(), self.stops.len());
        self.footpaths = footpaths;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_computes_stop_routes_and_departure_columns() {
        let mut builder = TimetableBuilder::new();
        let a = builder.add_stop("A".into(), "Stop A".into(), 0.0, 0.0);
        let b = builder.add_stop("B".into(), "Stop B".into(), 0.0, 0.1);
        let route = builder.add_route("R1".into(), Some("1".into()), None, None, vec![a, b]);
        builder.add_trip(route, "T1".into(), None, vec![100, 200], vec![100, 200]);
        builder.add_trip(route, "T2".into(), None, vec![300, 400], vec![300, 400]);

        let store = builder.build();
        assert_eq!(store.routes_serving(a), &[(route, 0)]);
        assert_eq!(store.routes_serving(b), &[(route, 1)]);
        assert_eq!(store.departure_column(route, 0), &[100, 300]);
        assert_eq!(store.departure_column(route, 1), &[200, 400]);
    }
}
