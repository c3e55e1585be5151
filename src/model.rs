//! Core entities of the merged timetable (§3). These are plain,
//! immutable value types; the [`crate::timetable::TimetableStore`]
//! owns them in contiguous `Vec`s and hands out indices, the way the
//! teacher's `raptor::timetable` module does, minus the
//! flatbuffer/mmap machinery that existed there to support an
//! on-disk backend this crate doesn't have (see DESIGN.md).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StopId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripId(pub usize);

/// A boarding location with fixed coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    /// Agency-qualified identifier, e.g. `"OP:12345"`.
    pub external_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// A walk edge between two stops with a fixed duration. Stored
/// directionally; the footpath builder is responsible for emitting
/// both directions (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footpath {
    pub to: StopId,
    pub duration_seconds: u32,
}

/// A routing-route: a maximal set of trips sharing an identical stop
/// sequence. Distinct from a feed-route, which is a marketing label
/// that may cover several of these (§9, "Route/trip dual meaning").
#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    /// The feed-route this routing-route was clustered from.
    pub feed_route_id: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub agency_id: Option<String>,
    /// Stop sequence, length >= 2.
    pub stops: Vec<StopId>,
    /// Trip ids, sorted by `departure_time[0]` ascending.
    pub trips: Vec<TripId>,
}

impl Route {
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.feed_route_id)
    }
}

/// A concrete timetabled vehicle run belonging to exactly one route.
/// `arrival[pos]`/`departure[pos]` line up with `route.stops[pos]`.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: TripId,
    pub route: RouteId,
    pub external_id: String,
    pub shape_id: Option<String>,
    pub arrival: Vec<u32>,
    pub departure: Vec<u32>,
}

impl Trip {
    pub fn stop_count(&self) -> usize {
        self.arrival.len()
    }

    /// Checks the dwell (`arrival[p] <= departure[p]`) and monotone
    /// (`departure[p] <= arrival[p+1]`) invariants from §3.
    pub fn is_time_monotone(&self) -> bool {
        if self.arrival.len() != self.departure.len() {
            return false;
        }
        for p in 0..self.arrival.len() {
            if self.arrival[p] > self.departure[p] {
                return false;
            }
            if p + 1 < self.arrival.len() && self.departure[p] > self.arrival[p + 1] {
                return false;
            }
        }
        true
    }
}

/// Ordered polyline points describing a vehicle's on-street geometry
/// (lat, lon).
pub type Shape = Vec<(f64, f64)>;
