//! Journey result wire types (§6), serialised the way the teacher's
//! `api::response::FareboxResponse` is: plain serde derives, field
//! names matching what a client actually needs, no internal ids that
//! aren't also externally meaningful.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Leg {
    Transit {
        trip_id: String,
        route_id: String,
        route_name: String,
        agency_id: Option<String>,
        from_stop_id: String,
        to_stop_id: String,
        departure_time: u32,
        arrival_time: u32,
        shape_id: Option<String>,
    },
    Walk {
        from_stop_id: String,
        to_stop_id: String,
        departure_time: u32,
        arrival_time: u32,
    },
}

impl Leg {
    pub fn departure_time(&self) -> u32 {
        match self {
            Leg::Transit { departure_time, .. } => *departure_time,
            Leg::Walk { departure_time, .. } => *departure_time,
        }
    }

    pub fn arrival_time(&self) -> u32 {
        match self {
            Leg::Transit { arrival_time, .. } => *arrival_time,
            Leg::Walk { arrival_time, .. } => *arrival_time,
        }
    }
}

/// One Pareto-optimal itinerary: a sequence of legs with a known
/// arrival time and transfer count, the two criteria RAPTOR optimises
/// over (§3, §5).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journey {
    pub departure_time: u32,
    pub arrival_time: u32,
    pub num_transfers: u32,
    pub legs: Vec<Leg>,
}

impl Journey {
    /// The `(first_leg_departure, arrival_time, leg_trip_ids)` tuple
    /// the range query driver dedups on (§4.4), since two distinct
    /// departure-instant candidates can produce the same itinerary.
    pub fn dedup_signature(&self) -> (u32, u32, Vec<Option<String>>) {
        let trip_ids = self
            .legs
            .iter()
            .map(|leg| match leg {
                Leg::Transit { trip_id, .. } => Some(trip_id.clone()),
                Leg::Walk { .. } => None,
            })
            .collect();
        (self.departure_time, self.arrival_time, trip_ids)
    }
}
