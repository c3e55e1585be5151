//! Footpath Builder (component C, §4.2): derives walking connections
//! between nearby stops with a uniform spatial grid instead of the
//! teacher's rstar index, since the access pattern here is a one-shot
//! batch build rather than repeated nearest-neighbour queries.
//!
//! Grounded on `original_source/backend/raptor_engine.py::load_all_data`'s
//! grid-bucketing pass: stops are bucketed into cells sized so that the
//! footpath radius always fits within a 3x3 neighbourhood, then every
//! stop scans its own cell plus the 8 neighbours for candidates.

use std::collections::HashMap;

use crate::config::RouterConfig;
use crate::geomath::{haversine_meters, walk_seconds};
use crate::model::{Footpath, Stop, StopId};

/// Degrees per metre of latitude, used to size grid cells. Longitude
/// cell width is widened by `1 / cos(lat)` per-stop when scanning,
/// since a degree of longitude shrinks away from the equator.
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

fn cell_of(lat: f64, lon: f64, cell_size_deg: f64) -> (i64, i64) {
    ((lat / cell_size_deg).floor() as i64, (lon / cell_size_deg).floor() as i64)
}

/// Builds symmetric footpaths between every pair of stops within
/// `config.footpath_radius_m` of each other. A stop never gets a
/// footpath to itself.
pub fn build_footpaths(stops: &[Stop], config: &RouterConfig) -> Vec<Vec<Footpath>> {
    let cell_size_deg = config.footpath_radius_m / METERS_PER_DEGREE_LAT;
    let mut grid: HashMap<(i64, i64), Vec<StopId>> = HashMap::new();
    for stop in stops {
        grid.entry(cell_of(stop.lat, stop.lon, cell_size_deg))
            .or_default()
            .push(stop.id);
    }

    let mut footpaths: Vec<Vec<Footpath>> = vec![Vec::new(); stops.len()];
    for stop in stops {
        let (cx, cy) = cell_of(stop.lat, stop.lon, cell_size_deg);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(candidates) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &other_id in candidates {
                    if other_id == stop.id {
                        continue;
                    }
                    let other = &stops[other_id.0];
                    let distance = haversine_meters(stop.lat, stop.lon, other.lat, other.lon);
                    if distance <= config.footpath_radius_m {
                        footpaths[stop.id.0].push(Footpath {
                            to: other_id,
                            duration_seconds: walk_seconds(distance, config.walk_speed_mps),
                        });
                    }
                }
            }
        }
    }
    footpaths
}

#[cfg(test)]
mod test {
    use super::*;

    fn stop(id: usize, lat: f64, lon: f64) -> Stop {
        Stop {
            id: StopId(id),
            external_id: format!("S{id}"),
            name: format!("Stop {id}"),
            lat,
            lon,
        }
    }

    #[test]
    fn connects_nearby_stops_symmetrically() {
        let stops = vec![stop(0, 47.6062, -122.3321), stop(1, 47.6065, -122.3321)];
        let config = RouterConfig::default();
        let footpaths = build_footpaths(&stops, &config);

        assert_eq!(footpaths[0].len(), 1);
        assert_eq!(footpaths[0][0].to, StopId(1));
        assert_eq!(footpaths[1].len(), 1);
        assert_eq!(footpaths[1][0].to, StopId(0));
        assert_eq!(footpaths[0][0].duration_seconds, footpaths[1][0].duration_seconds);
    }

    #[test]
    fn excludes_stops_beyond_radius() {
        let stops = vec![stop(0, 47.6062, -122.3321), stop(1, 48.0, -121.0)];
        let config = RouterConfig::default();
        let footpaths = build_footpaths(&stops, &config);
        assert!(footpaths[0].is_empty());
        assert!(footpaths[1].is_empty());
    }

    #[test]
    fn no_self_footpath() {
        let stops = vec![stop(0, 47.6062, -122.3321)];
        let config = RouterConfig::default();
        let footpaths = build_footpaths(&stops, &config);
        assert!(footpaths[0].is_empty());
    }
}
