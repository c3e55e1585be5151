//! Great-circle distance helpers shared by the footpath builder, the
//! shape slicer, and the RAPTOR engine's optional A* pruning.

pub static EARTH_RADIUS_APPROX: f64 = 6_371_000f64;

/// Great-circle distance between two lat/lon points, in metres.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_APPROX * c
}

/// Seconds to walk `distance_meters` at `walk_speed_mps`, rounded up.
pub fn walk_seconds(distance_meters: f64, walk_speed_mps: f64) -> u32 {
    (distance_meters / walk_speed_mps).ceil() as u32
}
