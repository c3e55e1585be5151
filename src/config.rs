//! Tunables for the footpath builder, the RAPTOR engine, and the range
//! query driver. Centralised here instead of threaded through function
//! arguments one at a time, the way `Router::route` does it in the
//! teacher codebase, since the surface has grown past a handful of
//! `Option<T>` parameters.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    /// Upper bound on transit trips per journey (k in 0..=max_rounds).
    pub max_rounds: u32,
    /// Minimum dwell enforced between an arrival and the next boarding,
    /// applied for every round after the first transit hop.
    pub transfer_buffer_seconds: u32,
    /// Walking speed used to convert footpath distance into duration.
    pub walk_speed_mps: f64,
    /// Maximum walking radius considered when building footpaths.
    pub footpath_radius_m: f64,
    /// Cap on the number of distinct departure instants a range query
    /// will dispatch to the engine.
    pub range_candidates_max: usize,
    /// Upper-bound speed used for the optional A* admissible heuristic.
    /// `None` disables the pruning pass entirely.
    pub astar_max_speed_mps: Option<f64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            max_rounds: 8,
            transfer_buffer_seconds: 120,
            walk_speed_mps: 1.1,
            footpath_radius_m: 200.0,
            range_candidates_max: 100,
            astar_max_speed_mps: Some(36.0),
        }
    }
}

impl RouterConfig {
    /// Spec default for unusually deep networks, where 8 transfers is
    /// too tight a bound.
    pub fn with_deep_transfers() -> Self {
        RouterConfig {
            max_rounds: 30,
            ..RouterConfig::default()
        }
    }
}
