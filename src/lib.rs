//! A multi-modal public-transit journey-planning engine built around
//! RAPTOR: a round-based algorithm that searches a GTFS-derived
//! timetable for the Pareto-optimal set of journeys on (arrival time,
//! number of transfers).
//!
//! - [`timetable`] holds the immutable [`timetable::TimetableStore`]
//!   that everything else queries against.
//! - [`feed`] builds a store from one or more GTFS feed directories.
//! - [`footpath`] and [`shape`] are the spatial helpers the feed
//!   loader and the engine lean on.
//! - [`raptor`] is the single-query engine; [`range`] fans a query out
//!   across a departure window and merges the results.
//! - [`journey`] is the public result type; [`config`] and [`error`]
//!   round out the ambient stack.

pub mod config;
pub mod error;
pub mod feed;
pub mod footpath;
pub mod geomath;
pub mod journey;
pub mod model;
pub mod raptor;
pub mod range;
pub mod shape;
pub mod timetable;

pub use config::RouterConfig;
pub use error::{FeedError, LoadDiagnostic};
pub use journey::{Journey, Leg};
pub use model::{RouteId, Stop, StopId, Trip, TripId};
pub use raptor::RaptorEngine;
pub use timetable::TimetableStore;
