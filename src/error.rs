//! Error taxonomy for the crate. Load-time failures that abort a whole
//! feed are `thiserror`-derived, matching the teacher's
//! `InMemoryTimetableBuilderError`; per-row problems that the loader
//! can route around (§7) are reported as [`LoadDiagnostic`]s alongside
//! `log::warn!` calls, not as hard errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed directory could not be read: {0}")]
    UnreadableFeed(String),
    #[error("gtfs parse error: {0}")]
    Gtfs(#[from] gtfs_structures::Error),
}

/// A recoverable, per-row or per-trip problem encountered while
/// assembling the Timetable Store. Loading continues past these; they
/// are surfaced so a caller can log or report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    /// A stop-times row referenced a trip or stop that doesn't exist.
    MalformedRow { table: &'static str, detail: String },
    /// A trip's arrival/departure sequence was not monotone and the
    /// trip was dropped (§7).
    NonMonotoneTrip { trip_id: String },
    /// A routing-route violated the no-overtaking invariant and was
    /// split into `lanes` separate routing-routes (§4.1 step 8).
    RouteSplit { feed_route_id: String, lanes: usize },
    /// An optional file (transfers.txt, shapes.txt) was missing for a
    /// feed; the corresponding feature is disabled for that feed only.
    OptionalFileMissing { feed_tag: String, file: &'static str },
}

impl std::fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadDiagnostic::MalformedRow { table, detail } => {
                write!(f, "malformed row in {table}: {detail}")
            }
            LoadDiagnostic::NonMonotoneTrip { trip_id } => {
                write!(f, "dropped non-monotone trip {trip_id}")
            }
            LoadDiagnostic::RouteSplit { feed_route_id, lanes } => {
                write!(f, "route {feed_route_id} split into {lanes} non-overtaking lanes")
            }
            LoadDiagnostic::OptionalFileMissing { feed_tag, file } => {
                write!(f, "{file} missing for feed {feed_tag}, feature disabled")
            }
        }
    }
}
