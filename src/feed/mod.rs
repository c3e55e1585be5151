//! Feed Loader (component B, §4.1): turns one or more GTFS feed
//! directories into a single [`TimetableStore`].
//!
//! `gtfs-structures` is the row-source collaborator — it does the CSV
//! parsing and `H:M:S` time conversion; everything here consumes its
//! already-typed, already-seconds-since-midnight rows, the way the
//! teacher's `InMemoryTimetableBuilder::preprocess_gtfs` does, minus
//! the service-calendar day expansion and timezone handling that
//! existed there to build a multi-day mmap snapshot.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};

use crate::error::{FeedError, LoadDiagnostic};
use crate::model::{RouteId, StopId};
use crate::timetable::{TimetableBuilder, TimetableStore};

/// One feed's contribution: an operator tag used to namespace every
/// identifier drawn from it, preventing collisions when feeds are
/// merged (§4.1 step 1).
pub struct FeedSource<'a> {
    pub operator_tag: &'a str,
    pub gtfs_path: &'a Path,
}

#[derive(Clone)]
struct TripDraft {
    external_id: String,
    shape_id: Option<String>,
    arrival: Vec<u32>,
    departure: Vec<u32>,
}

impl TripDraft {
    fn departs_no_later_than(&self, other: &TripDraft) -> bool {
        self.departure
            .iter()
            .zip(&other.departure)
            .all(|(a, b)| a <= b)
            && self.arrival.iter().zip(&other.arrival).all(|(a, b)| a <= b)
    }
}

pub struct FeedLoader {
    diagnostics: Vec<LoadDiagnostic>,
}

impl FeedLoader {
    pub fn new() -> Self {
        FeedLoader { diagnostics: Vec::new() }
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// Loads every feed in `sources` into a single store. A feed whose
    /// directory can't be read or whose GTFS is unparsable aborts the
    /// whole load (§4.1, "Failure"); row-level problems are routed
    /// around and recorded as diagnostics instead.
    pub fn load(&mut self, sources: &[FeedSource]) -> Result<TimetableStore, FeedError> {
        let mut builder = TimetableBuilder::new();

        for source in sources {
            self.load_one(source, &mut builder)?;
        }

        Ok(builder.build())
    }

    fn load_one(
        &mut self,
        source: &FeedSource,
        builder: &mut TimetableBuilder,
    ) -> Result<(), FeedError> {
        let gtfs = gtfs_structures::Gtfs::new(
            source
                .gtfs_path
                .to_str()
                .ok_or_else(|| FeedError::UnreadableFeed(source.gtfs_path.display().to_string()))?,
        )?;

        let namespaced = |raw: &str| format!("{}:{}", source.operator_tag, raw);

        let mut stop_ids: HashMap<String, StopId> = HashMap::new();
        for (gtfs_id, stop) in &gtfs.stops {
            let (Some(lat), Some(lon)) = (stop.latitude, stop.longitude) else {
                self.diagnostics.push(LoadDiagnostic::MalformedRow {
                    table: "stops",
                    detail: format!("{gtfs_id} missing coordinates"),
                });
                continue;
            };
            let name = stop.name.clone().unwrap_or_default();
            let id = builder.add_stop(namespaced(gtfs_id), name, lat, lon);
            stop_ids.insert(gtfs_id.clone(), id);
        }

        // Cluster trips by (feed-route, stop-sequence) into draft
        // routing-routes, carrying the clustering key's stop list for
        // later no-overtake checking (§4.1 steps 3-4).
        let mut clusters: HashMap<(String, Vec<StopId>), Vec<TripDraft>> = HashMap::new();

        for (gtfs_trip_id, trip) in &gtfs.trips {
            let mut stop_times = trip.stop_times.clone();
            stop_times.sort_by_key(|st| st.stop_sequence);

            let mut stops = Vec::with_capacity(stop_times.len());
            let mut arrival = Vec::with_capacity(stop_times.len());
            let mut departure = Vec::with_capacity(stop_times.len());
            let mut malformed = false;

            for stop_time in &stop_times {
                let Some(&stop_id) = stop_ids.get(&stop_time.stop.id) else {
                    malformed = true;
                    break;
                };
                let (Some(at), Some(dt)) = (stop_time.arrival_time, stop_time.departure_time) else {
                    malformed = true;
                    break;
                };
                stops.push(stop_id);
                arrival.push(at);
                departure.push(dt);
            }

            if malformed || stops.len() < 2 {
                self.diagnostics.push(LoadDiagnostic::MalformedRow {
                    table: "stop_times",
                    detail: format!("trip {gtfs_trip_id} has unusable stop sequence"),
                });
                continue;
            }

            let draft = TripDraft {
                external_id: namespaced(gtfs_trip_id),
                shape_id: trip.shape_id.clone().map(|s| namespaced(&s)),
                arrival,
                departure,
            };

            if !is_monotone(&draft) {
                self.diagnostics.push(LoadDiagnostic::NonMonotoneTrip {
                    trip_id: draft.external_id.clone(),
                });
                continue;
            }

            let feed_route_id = trip.route_id.clone();
            clusters.entry((feed_route_id, stops)).or_default().push(draft);
        }

        for ((feed_route_id, stop_sequence), mut drafts) in clusters {
            drafts.sort_by_key(|d| d.departure[0]);

            let route_meta = gtfs.routes.get(&feed_route_id);
            let short_name = route_meta.and_then(|r| r.short_name.clone());
            let long_name = route_meta.and_then(|r| r.long_name.clone());
            let agency_id = route_meta
                .and_then(|r| r.agency_id.clone())
                .map(|id| namespaced(&id));

            let lanes = partition_into_lanes(drafts);
            if lanes.len() > 1 {
                self.diagnostics.push(LoadDiagnostic::RouteSplit {
                    feed_route_id: namespaced(&feed_route_id),
                    lanes: lanes.len(),
                });
            }

            for lane in lanes {
                let route_id: RouteId = builder.add_route(
                    namespaced(&feed_route_id),
                    short_name.clone(),
                    long_name.clone(),
                    agency_id.clone(),
                    stop_sequence.clone(),
                );
                for draft in lane {
                    builder.add_trip(
                        route_id,
                        draft.external_id,
                        draft.shape_id,
                        draft.arrival,
                        draft.departure,
                    );
                }
            }
        }

        for (shape_id, points) in &gtfs.shapes {
            let mut points = points.clone();
            points.sort_by_key(|p| p.sequence);
            let polyline = points.into_iter().map(|p| (p.latitude, p.longitude)).collect();
            builder.add_shape(namespaced(shape_id), polyline);
        }

        if gtfs.shapes.is_empty() {
            debug!("feed {} has no shapes.txt", source.operator_tag);
            self.diagnostics.push(LoadDiagnostic::OptionalFileMissing {
                feed_tag: source.operator_tag.to_string(),
                file: "shapes.txt",
            });
        }

        Ok(())
    }
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_monotone(draft: &TripDraft) -> bool {
    for p in 0..draft.arrival.len() {
        if draft.arrival[p] > draft.departure[p] {
            return false;
        }
        if p + 1 < draft.arrival.len() && draft.departure[p] > draft.arrival[p + 1] {
            return false;
        }
    }
    true
}

/// Greedily partitions a departure-sorted set of same-stop-sequence
/// trips into the fewest lanes such that each lane is internally
/// non-overtaking (§4.1 step 8, §9).
fn partition_into_lanes(drafts: Vec<TripDraft>) -> Vec<Vec<TripDraft>> {
    let mut lanes: Vec<Vec<TripDraft>> = Vec::new();
    for draft in drafts {
        let target_lane = lanes
            .iter()
            .position(|lane| lane.last().map(|last| last.departs_no_later_than(&draft)).unwrap_or(true));
        match target_lane {
            Some(i) => lanes[i].push(draft),
            None => {
                warn!("opening new lane for overtaking trips on same-stop-sequence route");
                lanes.push(vec![draft]);
            }
        }
    }
    lanes
}

#[cfg(test)]
mod test {
    use super::*;

    fn draft(departure: Vec<u32>) -> TripDraft {
        TripDraft {
            external_id: "t".into(),
            shape_id: None,
            arrival: departure.clone(),
            departure,
        }
    }

    #[test]
    fn non_overtaking_trips_share_one_lane() {
        let drafts = vec![draft(vec![0, 100]), draft(vec![50, 150])];
        let lanes = partition_into_lanes(drafts);
        assert_eq!(lanes.len(), 1);
    }

    #[test]
    fn overtaking_trips_split_into_lanes() {
        let drafts = vec![draft(vec![0, 200]), draft(vec![50, 100])];
        let lanes = partition_into_lanes(drafts);
        assert_eq!(lanes.len(), 2);
    }
}
