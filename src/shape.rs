//! Shape Slicer (§4.3): extracts the sub-polyline of a trip's on-street
//! geometry that lies between two stops, by projecting each stop onto
//! its nearest shape vertex.
//!
//! Grounded directly on `original_source/raptor.py::get_sliced_shape`:
//! nearest point is found by squared-Euclidean distance (no haversine
//! needed, shapes are short enough that the distortion doesn't matter),
//! and an out-of-order result (start index after end index) yields an
//! empty slice rather than a reversed one.

use crate::model::Shape;

fn nearest_index(shape: &Shape, lat: f64, lon: f64) -> usize {
    shape
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (a.0 - lat).powi(2) + (a.1 - lon).powi(2);
            let db = (b.0 - lat).powi(2) + (b.1 - lon).powi(2);
            da.partial_cmp(&db).expect("coordinates are finite")
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Returns the portion of `shape` between the points nearest
/// `(from_lat, from_lon)` and `(to_lat, to_lon)`, inclusive. Empty if
/// the shape has no points, or if the nearest points come out in
/// reverse order (the shape doesn't run in the trip's direction of
/// travel at these two stops).
pub fn slice_shape(shape: &Shape, from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> Shape {
    if shape.is_empty() {
        return Vec::new();
    }
    let start = nearest_index(shape, from_lat, from_lon);
    let end = nearest_index(shape, to_lat, to_lon);
    if start <= end {
        shape[start..=end].to_vec()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line() -> Shape {
        vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0), (0.0, 4.0)]
    }

    #[test]
    fn slices_between_nearest_points() {
        let shape = line();
        let slice = slice_shape(&shape, 0.0, 1.0, 0.0, 3.0);
        assert_eq!(slice, vec![(0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
    }

    #[test]
    fn reversed_order_yields_empty() {
        let shape = line();
        let slice = slice_shape(&shape, 0.0, 3.0, 0.0, 1.0);
        assert!(slice.is_empty());
    }

    #[test]
    fn empty_shape_yields_empty() {
        let shape: Shape = Vec::new();
        assert!(slice_shape(&shape, 0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn identical_endpoints_yield_single_point() {
        let shape = line();
        let slice = slice_shape(&shape, 0.0, 2.0, 0.0, 2.0);
        assert_eq!(slice, vec![(0.0, 2.0)]);
    }
}
