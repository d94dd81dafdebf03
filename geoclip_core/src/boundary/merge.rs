use crate::{BoundaryRing, ClipError, LatLng};
use anyhow::Result;
use geo::{Area, BooleanOps, MultiPolygon};

/// Unions several rings into one.
///
/// If the union falls apart into separate polygons the largest one is kept, and any
/// holes are dropped.
pub fn merge_boundaries(rings: &[BoundaryRing]) -> Result<BoundaryRing> {
	if rings.is_empty() {
		return Err(ClipError::unsupported("no boundaries to merge").into());
	}

	let merged = rings.iter().fold(MultiPolygon::<f64>::new(vec![]), |acc, ring| {
		acc.union(&MultiPolygon::new(vec![ring.to_geo_polygon()]))
	});

	if merged.0.len() > 1 {
		log::debug!("merged region has {} parts, only the largest is kept", merged.0.len());
	}

	let largest = merged
		.0
		.into_iter()
		.max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
		.ok_or(ClipError::DegenerateBoundary { distinct: 0 })?;

	let points = largest.exterior().0.iter().map(|c| LatLng::from(*c)).collect();
	BoundaryRing::new(points)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	fn square(lat: f64, lng: f64, size: f64) -> BoundaryRing {
		BoundaryRing::new(vec![
			LatLng::new(lat, lng),
			LatLng::new(lat, lng + size),
			LatLng::new(lat + size, lng + size),
			LatLng::new(lat + size, lng),
		])
		.unwrap()
	}

	#[test]
	fn overlapping_squares_merge_into_one_outline() {
		let merged = merge_boundaries(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
		let bounds = merged.bounds();
		assert_relative_eq!(bounds.x_min, 0.0);
		assert_relative_eq!(bounds.y_min, 0.0);
		assert_relative_eq!(bounds.x_max, 3.0);
		assert_relative_eq!(bounds.y_max, 3.0);
		assert!(merged.contains(&LatLng::new(0.5, 0.5)));
		assert!(merged.contains(&LatLng::new(2.5, 2.5)));
		assert!(!merged.contains(&LatLng::new(0.5, 2.5)));
	}

	#[test]
	fn disjoint_squares_keep_the_largest() {
		let merged = merge_boundaries(&[square(0.0, 0.0, 1.0), square(10.0, 10.0, 3.0)]).unwrap();
		let bounds = merged.bounds();
		assert_relative_eq!(bounds.x_min, 10.0);
		assert_relative_eq!(bounds.y_max, 13.0);
	}

	#[test]
	fn single_ring_is_kept() {
		let merged = merge_boundaries(&[square(5.0, 5.0, 1.0)]).unwrap();
		assert_eq!(merged.bounds().as_array(), [5.0, 5.0, 6.0, 6.0]);
	}

	#[test]
	fn empty_input_is_an_error() {
		let err = merge_boundaries(&[]).unwrap_err();
		assert!(matches!(
			ClipError::find(&err),
			Some(ClipError::UnsupportedBoundaryFormat { .. })
		));
	}
}
