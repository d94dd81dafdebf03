//! Boundary input shapes and their canonical ring.
//!
//! Any supported input is turned into a [`BoundaryRing`] through
//! [`Boundary::normalize`]; [`Boundary::sniff`] recognizes untyped JSON.

mod input;
mod merge;
mod ring;
mod sniff;

pub use input::{Boundary, GeoJson, Position};
pub use merge::merge_boundaries;
pub use ring::BoundaryRing;

/// Free-function form of [`Boundary::normalize`].
pub fn normalize(boundary: &Boundary) -> anyhow::Result<BoundaryRing> {
	boundary.normalize()
}
