use std::fmt::{self, Debug};

/// A position in pixel space: `x` grows to the east, `y` grows to the south.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
	pub x: f64,
	pub y: f64,
}

impl PixelPoint {
	#[must_use]
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl From<[f64; 2]> for PixelPoint {
	fn from(value: [f64; 2]) -> Self {
		PixelPoint::new(value[0], value[1])
	}
}

impl From<(f64, f64)> for PixelPoint {
	fn from(value: (f64, f64)) -> Self {
		PixelPoint::new(value.0, value.1)
	}
}

impl Debug for PixelPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PixelPoint({}, {})", self.x, self.y)
	}
}
