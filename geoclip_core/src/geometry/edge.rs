//! Polygon edges and an R-tree over them.

use rstar::{AABB, RTree, RTreeObject};

/// One side of a boundary polygon, in whatever plane the polygon was given in
/// (`[lng, lat]` for rings, pixels for masks).
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub start: [f64; 2],
	pub end: [f64; 2],
}

impl Edge {
	#[must_use]
	pub fn new(start: [f64; 2], end: [f64; 2]) -> Self {
		Self { start, end }
	}

	/// One step of the parity count behind [`super::contains_xy`] and
	/// [`EdgeIndex::contains`]: true if the ray from `(px, py)` towards +x passes this side.
	///
	/// Requires exactly one endpoint strictly above `py`.
	#[must_use]
	pub fn ray_crosses(&self, px: f64, py: f64) -> bool {
		let [x1, y1] = self.start;
		let [x2, y2] = self.end;

		if (y1 > py) == (y2 > py) {
			return false;
		}

		let x_intersect = x1 + (x2 - x1) * (py - y1) / (y2 - y1);
		px < x_intersect
	}
}

/// Edges are stored in the [`EdgeIndex`] tree by their bounding box.
impl RTreeObject for Edge {
	type Envelope = AABB<[f64; 2]>;

	fn envelope(&self) -> Self::Envelope {
		AABB::from_corners(
			[self.start[0].min(self.end[0]), self.start[1].min(self.end[1])],
			[self.start[0].max(self.end[0]), self.start[1].max(self.end[1])],
		)
	}
}

/// How an axis-aligned region relates to a polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionClass {
	/// Every point of the region is inside.
	Inside,
	/// Every point of the region is outside.
	Outside,
	/// An edge passes near or through the region.
	Partial,
}

/// Spatial index of a polygon's edges for repeated containment queries.
pub struct EdgeIndex {
	tree: RTree<Edge>,
	bounds: [f64; 4],
}

impl EdgeIndex {
	/// Indexes the edges of `ring`; the closing edge is added when the ring is open.
	///
	/// Returns `None` for fewer than 3 points.
	#[must_use]
	pub fn from_ring(ring: &[[f64; 2]]) -> Option<EdgeIndex> {
		if ring.len() < 3 {
			return None;
		}

		let mut bounds = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
		for [x, y] in ring {
			bounds[0] = bounds[0].min(*x);
			bounds[1] = bounds[1].min(*y);
			bounds[2] = bounds[2].max(*x);
			bounds[3] = bounds[3].max(*y);
		}

		let edges: Vec<Edge> = ring
			.iter()
			.zip(ring.iter().cycle().skip(1))
			.filter(|(a, b)| a != b)
			.map(|(a, b)| Edge::new(*a, *b))
			.collect();

		Some(EdgeIndex {
			tree: RTree::bulk_load(edges),
			bounds,
		})
	}

	#[must_use]
	pub fn bounds(&self) -> [f64; 4] {
		self.bounds
	}

	#[must_use]
	pub fn edge_count(&self) -> usize {
		self.tree.size()
	}

	/// Even-odd containment, only looking at edges that span `y`.
	#[must_use]
	pub fn contains(&self, x: f64, y: f64) -> bool {
		let [x_min, y_min, x_max, y_max] = self.bounds;
		if x < x_min || x > x_max || y < y_min || y > y_max {
			return false;
		}

		let envelope = AABB::from_corners([x_min, y], [x_max, y]);
		let crossings = self
			.tree
			.locate_in_envelope_intersecting(&envelope)
			.filter(|edge| edge.ray_crosses(x, y))
			.count();
		crossings % 2 == 1
	}

	/// Classifies the rectangle `[x_min, y_min, x_max, y_max]`.
	///
	/// A region is `Partial` as soon as an edge's envelope touches it, so the answer
	/// may be `Partial` for regions that are in fact uniform, never the reverse.
	#[must_use]
	pub fn classify(&self, rect: [f64; 4]) -> RegionClass {
		let [x0, y0, x1, y1] = rect;
		let [mx0, my0, mx1, my1] = self.bounds;
		if x1 < mx0 || x0 > mx1 || y1 < my0 || y0 > my1 {
			return RegionClass::Outside;
		}

		let envelope = AABB::from_corners([x0, y0], [x1, y1]);
		if self.tree.locate_in_envelope_intersecting(&envelope).next().is_some() {
			return RegionClass::Partial;
		}

		if self.contains(f64::midpoint(x0, x1), f64::midpoint(y0, y1)) {
			RegionClass::Inside
		} else {
			RegionClass::Outside
		}
	}
}

impl std::fmt::Debug for EdgeIndex {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EdgeIndex")
			.field("bounds", &self.bounds)
			.field("edge_count", &self.tree.size())
			.finish()
	}
}
