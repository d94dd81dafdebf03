//! The active boundary of a layer and its generation counter.

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use geoclip_core::{Boundary, BoundaryRing};
use std::sync::Arc;

/// A ring together with the generation it was installed in.
#[derive(Debug)]
pub struct BoundarySnapshot {
	pub generation: u64,
	pub ring: BoundaryRing,
}

/// Holds the current boundary and replaces it atomically.
///
/// Readers [`load`](Self::load) one snapshot and keep using it; they never see a
/// ring from one update paired with the generation of another. Every replacement
/// increases the generation by one.
#[derive(Debug)]
pub struct BoundaryState {
	current: ArcSwap<BoundarySnapshot>,
}

impl BoundaryState {
	#[must_use]
	pub fn new(ring: BoundaryRing) -> BoundaryState {
		BoundaryState {
			current: ArcSwap::from_pointee(BoundarySnapshot { generation: 0, ring }),
		}
	}

	/// Normalizes `boundary` and wraps it in a new state.
	pub fn from_boundary(boundary: &Boundary) -> Result<BoundaryState> {
		let ring = boundary
			.normalize()
			.with_context(|| format!("normalizing {} boundary", boundary.kind()))?;
		Ok(BoundaryState::new(ring))
	}

	#[must_use]
	pub fn load(&self) -> Arc<BoundarySnapshot> {
		self.current.load_full()
	}

	#[must_use]
	pub fn generation(&self) -> u64 {
		self.current.load().generation
	}

	/// An owned copy of the current ring.
	#[must_use]
	pub fn ring(&self) -> BoundaryRing {
		self.current.load().ring.clone()
	}

	/// Installs `ring` and returns its generation.
	pub fn replace(&self, ring: BoundaryRing) -> u64 {
		let previous = self.current.rcu(|current| BoundarySnapshot {
			generation: current.generation + 1,
			ring: ring.clone(),
		});
		let generation = previous.generation + 1;
		log::debug!("boundary replaced, generation {generation}, {} points", ring.len());
		generation
	}

	/// Normalizes `boundary` and installs it. On error the current ring stays.
	pub fn set(&self, boundary: &Boundary) -> Result<u64> {
		let ring = boundary
			.normalize()
			.with_context(|| format!("normalizing {} boundary", boundary.kind()))?;
		Ok(self.replace(ring))
	}
}
