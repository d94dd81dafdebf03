//! Error kinds that callers may want to tell apart.
//!
//! Every fallible function in the workspace returns [`anyhow::Result`]. When the failure
//! belongs to one of the kinds below, the root cause is a [`ClipError`], so it can be
//! recovered with `err.downcast_ref::<ClipError>()` after any amount of added context.

use thiserror::Error;

/// Human readable list of the boundary shapes [`crate::Boundary::sniff`] understands.
pub const ACCEPTED_BOUNDARY_FORMATS: &str = "an array of [lat, lng] pairs, \
	a bounds object with southWest/northEast corners, \
	a polygon object with latlngs, \
	or a GeoJSON Polygon, MultiPolygon or Feature";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClipError {
	/// The boundary input matches none of the recognized shapes.
	#[error("unsupported boundary format: {detail}; expected {formats}", formats = ACCEPTED_BOUNDARY_FORMATS)]
	UnsupportedBoundaryFormat { detail: String },

	/// The boundary was recognized but does not describe an area.
	#[error("boundary ring needs at least 3 distinct vertices, but has {distinct}")]
	DegenerateBoundary { distinct: usize },

	/// Fetching the image for a tile or a viewport failed.
	#[error("failed to fetch image from '{url}': {reason}")]
	TileFetchFailure { url: String, reason: String },

	/// A collaborator required to build a layer was not supplied.
	#[error("missing dependency: {0} must be provided before the layer can be built")]
	DependencyMissing(&'static str),

	/// Layer options failed validation.
	#[error("invalid layer options: {0}")]
	InvalidOptions(String),
}

impl ClipError {
	pub fn unsupported(detail: impl Into<String>) -> Self {
		ClipError::UnsupportedBoundaryFormat { detail: detail.into() }
	}

	pub fn fetch_failure(url: impl ToString, reason: impl ToString) -> Self {
		ClipError::TileFetchFailure {
			url: url.to_string(),
			reason: reason.to_string(),
		}
	}

	/// Returns the `ClipError` at the root of an [`anyhow::Error`] chain, if there is one.
	pub fn find(err: &anyhow::Error) -> Option<&ClipError> {
		err.chain().find_map(|cause| cause.downcast_ref::<ClipError>())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::Context;

	#[test]
	fn unsupported_message_names_accepted_formats() {
		let message = ClipError::unsupported("number").to_string();
		assert!(message.starts_with("unsupported boundary format: number"));
		assert!(message.contains("GeoJSON Polygon"));
		assert!(message.contains("southWest/northEast"));
	}

	#[test]
	fn find_through_context() {
		let result: anyhow::Result<()> = Err(ClipError::DependencyMissing("an image fetcher").into());
		let err = result.context("building layer").unwrap_err();
		assert_eq!(
			ClipError::find(&err),
			Some(&ClipError::DependencyMissing("an image fetcher"))
		);
	}

	#[test]
	fn find_returns_none_for_foreign_errors() {
		let err = anyhow::anyhow!("something else");
		assert!(ClipError::find(&err).is_none());
	}
}
