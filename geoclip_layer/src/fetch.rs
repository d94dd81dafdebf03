//! Fetching raster images by URL.

use anyhow::Result;
use async_trait::async_trait;
use geoclip_core::ClipError;
use image::DynamicImage;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use std::{fmt::Debug, time::Duration};

/// Source of the raw, unclipped images.
///
/// Implementations report failures as [`ClipError::TileFetchFailure`]; other errors are
/// wrapped into one by the layers. No retries happen above this trait.
#[async_trait]
pub trait ImageFetcher: Debug + Send + Sync {
	async fn fetch(&self, url: &Url) -> Result<DynamicImage>;
}

/// Fetches images over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
	client: Client,
}

impl HttpFetcher {
	/// A fetcher with a 30 second request timeout.
	pub fn new() -> Result<HttpFetcher> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.tcp_keepalive(Duration::from_secs(600))
			.build()?;
		Ok(HttpFetcher { client })
	}

	/// A fetcher that shares an existing client (and its connection pool).
	#[must_use]
	pub fn with_client(client: Client) -> HttpFetcher {
		HttpFetcher { client }
	}
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
	async fn fetch(&self, url: &Url) -> Result<DynamicImage> {
		log::trace!("GET {url}");
		let response = self
			.client
			.get(url.clone())
			.send()
			.await
			.map_err(|e| ClipError::fetch_failure(url, e))?;

		let status = response.status();
		if !status.is_success() {
			return Err(ClipError::fetch_failure(url, format!("HTTP status {status}")).into());
		}

		let mime = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);
		let bytes = response.bytes().await.map_err(|e| ClipError::fetch_failure(url, e))?;

		geoclip_image::decode(&bytes, mime.as_deref())
			.map_err(|e| ClipError::fetch_failure(url, format!("{e:#} (content type {mime:?})")).into())
	}
}

/// Makes sure a fetch error carries a [`ClipError::TileFetchFailure`].
pub(crate) fn as_fetch_failure(err: anyhow::Error, url: &Url) -> anyhow::Error {
	if matches!(ClipError::find(&err), Some(ClipError::TileFetchFailure { .. })) {
		err
	} else {
		ClipError::fetch_failure(url, format!("{err:#}")).into()
	}
}
