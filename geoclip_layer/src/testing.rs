//! Collaborators for the layer tests.

use crate::ImageFetcher;
use anyhow::Result;
use async_trait::async_trait;
use geoclip_core::ClipError;
use geoclip_image::DynamicImageTraitTest;
use image::DynamicImage;
use reqwest::Url;
use std::sync::{
	Mutex,
	atomic::{AtomicBool, Ordering},
};
use tokio::sync::Notify;

/// Answers every request with a solid image of the requested `WIDTH × HEIGHT`.
#[derive(Debug, Default)]
pub struct MockFetcher {
	calls: Mutex<Vec<Url>>,
	failing: AtomicBool,
	hold_next: AtomicBool,
	release: Notify,
}

impl MockFetcher {
	pub fn new() -> MockFetcher {
		MockFetcher::default()
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	/// The next request waits until [`release`](Self::release) is called.
	pub fn hold_next(&self) {
		self.hold_next.store(true, Ordering::SeqCst);
	}

	pub fn release(&self) {
		self.release.notify_one();
	}

	pub fn calls(&self) -> Vec<Url> {
		self.calls.lock().unwrap().clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().unwrap().len()
	}

	/// Yields until at least `count` requests have been received.
	pub async fn wait_for_calls(&self, count: usize) {
		while self.call_count() < count {
			tokio::task::yield_now().await;
		}
	}
}

fn size_param(url: &Url, key: &str) -> u32 {
	url.query_pairs()
		.find(|(k, _)| k == key)
		.and_then(|(_, v)| v.parse().ok())
		.unwrap_or(256)
}

#[async_trait]
impl ImageFetcher for MockFetcher {
	async fn fetch(&self, url: &Url) -> Result<DynamicImage> {
		self.calls.lock().unwrap().push(url.clone());
		if self.hold_next.swap(false, Ordering::SeqCst) {
			self.release.notified().await;
		}
		if self.failing.load(Ordering::SeqCst) {
			return Err(ClipError::fetch_failure(url, "mock failure").into());
		}
		Ok(DynamicImage::new_test_solid(
			size_param(url, "WIDTH"),
			size_param(url, "HEIGHT"),
			[200, 100, 50],
		))
	}
}
