use crate::error::UpstreamFetchError;
use axum::body::Bytes;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedFormat {
	#[default]
	Xml,
	Json,
}

impl FeedFormat {
	/// `xml` or no format is served as an RSS feed, anything else as JSON.
	pub fn from_query(raw: Option<&str>) -> Self {
		match raw {
			None => Self::Xml,
			Some(f) if f.eq_ignore_ascii_case("xml") => Self::Xml,
			Some(_) => Self::Json,
		}
	}

	pub const fn content_type(self) -> &'static str {
		match self {
			Self::Xml => "application/rss+xml",
			Self::Json => "application/json",
		}
	}
}

/// Fetches third-party feeds on behalf of browser clients blocked by CORS.
#[derive(Clone)]
pub struct FeedProxy {
	client: reqwest::Client,
}

impl FeedProxy {
	pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self { client })
	}

	pub async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamFetchError> {
		let response = self.client.get(url).send().await?.error_for_status()?;
		let body = response.bytes().await?;
		debug!(%url, bytes = body.len(), "Fetched feed");
		Ok(body)
	}
}
