//! Google Books volume search.

use crate::Resolver;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use shelfscan_catalog::{BookRecord, CatalogIdentifier};
use std::time::Duration;
use tracing::instrument;

/// Volume search URL; the normalized identifier is appended, percent-encoded,
/// to the value of the last query parameter.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes?q=isbn:";
const DEFAULT_USER_AGENT: &str = concat!("shelfscan/", env!("CARGO_PKG_VERSION"));

/// Resolves identifiers against the Google Books volume search API.
///
/// One `GET` per lookup, no retries and (by default) no timeout: a request
/// that never completes leaves the identifier in flight.
pub struct GoogleBooksResolver {
    name: String,
    client: reqwest::Client,
    endpoint: Url,
}

pub struct GoogleBooksResolverBuilder {
    name: String,
    endpoint: String,
    user_agent: String,
    timeout: Option<Duration>,
}

impl GoogleBooksResolver {
    pub fn builder() -> GoogleBooksResolverBuilder {
        GoogleBooksResolverBuilder {
            name: "google-books".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    /// Endpoints with a query get the identifier appended to their last
    /// parameter's value; endpoints without one get it as a final path segment.
    fn url_for(&self, id: &CatalogIdentifier) -> Url {
        let mut url = self.endpoint.clone();
        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        if let Some((_, value)) = pairs.last_mut() {
            value.push_str(id.as_str());
            url.query_pairs_mut().clear().extend_pairs(pairs);
        } else if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}

impl GoogleBooksResolverBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// A timeout turns a hung lookup into a
    /// [`NetworkFailure`](ErrorKind::NetworkFailure). `None` waits forever.
    pub fn timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn build(self) -> Result<GoogleBooksResolver> {
        if self.endpoint.trim().is_empty() {
            exn::bail!(ErrorKind::Configuration("lookup endpoint is empty".to_string()));
        }
        let mut client = reqwest::Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let endpoint = Url::parse(self.endpoint.trim())
            .or_raise(|| ErrorKind::Configuration(format!("invalid lookup endpoint: {}", self.endpoint)))?;
        if endpoint.cannot_be_a_base() {
            exn::bail!(ErrorKind::Configuration(format!("invalid lookup endpoint: {}", self.endpoint)));
        }
        let client = client.build().or_raise(|| ErrorKind::Configuration("HTTP client".to_string()))?;
        Ok(GoogleBooksResolver {
            name: self.name,
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl Resolver for GoogleBooksResolver {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(resolver = %self.name, id = %id))]
    async fn resolve(&self, id: &CatalogIdentifier) -> Result<BookRecord> {
        if id.is_empty() {
            exn::bail!(ErrorKind::NotFound(id.clone()));
        }
        let url = self.url_for(id);
        tracing::debug!(url = %url, "Querying lookup endpoint");
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::NetworkFailure(id.clone()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(id.clone()));
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Lookup endpoint returned an error status");
            exn::bail!(ErrorKind::NetworkFailure(id.clone()));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::NetworkFailure(id.clone()))?;
        parse_volumes(id, &body)
    }
}

#[derive(Deserialize)]
struct Volumes {
    items: Option<Vec<Volume>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

/// Parses a volume search response body into the record for `id`.
///
/// Only the first item is considered. No items at all is
/// [`NotFound`](ErrorKind::NotFound); a body that isn't JSON, or a first item
/// with no title, is [`MalformedResponse`](ErrorKind::MalformedResponse).
pub fn parse_volumes(id: &CatalogIdentifier, body: &[u8]) -> Result<BookRecord> {
    let volumes: Volumes = serde_json::from_slice(body).or_raise(|| ErrorKind::MalformedResponse(id.clone()))?;
    let Some(first) = volumes.items.and_then(|items| items.into_iter().next()) else {
        exn::bail!(ErrorKind::NotFound(id.clone()));
    };
    let info = first.volume_info.ok_or_raise(|| ErrorKind::MalformedResponse(id.clone()))?;
    let title = info.title.ok_or_raise(|| ErrorKind::MalformedResponse(id.clone()))?;
    let cover = info.image_links.and_then(|links| links.thumbnail.or(links.small_thumbnail));
    Ok(BookRecord::new(id.clone(), title, info.authors.unwrap_or_default(), cover))
}
