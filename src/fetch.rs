//! Retrieves and parses the post index. Loading is an explicit
//! [`Result`]: callers can tell an unreachable index from a malformed one, even
//! though a page renders the same fallback for both.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

/// Somewhere a post index can be loaded from.
#[async_trait(?Send)]
pub trait IndexSource {
    /// Retrieves the index document at `url` and parses it as JSON.
    async fn load(&self, url: &Url) -> Result<Value>;
}

/// Loads indexes over HTTP(S) with caching disabled, and from disk for
/// `file://` URLs.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<HttpSource> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let client = Client::builder()
            .user_agent(concat!("postlist/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(Error::Client)?;
        Ok(HttpSource { client })
    }

    async fn load_http(&self, url: &Url) -> Result<Value> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| Error::Network {
                url: url.clone(),
                err,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|err| Error::Network {
            url: url.clone(),
            err,
        })?;
        parse(url, &body)
    }

    async fn load_file(&self, url: &Url) -> Result<Value> {
        let path = url
            .to_file_path()
            .map_err(|()| Error::InvalidFileUrl(url.clone()))?;
        let body = tokio::fs::read(&path)
            .await
            .map_err(|err| Error::Read { path, err })?;
        parse(url, &body)
    }
}

#[async_trait(?Send)]
impl IndexSource for HttpSource {
    async fn load(&self, url: &Url) -> Result<Value> {
        tracing::debug!(%url, "fetching post index");
        match url.scheme() {
            "file" => self.load_file(url).await,
            "http" | "https" => self.load_http(url).await,
            scheme => Err(Error::UnsupportedScheme(scheme.to_owned())),
        }
    }
}

/// Parses an index body. Any JSON value is accepted here; deciding what a
/// non-array means is left to [`crate::post::PostIndex::from_value`].
pub fn parse(url: &Url, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|err| Error::Parse {
        url: url.clone(),
        err,
    })
}

/// The result of loading an index.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to load the post index.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the HTTP client can't be constructed.
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Returned when the request fails before a complete response arrives.
    #[error("requesting `{url}`: {err}")]
    Network {
        url: Url,
        #[source]
        err: reqwest::Error,
    },

    /// Returned when the server answers with a non-success status.
    #[error("`{url}` returned {status}")]
    Status { url: Url, status: StatusCode },

    /// Returned when a `file://` index can't be read.
    #[error("reading `{}`: {err}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a `file://` URL doesn't map to a local path.
    #[error("`{0}` is not a local file path")]
    InvalidFileUrl(Url),

    /// Returned for index URLs that are neither HTTP(S) nor `file://`.
    #[error("unsupported index URL scheme `{0}`")]
    UnsupportedScheme(String),

    /// Returned when the body isn't valid JSON.
    #[error("parsing `{url}`: {err}")]
    Parse {
        url: Url,
        #[source]
        err: serde_json::Error,
    },
}

impl Error {
    /// Whether the index couldn't be reached at all (as opposed to being
    /// reached but malformed).
    pub fn is_unreachable(&self) -> bool {
        !self.is_malformed()
    }

    /// Whether the index was retrieved but isn't valid JSON.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}
