//! Generic single-shot HTTP exchange
//!
//! [`execute`] and [`execute_json`] issue one request described by
//! [`HttpOptions`] on a freshly built client and return the response status.
//! Any failure maps to status 500 through [`ExchangeError::status`].

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::prelude::*;

/// Error returned by [`execute`] and [`execute_json`]
#[derive(thiserror::Error, Debug)]
pub enum ExchangeError {
    #[error("invalid url {url:?}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {name}")]
    Header {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Transport(reqwest::Error),

    #[error(transparent)]
    Read(reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl ExchangeError {
    /// Status reported for a failed exchange. Always 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Description of a single HTTP request
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub url: String,
    pub method: Method,
    /// Timeout for the whole exchange, in seconds
    pub timeout: Option<u64>,
    pub headers: HashMap<String, String>,
    /// Merged into the query string already present on `url`
    pub queries: HashMap<String, String>,
    pub data: Vec<u8>,
}

impl HttpOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            timeout: None,
            headers: HashMap::new(),
            queries: HashMap::new(),
            data: Vec::new(),
        }
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }
}

/// Merge `queries` into the query string of `url`.
///
/// Existing keys named in `queries` are replaced. The resulting pairs are
/// sorted by key so the encoded query is stable.
pub fn merge_query(url: &mut Url, queries: &HashMap<String, String>) {
    if queries.is_empty() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !queries.contains_key(&**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.extend(queries.iter().map(|(k, v)| (k.clone(), v.clone())));
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    url.query_pairs_mut().clear().extend_pairs(pairs);
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, ExchangeError> {
    let mut map = HeaderMap::new();

    for (key, value) in headers {
        let header_error = |e: Box<dyn std::error::Error + Send + Sync>| ExchangeError::Header {
            name: key.clone(),
            source: e,
        };
        let name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|e| header_error(e.into()))?;
        let value = HeaderValue::from_str(value).map_err(|e| header_error(e.into()))?;
        map.insert(name, value);
    }

    Ok(map)
}

async fn send(opts: &HttpOptions) -> Result<reqwest::Response, ExchangeError> {
    let mut url = Url::parse(&opts.url).map_err(|source| ExchangeError::Url {
        url: opts.url.clone(),
        source,
    })?;
    merge_query(&mut url, &opts.queries);

    let headers = build_headers(&opts.headers)?;

    let client = reqwest::Client::builder()
        .build()
        .map_err(ExchangeError::Client)?;

    let mut request = client
        .request(opts.method.clone(), url)
        .headers(headers)
        .body(opts.data.clone());
    if let Some(secs) = opts.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }

    debug!("{} {}", opts.method, opts.url);

    request.send().await.map_err(ExchangeError::Transport)
}

/// Issue the request and return the response status, ignoring the body.
pub async fn execute(opts: &HttpOptions) -> Result<StatusCode, ExchangeError> {
    let response = send(opts).await?;
    Ok(response.status())
}

/// Issue the request and decode the full response body as JSON into `T`.
pub async fn execute_json<T: DeserializeOwned>(
    opts: &HttpOptions,
) -> Result<(StatusCode, T), ExchangeError> {
    let response = send(opts).await?;
    let status = response.status();

    let body = response.bytes().await.map_err(ExchangeError::Read)?;
    let value = serde_json::from_slice(&body)?;

    Ok((status, value))
}
