use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use webhelpers_core::imagecompressor::parse_tinify_response;

use super::{compress_error, send, CompressedFile, ImageCompressor};
use crate::option::{apply_options, non_empty, valid_url, Configure, OptionError};
use crate::prelude::*;

/// API URL for Tinify
pub const API_URL: &str = "https://api.tinify.com/shrink";

const SERVICE: &str = "tinify";

/// Tinify configuration option
#[derive(Debug, Clone)]
pub enum TinifyOption {
    ApiKey(String),
    HttpClient(reqwest::Client),
    /// Shrink endpoint, defaults to [`API_URL`]
    ApiUrl(String),
}

#[derive(Debug, Default)]
pub struct TinifyConfig {
    api_key: String,
    http_client: reqwest::Client,
    api_url: String,
}

impl Configure<TinifyConfig> for TinifyOption {
    fn apply(self, config: &mut TinifyConfig) -> Result<(), OptionError> {
        match self {
            TinifyOption::ApiKey(key) => config.api_key = non_empty(key, "tinify.api_key")?,
            TinifyOption::HttpClient(client) => config.http_client = client,
            TinifyOption::ApiUrl(url) => config.api_url = valid_url(url, "tinify.api_url")?,
        }
        Ok(())
    }
}

fn default_options() -> Vec<TinifyOption> {
    vec![TinifyOption::ApiUrl(API_URL.to_string())]
}

/// TinyPNG / Tinify image compression client
#[derive(Debug, Clone)]
pub struct TinifyClient {
    api_key: String,
    http_client: reqwest::Client,
    api_url: String,
}

impl TinifyClient {
    pub fn new(opts: impl IntoIterator<Item = TinifyOption>) -> Result<Self> {
        let config: TinifyConfig = apply_options(default_options(), opts)?;

        Ok(Self {
            api_key: config.api_key,
            http_client: config.http_client,
            api_url: config.api_url,
        })
    }

    /// Build a client from `TINIFY_API_KEY`, then `opts`.
    pub fn from_env(opts: impl IntoIterator<Item = TinifyOption>) -> Result<Self> {
        let api_key = std::env::var("TINIFY_API_KEY").map_err(|_| {
            Error::Credentials("TINIFY_API_KEY environment variable not set".to_string())
        })?;

        Self::new(std::iter::once(TinifyOption::ApiKey(api_key)).chain(opts))
    }

    /// Basic auth header with the fixed `api` user.
    fn authorization(&self) -> Result<HeaderValue> {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(f!("api:{}", self.api_key));

        HeaderValue::from_str(&f!("Basic {encoded}"))
            .map_err(|e| Error::Internal(f!("failed create http request: {e}")))
    }
}

#[async_trait]
impl ImageCompressor for TinifyClient {
    /// The file is sent as the raw request body. The filename is not used.
    async fn upload(&self, file: Vec<u8>, _filename: &str) -> Result<CompressedFile> {
        let request = self
            .http_client
            .post(&self.api_url)
            .header(AUTHORIZATION, self.authorization()?)
            .body(file);

        debug!("uploading image to {}", self.api_url);

        let body = send(SERVICE, request).await?;

        let url = parse_tinify_response(&body).map_err(|e| compress_error(SERVICE, e))?;

        Ok(CompressedFile { url })
    }
}
