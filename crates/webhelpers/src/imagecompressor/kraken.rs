use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use webhelpers_core::imagecompressor::{kraken_request_data, parse_kraken_response};

use super::{compress_error, send, CompressedFile, ImageCompressor};
use crate::option::{apply_options, non_empty, valid_url, Configure, OptionError};
use crate::prelude::*;

/// API URL for Kraken
pub const API_URL: &str = "https://api.kraken.io/v1/upload";

const SERVICE: &str = "kraken";

/// Kraken configuration option
#[derive(Debug, Clone)]
pub enum KrakenOption {
    ApiKey(String),
    ApiSecret(String),
    HttpClient(reqwest::Client),
    /// Upload endpoint, defaults to [`API_URL`]
    ApiUrl(String),
}

#[derive(Debug, Default)]
pub struct KrakenConfig {
    api_key: String,
    api_secret: String,
    http_client: reqwest::Client,
    api_url: String,
}

impl Configure<KrakenConfig> for KrakenOption {
    fn apply(self, config: &mut KrakenConfig) -> Result<(), OptionError> {
        match self {
            KrakenOption::ApiKey(key) => config.api_key = non_empty(key, "kraken.api_key")?,
            KrakenOption::ApiSecret(secret) => {
                config.api_secret = non_empty(secret, "kraken.api_secret")?
            }
            KrakenOption::HttpClient(client) => config.http_client = client,
            KrakenOption::ApiUrl(url) => config.api_url = valid_url(url, "kraken.api_url")?,
        }
        Ok(())
    }
}

fn default_options() -> Vec<KrakenOption> {
    vec![KrakenOption::ApiUrl(API_URL.to_string())]
}

/// Kraken.io image compression client
#[derive(Debug, Clone)]
pub struct KrakenClient {
    api_key: String,
    api_secret: String,
    http_client: reqwest::Client,
    api_url: String,
}

impl KrakenClient {
    pub fn new(opts: impl IntoIterator<Item = KrakenOption>) -> Result<Self> {
        let config: KrakenConfig = apply_options(default_options(), opts)?;

        Ok(Self {
            api_key: config.api_key,
            api_secret: config.api_secret,
            http_client: config.http_client,
            api_url: config.api_url,
        })
    }

    /// Build a client from `KRAKEN_API_KEY` and `KRAKEN_API_SECRET`, then `opts`.
    pub fn from_env(opts: impl IntoIterator<Item = KrakenOption>) -> Result<Self> {
        let api_key = std::env::var("KRAKEN_API_KEY").map_err(|_| {
            Error::Credentials("KRAKEN_API_KEY environment variable not set".to_string())
        })?;
        let api_secret = std::env::var("KRAKEN_API_SECRET").map_err(|_| {
            Error::Credentials("KRAKEN_API_SECRET environment variable not set".to_string())
        })?;

        let env = [
            KrakenOption::ApiKey(api_key),
            KrakenOption::ApiSecret(api_secret),
        ];
        Self::new(env.into_iter().chain(opts))
    }
}

#[async_trait]
impl ImageCompressor for KrakenClient {
    /// The filename is not sent, Kraken gets a random one.
    async fn upload(&self, file: Vec<u8>, _filename: &str) -> Result<CompressedFile> {
        let data = kraken_request_data(&self.api_key, &self.api_secret)
            .map_err(|e| compress_error(SERVICE, e))?;

        let part = Part::bytes(file)
            .file_name(uuid::Uuid::new_v4().to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Internal(f!("failed create http request: {e}")))?;
        let form = Form::new().text("data", data).part("upload", part);

        debug!("uploading image to {}", self.api_url);

        let body = send(
            SERVICE,
            self.http_client.post(&self.api_url).multipart(form),
        )
        .await?;

        let url = parse_kraken_response(&body).map_err(|e| compress_error(SERVICE, e))?;

        Ok(CompressedFile { url })
    }
}
