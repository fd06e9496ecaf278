use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use webhelpers_core::cloudstorage::{public_url, sign_url, HmacKey};

use super::{CloudFile, CloudStorage};
use crate::option::{apply_options, non_empty, valid_url, Configure, OptionError};
use crate::prelude::*;

/// Google Cloud Storage JSON API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Bucket used when none is configured
pub const DEFAULT_BUCKET: &str = "example-test";

/// Google Cloud Storage configuration option
#[derive(Debug, Clone)]
pub enum GcsOption {
    Bucket(String),
    /// OAuth2 bearer token for the JSON API
    AccessToken(String),
    /// HMAC key used to sign URLs
    HmacKey { access_id: String, secret: String },
    HttpClient(reqwest::Client),
    /// JSON API endpoint, defaults to [`DEFAULT_ENDPOINT`]
    Endpoint(String),
}

#[derive(Debug, Default)]
pub struct GcsConfig {
    bucket: String,
    access_token: Option<String>,
    hmac_key: Option<HmacKey>,
    http_client: reqwest::Client,
    endpoint: String,
}

impl Configure<GcsConfig> for GcsOption {
    fn apply(self, config: &mut GcsConfig) -> Result<(), OptionError> {
        match self {
            GcsOption::Bucket(bucket) => config.bucket = non_empty(bucket, "gcs.bucket")?,
            GcsOption::AccessToken(token) => {
                config.access_token = Some(non_empty(token, "gcs.access_token")?)
            }
            GcsOption::HmacKey { access_id, secret } => {
                config.hmac_key = Some(HmacKey {
                    access_id: non_empty(access_id, "gcs.hmac_access_id")?,
                    secret: non_empty(secret, "gcs.hmac_secret")?,
                })
            }
            GcsOption::HttpClient(client) => config.http_client = client,
            GcsOption::Endpoint(url) => config.endpoint = valid_url(url, "gcs.endpoint")?,
        }
        Ok(())
    }
}

fn default_options() -> Vec<GcsOption> {
    vec![
        GcsOption::Bucket(DEFAULT_BUCKET.to_string()),
        GcsOption::Endpoint(DEFAULT_ENDPOINT.to_string()),
    ]
}

/// Options built from environment variables, looked up with `lookup`.
///
/// `GCS_ACCESS_TOKEN` is required. `GCS_HMAC_ACCESS_ID` and `GCS_HMAC_SECRET`
/// are optional and only used when both are set.
fn env_options(lookup: impl Fn(&str) -> Option<String>) -> Result<Vec<GcsOption>> {
    let token = lookup("GCS_ACCESS_TOKEN").ok_or_else(|| {
        Error::Credentials("GCS_ACCESS_TOKEN environment variable not set".to_string())
    })?;

    let mut opts = vec![GcsOption::AccessToken(token)];
    if let (Some(access_id), Some(secret)) =
        (lookup("GCS_HMAC_ACCESS_ID"), lookup("GCS_HMAC_SECRET"))
    {
        opts.push(GcsOption::HmacKey { access_id, secret });
    }

    Ok(opts)
}

/// Google Cloud Storage client bound to one bucket
#[derive(Debug, Clone)]
pub struct GcsClient {
    bucket: String,
    access_token: String,
    hmac_key: Option<HmacKey>,
    http_client: reqwest::Client,
    endpoint: String,
}

impl GcsClient {
    /// Build a client from `opts`. An `AccessToken` option is required.
    pub fn new(opts: impl IntoIterator<Item = GcsOption>) -> Result<Self> {
        let config: GcsConfig = apply_options(default_options(), opts)?;

        let access_token = config.access_token.ok_or_else(|| {
            Error::Credentials("gcs.access_token option is required".to_string())
        })?;

        Ok(Self {
            bucket: config.bucket,
            access_token,
            hmac_key: config.hmac_key,
            http_client: config.http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from `GCS_ACCESS_TOKEN` and, when both are set,
    /// `GCS_HMAC_ACCESS_ID`/`GCS_HMAC_SECRET`, then `opts`.
    pub fn from_env(opts: impl IntoIterator<Item = GcsOption>) -> Result<Self> {
        let env = env_options(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))?;
        Self::new(env.into_iter().chain(opts))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of `object` in the configured bucket.
    pub fn build_url(&self, object: &str) -> String {
        public_url(&self.bucket, object)
    }

    /// Signed URL of `object`, valid until `expires`.
    pub fn signed_url(&self, object: &str, expires: DateTime<Utc>) -> Result<String> {
        let context = f!(
            "failed to signed url for object {object} in bucket {}",
            self.bucket
        );

        let key = self
            .hmac_key
            .as_ref()
            .ok_or_else(|| Error::storage(context.clone(), "no HMAC key configured"))?;

        sign_url(key, &self.bucket, object, expires, Utc::now())
            .map_err(|e| Error::storage(context, e))
    }

    fn upload_url(&self) -> String {
        f!(
            "{}/upload/storage/v1/b/{}/o",
            self.endpoint,
            urlencoding::encode(&self.bucket)
        )
    }

    fn object_url(&self, object: &str) -> String {
        f!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(object)
        )
    }
}

/// Turn a non-success response into an error carrying its status and body.
async fn check_response(
    response: reqwest::Response,
    context: String,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!("failed to read {status} response body: {err}");
            String::new()
        }
    };
    Err(Error::storage(context, f!("[{status}]: {body}")))
}

#[async_trait]
impl CloudStorage for GcsClient {
    async fn upload(
        &self,
        file: Vec<u8>,
        object: &str,
        expires: Option<DateTime<Utc>>,
    ) -> Result<CloudFile> {
        let context = f!("failed to copy file {object} to bucket {}", self.bucket);

        debug!("uploading {object} to bucket {}", self.bucket);

        let response = self
            .http_client
            .post(self.upload_url())
            .query(&[("uploadType", "media"), ("name", object)])
            .bearer_auth(&self.access_token)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
            .body(file)
            .send()
            .await
            .map_err(|e| Error::storage(context.clone(), e))?;
        check_response(response, context).await?;

        // Immediately return the public URL if expires is not configured
        let Some(expires) = expires else {
            return Ok(CloudFile {
                url: self.build_url(object),
            });
        };

        Ok(CloudFile {
            url: self.signed_url(object, expires)?,
        })
    }

    async fn delete(&self, object: &str) -> Result<()> {
        let context = f!("failed to delete file {object} on bucket {}", self.bucket);

        debug!("deleting {object} from bucket {}", self.bucket);

        let response = self
            .http_client
            .delete(self.object_url(object))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::storage(context.clone(), e))?;
        check_response(response, context).await?;

        Ok(())
    }
}
