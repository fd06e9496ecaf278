use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use webhelpers_core::imagecompressor::parse_resmush_response;

use super::{compress_error, send, CompressedFile, ImageCompressor};
use crate::option::{apply_options, valid_url, Configure, OptionError};
use crate::prelude::*;

/// API URL for reSmush
pub const API_URL: &str = "http://api.resmush.it/ws.php";

const SERVICE: &str = "resmush";

/// reSmush configuration option
#[derive(Debug, Clone)]
pub enum ReSmushOption {
    HttpClient(reqwest::Client),
    /// Upload endpoint, defaults to [`API_URL`]
    ApiUrl(String),
}

#[derive(Debug, Default)]
pub struct ReSmushConfig {
    http_client: reqwest::Client,
    api_url: String,
}

impl Configure<ReSmushConfig> for ReSmushOption {
    fn apply(self, config: &mut ReSmushConfig) -> Result<(), OptionError> {
        match self {
            ReSmushOption::HttpClient(client) => config.http_client = client,
            ReSmushOption::ApiUrl(url) => config.api_url = valid_url(url, "resmush.api_url")?,
        }
        Ok(())
    }
}

fn default_options() -> Vec<ReSmushOption> {
    vec![ReSmushOption::ApiUrl(API_URL.to_string())]
}

/// reSmush.it image compression client
///
/// reSmush takes a `qlty` quality parameter (0-100). It is not sent, so the
/// service default of 92 applies.
#[derive(Debug, Clone)]
pub struct ReSmushClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl ReSmushClient {
    pub fn new(opts: impl IntoIterator<Item = ReSmushOption>) -> Result<Self> {
        let config: ReSmushConfig = apply_options(default_options(), opts)?;

        Ok(Self {
            http_client: config.http_client,
            api_url: config.api_url,
        })
    }
}

#[async_trait]
impl ImageCompressor for ReSmushClient {
    async fn upload(&self, file: Vec<u8>, filename: &str) -> Result<CompressedFile> {
        if filename.is_empty() {
            return Err(Error::External(
                "filename for reSmush can't be empty".to_string(),
            ));
        }

        let part = Part::bytes(file)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Internal(f!("failed create http request: {e}")))?;
        let form = Form::new().part("files", part);

        debug!("uploading {filename} to {}", self.api_url);

        let body = send(
            SERVICE,
            self.http_client.post(&self.api_url).multipart(form),
        )
        .await?;

        let url = parse_resmush_response(&body).map_err(|e| compress_error(SERVICE, e))?;

        Ok(CompressedFile { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBody, MockServer};
    use axum::http::StatusCode;
    use serde_json::json;

    fn client_for(srv: &MockServer) -> ReSmushClient {
        ReSmushClient::new([ReSmushOption::ApiUrl(f!("{}/ws.php", srv.url()))]).unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let client = ReSmushClient::new([]).unwrap();
        assert_eq!(client.api_url, API_URL);
    }

    #[test]
    fn test_new_overrides_in_order() {
        let client = ReSmushClient::new([
            ReSmushOption::ApiUrl("http://first.example/ws.php".to_string()),
            ReSmushOption::ApiUrl("http://second.example/ws.php".to_string()),
        ])
        .unwrap();
        assert_eq!(client.api_url, "http://second.example/ws.php");
    }

    #[test]
    fn test_new_invalid_api_url() {
        let err = ReSmushClient::new([ReSmushOption::ApiUrl(String::new())]).unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("failed to set resmush.api_url"));
    }

    #[tokio::test]
    async fn test_upload_empty_filename() {
        let client = ReSmushClient::new([]).unwrap();
        let err = client.upload(b"image".to_vec(), "").await.unwrap_err();

        assert!(err.is_external());
        assert_eq!(
            err.to_string(),
            "filename for reSmush can't be empty: external error"
        );
    }

    #[tokio::test]
    async fn test_upload_success() {
        let srv = MockServer::start(
            "/ws.php",
            StatusCode::OK,
            MockBody::json(&json!({
                "src": "http://resmush.it/assets/images/jpg_example_original.jpg",
                "dest": "http://par.resmush.it/6b3eb2d0c9e5d6c3a9d5e5f5e5d5c5b5/jpg_example_original.jpg",
                "src_size": 5,
                "dest_size": 4,
                "percent": 20,
                "expires": "Fri, 12 Aug 2022 08:21:36 +0200",
                "generator": "reSmush.it rev.3.0.4.20211124"
            })),
        )
        .await
        .unwrap();

        let client = client_for(&srv);
        let got = client.upload(b"image".to_vec(), "image.jpg").await.unwrap();

        assert_eq!(
            got.url,
            "http://par.resmush.it/6b3eb2d0c9e5d6c3a9d5e5f5e5d5c5b5/jpg_example_original.jpg"
        );

        let requests = srv.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, reqwest::Method::POST);
        let body = requests[0].body_text();
        assert!(body.contains(r#"name="files"; filename="image.jpg""#));
        assert!(!body.contains("qlty"));

        srv.close().await;
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let srv = MockServer::start(
            "/ws.php",
            StatusCode::OK,
            MockBody::json(&json!({"error": 403, "error_long": "Image too large"})),
        )
        .await
        .unwrap();

        let client = client_for(&srv);
        let err = client.upload(b"image".to_vec(), "image.jpg").await.unwrap_err();

        assert!(err.is_external());
        assert!(err.to_string().contains("Image too large"));

        srv.close().await;
    }

    #[tokio::test]
    async fn test_upload_malformed_response() {
        let srv = MockServer::start("/ws.php", StatusCode::OK, "not json")
            .await
            .unwrap();

        let client = client_for(&srv);
        let err = client.upload(b"image".to_vec(), "image.jpg").await.unwrap_err();

        assert!(err.is_internal());
        assert!(err.to_string().starts_with("failed unmarshal resmush data"));

        srv.close().await;
    }
}
