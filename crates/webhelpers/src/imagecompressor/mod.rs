//! Image compression service clients
//!
//! Every service implements [`ImageCompressor`]. Pick one through its
//! constructor: [`kraken::KrakenClient`], [`resmush::ReSmushClient`] or
//! [`tinify::TinifyClient`].

use async_trait::async_trait;
use webhelpers_core::imagecompressor::CompressError;

use crate::prelude::*;

pub mod kraken;
pub mod resmush;
pub mod tinify;

/// A file compressed by an image compression service
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompressedFile {
    /// Public URL of the compressed file
    pub url: String,
}

/// Image compression service
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    /// Upload `file` to the service and return the compressed file.
    ///
    /// `filename` is optional for some services. Only reSmush requires it.
    async fn upload(&self, file: Vec<u8>, filename: &str) -> Result<CompressedFile>;
}

/// Map a response parsing failure of `service` to the crate error taxonomy.
pub(crate) fn compress_error(service: &str, err: CompressError) -> Error {
    match err {
        CompressError::Malformed(msg) => {
            Error::Internal(f!("failed unmarshal {service} data: {msg}"))
        }
        CompressError::Rejected(msg) => {
            Error::External(f!("failed to compress image from {service}: {msg}"))
        }
    }
}

/// Send `request` and read the whole response body. The status is not checked,
/// services report failures in the body.
pub(crate) async fn send(service: &str, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
    let response = request.send().await?;
    debug!("{service} responded with {}", response.status());

    Ok(response.bytes().await?.to_vec())
}
