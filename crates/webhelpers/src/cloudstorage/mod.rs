//! Cloud storage clients
//!
//! [`CloudStorage`] uploads and deletes objects. [`gcs::GcsClient`] is the
//! Google Cloud Storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::prelude::*;

pub mod gcs;

/// A file stored in the cloud
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CloudFile {
    /// Public or signed URL of the file
    pub url: String,
}

/// Cloud object storage
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Upload `file` as `object` and return where it can be fetched.
    ///
    /// With `expires` set, the returned URL is a signed URL valid until then
    /// instead of the public URL.
    async fn upload(
        &self,
        file: Vec<u8>,
        object: &str,
        expires: Option<DateTime<Utc>>,
    ) -> Result<CloudFile>;

    /// Delete `object`.
    async fn delete(&self, object: &str) -> Result<()>;
}
