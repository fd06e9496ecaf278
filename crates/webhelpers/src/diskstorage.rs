//! Buffer files in memory, write them to disk and download remote files.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::option::{apply_options, Configure, OptionError};
use crate::prelude::*;

/// Disk storage configuration option
#[derive(Debug, Clone)]
pub enum DiskStorageOption {
    /// Initial buffer contents
    Buffer(Vec<u8>),
    HttpClient(reqwest::Client),
}

#[derive(Debug, Default)]
pub struct DiskStorageConfig {
    buffer: Vec<u8>,
    http_client: reqwest::Client,
}

impl Configure<DiskStorageConfig> for DiskStorageOption {
    fn apply(self, config: &mut DiskStorageConfig) -> Result<(), OptionError> {
        match self {
            DiskStorageOption::Buffer(buffer) => config.buffer = buffer,
            DiskStorageOption::HttpClient(client) => config.http_client = client,
        }
        Ok(())
    }
}

fn default_options() -> Vec<DiskStorageOption> {
    vec![DiskStorageOption::Buffer(Vec::new())]
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// In-memory buffer backed file storage
#[derive(Debug)]
pub struct DiskStorage {
    buffer: Vec<u8>,
    http_client: reqwest::Client,
}

impl DiskStorage {
    pub fn new(opts: impl IntoIterator<Item = DiskStorageOption>) -> Result<Self> {
        let config: DiskStorageConfig = apply_options(default_options(), opts)?;

        Ok(Self {
            buffer: config.buffer,
            http_client: config.http_client,
        })
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Append `chunk` to the buffer.
    pub fn write(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Save the buffer to `path`, with unix permission bits `mode` when given.
    pub async fn write_file(&self, path: impl AsRef<Path>, mode: Option<u32>) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, &self.buffer).await?;

        if let Some(mode) = mode {
            set_mode(path, mode).await?;
        }

        Ok(())
    }

    /// Download `url` into the file at `path`.
    pub async fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let mut out = tokio::fs::File::create(path)
            .await
            .map_err(|e| Error::Internal(f!("failed to create file: {e}")))?;

        debug!("downloading {url} to {}", path.display());

        let mut response = self.http_client.get(url).send().await?;

        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk)
                .await
                .map_err(|e| Error::Internal(f!("failed writing to file: {e}")))?;
        }
        out.flush()
            .await
            .map_err(|e| Error::Internal(f!("failed writing to file: {e}")))?;

        Ok(())
    }

    /// Remove the file at `path`.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
