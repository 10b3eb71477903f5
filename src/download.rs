// Download manager: idempotent, size-checked package transfers

use crate::error::{BoxError, CcdlError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

pub type ByteStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// Network side of a download, so transfers can run against any byte source.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Size reported by a header-only request, if the server reports one.
    async fn content_length(&self, url: &str) -> std::result::Result<Option<u64>, BoxError>;

    /// Open the body of `url` as a stream of byte chunks.
    async fn open(&self, url: &str) -> std::result::Result<ByteStream, BoxError>;
}

/// Receives `(bytes transferred so far, expected total)` updates.
pub trait ProgressSink: Send + Sync {
    fn update(&self, transferred: u64, total: u64);
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _transferred: u64, _total: u64) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub destination: PathBuf,
    /// Size advertised by package metadata; the header-only request takes precedence.
    pub expected_size: Option<u64>,
    pub product_code: String,
    pub version: String,
}

impl DownloadTask {
    /// Task writing into `dir`, named after the URL unless `name` is given.
    pub fn new(
        url: impl Into<String>,
        dir: &Path,
        name: Option<&str>,
        product_code: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let file_name = name
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_url(&url));
        Self {
            destination: dir.join(file_name),
            url,
            expected_size: None,
            product_code: product_code.into(),
            version: version.into(),
        }
    }

    pub fn with_expected_size(mut self, size: Option<u64>) -> Self {
        self.expected_size = size;
        self
    }

    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Last path segment of a URL with the query string removed.
pub fn file_name_from_url(url: &str) -> String {
    url.split('?')
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("download.bin")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    SizeChecked,
    Skipped,
    Transferring,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub bytes_written: u64,
    pub skipped: bool,
    /// Hex SHA-256 of the bytes transferred in this run.
    pub sha256: Option<String>,
}

pub struct Downloader {
    transport: Arc<dyn Transport>,
    chunk_size: usize,
    cancel: CancellationToken,
}

impl Downloader {
    pub fn new(transport: Arc<dyn Transport>, cancel: CancellationToken) -> Self {
        Self {
            transport,
            chunk_size: crate::constants::DEFAULT_CHUNK_SIZE,
            cancel,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn download(
        &self,
        task: &DownloadTask,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadResult> {
        let mut state = DownloadState::Pending;
        let result = self.run(task, progress, &mut state).await;
        if result.is_err() {
            transition(task, &mut state, DownloadState::Failed);
        }
        result
    }

    async fn run(
        &self,
        task: &DownloadTask,
        progress: &dyn ProgressSink,
        state: &mut DownloadState,
    ) -> Result<DownloadResult> {
        if self.cancel.is_cancelled() {
            return Err(CcdlError::Cancelled);
        }

        let reported = self
            .transport
            .content_length(&task.url)
            .await
            .map_err(|e| CcdlError::transfer(&task.url, e))?;
        let expected = reported.or(task.expected_size);
        transition(task, state, DownloadState::SizeChecked);

        if let Some(size) = expected
            && existing_size(&task.destination).await == Some(size)
        {
            info!(
                "[{}_{}] {} already exists, skipping",
                task.product_code,
                task.version,
                task.file_name()
            );
            transition(task, state, DownloadState::Skipped);
            progress.update(size, size);
            return Ok(DownloadResult {
                bytes_written: 0,
                skipped: true,
                sha256: None,
            });
        }

        transition(task, state, DownloadState::Transferring);
        let (written, sha256) = self.transfer(task, expected, progress).await?;

        if let Some(size) = expected
            && size != written
        {
            return Err(CcdlError::IncompleteTransfer {
                url: task.url.clone(),
                expected: size,
                actual: written,
            });
        }

        transition(task, state, DownloadState::Completed);
        Ok(DownloadResult {
            bytes_written: written,
            skipped: false,
            sha256: Some(sha256),
        })
    }

    /// Stream the body to the destination; a partial file stays on failure.
    async fn transfer(
        &self,
        task: &DownloadTask,
        expected: Option<u64>,
        progress: &dyn ProgressSink,
    ) -> Result<(u64, String)> {
        let mut stream = self
            .transport
            .open(&task.url)
            .await
            .map_err(|e| CcdlError::transfer(&task.url, e))?;

        if let Some(parent) = task.destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&task.destination).await?;
        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let total = expected.unwrap_or(0);

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    file.flush().await?;
                    return Err(CcdlError::Cancelled);
                }
                item = stream.next() => item,
            };
            let Some(item) = next else { break };
            let data = match item {
                Ok(data) => data,
                Err(e) => {
                    file.flush().await?;
                    return Err(CcdlError::transfer(&task.url, e));
                }
            };

            for chunk in data.chunks(self.chunk_size) {
                if self.cancel.is_cancelled() {
                    file.flush().await?;
                    return Err(CcdlError::Cancelled);
                }
                file.write_all(chunk).await?;
                hasher.update(chunk);
                written += chunk.len() as u64;
                progress.update(written, total);
            }
        }

        file.flush().await?;
        Ok((written, hex::encode(hasher.finalize())))
    }
}

fn transition(task: &DownloadTask, state: &mut DownloadState, next: DownloadState) {
    debug!(
        "[{}_{}] {:?} -> {:?}",
        task.product_code, task.version, state, next
    );
    *state = next;
}

async fn existing_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}
