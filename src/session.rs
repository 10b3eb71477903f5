// Session module: resolve a product, fetch package metadata and download every package

use crate::catalog::Catalog;
use crate::config::Architecture;
use crate::constants;
use crate::download::{DownloadResult, DownloadTask, Downloader, ProgressSink, Transport};
use crate::driver;
use crate::error::Result;
use crate::metadata::{MetadataFetcher, MetadataSource};
use crate::report::{PackageReport, PackageStatus, SessionReport};
use crate::resolver::{self, ResolvedDependency};
use futures::StreamExt;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What the caller selected.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub product_code: String,
    pub version: Option<String>,
    pub language: String,
    pub architecture: Architecture,
    pub destination: PathBuf,
    pub jobs: usize,
}

/// Hands out one progress reporter per download task.
pub trait ProgressFactory: Send + Sync {
    fn reporter(&self, task: &DownloadTask) -> Box<dyn ProgressSink>;
}

/// Outcome of one package; metadata failures carry no task.
#[derive(Debug)]
pub struct PackageOutcome {
    pub product: ResolvedDependency,
    pub task: Option<DownloadTask>,
    pub result: Result<DownloadResult>,
}

impl PackageOutcome {
    fn to_report(&self) -> PackageReport {
        let (status, bytes, sha256, error) = match &self.result {
            Ok(r) if r.skipped => (PackageStatus::Skipped, 0, None, None),
            Ok(r) => (PackageStatus::Downloaded, r.bytes_written, r.sha256.clone(), None),
            Err(e) => (PackageStatus::Failed, 0, None, Some(e.to_string())),
        };
        PackageReport {
            product_code: self.product.product_code.clone(),
            version: self.product.product_version.clone(),
            build_guid: self.product.build_guid.clone(),
            file: self.task.as_ref().map(|t| t.file_name()),
            url: self.task.as_ref().map(|t| t.url.clone()),
            status,
            bytes,
            sha256,
            error,
        }
    }
}

#[derive(Debug)]
pub struct SessionSummary {
    pub directory: PathBuf,
    pub outcomes: Vec<PackageOutcome>,
    pub report: SessionReport,
}

impl SessionSummary {
    pub fn failures(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

pub struct Session<'a> {
    catalog: &'a Catalog,
    metadata: MetadataFetcher,
    downloader: Downloader,
}

impl<'a> Session<'a> {
    pub fn new(
        catalog: &'a Catalog,
        metadata_source: Arc<dyn MetadataSource>,
        transport: Arc<dyn Transport>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            catalog,
            metadata: MetadataFetcher::new(metadata_source, catalog.cdn(), cancel.clone()),
            downloader: Downloader::new(transport, cancel),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.downloader = self.downloader.with_chunk_size(chunk_size);
        self
    }

    /// Session directory for a resolved selection.
    pub fn directory(request: &SessionRequest, version: &str) -> PathBuf {
        request.destination.join(format!(
            "{}_{}-{}-{}",
            request.product_code, version, request.language, request.architecture
        ))
    }

    /// Resolve the selection and download its full package set.
    ///
    /// Selection and dependency errors abort the session. Metadata and
    /// transfer errors are recorded per package and the rest proceed.
    pub async fn run(
        &self,
        request: &SessionRequest,
        progress: &dyn ProgressFactory,
    ) -> Result<SessionSummary> {
        let allowed = request.architecture.allowed_platforms();
        let record = resolver::select_version(
            self.catalog,
            &request.product_code,
            request.version.as_deref(),
            &allowed,
        )?;
        let set = resolver::resolve_download_set(self.catalog, record, &allowed)?;
        info!(
            "Resolved {} {} to {} product(s)",
            record.product_code,
            record.product_version,
            set.len()
        );

        let directory = Self::directory(request, &record.product_version);
        let products_dir = directory.join(constants::PRODUCTS_DIR);
        tokio::fs::create_dir_all(&products_dir).await?;

        let display_name = self
            .catalog
            .product(&record.product_code)
            .map(|p| p.display_name.as_str())
            .unwrap_or(record.product_code.as_str());
        tokio::fs::write(
            products_dir.join(constants::DRIVER_FILE),
            driver::render(display_name, record, &request.language),
        )
        .await?;

        let mut outcomes = Vec::new();
        let mut pending = Vec::new();
        for product in set {
            match self.plan(&product, &products_dir, &request.language).await {
                Ok(tasks) => pending.extend(tasks.into_iter().map(|t| (product.clone(), t))),
                Err(e) => {
                    warn!(
                        "[{}_{}] metadata for build '{}' unusable: {}",
                        product.product_code, product.product_version, product.build_guid, e
                    );
                    outcomes.push(PackageOutcome {
                        product,
                        task: None,
                        result: Err(e),
                    });
                }
            }
        }

        let downloads: Vec<PackageOutcome> = futures::stream::iter(pending)
            .map(|(product, task)| async move {
                let sink = progress.reporter(&task);
                let result = self.downloader.download(&task, sink.as_ref()).await;
                PackageOutcome {
                    product,
                    task: Some(task),
                    result,
                }
            })
            .buffered(request.jobs.max(1))
            .collect()
            .await;
        outcomes.extend(downloads);

        let mut report = SessionReport::new(
            &record.product_code,
            &record.product_version,
            &request.language,
            &request.architecture.to_string(),
        );
        for outcome in &outcomes {
            report.add_package(outcome.to_report());
        }
        report.save(&directory)?;

        Ok(SessionSummary {
            directory,
            outcomes,
            report,
        })
    }

    /// Download tasks for one resolved product.
    async fn plan(
        &self,
        product: &ResolvedDependency,
        products_dir: &Path,
        language: &str,
    ) -> Result<Vec<DownloadTask>> {
        let dir = products_dir.join(&product.product_code);
        tokio::fs::create_dir_all(&dir).await?;

        if product.product_code == constants::FULL_PRODUCT_CODE {
            let meta = self.metadata.fetch_manifest(&product.build_guid).await?;
            let task = DownloadTask::new(
                meta.url,
                &dir,
                None,
                &product.product_code,
                &product.product_version,
            )
            .with_expected_size(meta.size_bytes);
            return Ok(vec![task]);
        }

        let app = self.metadata.fetch_application(&product.build_guid).await?;
        tokio::fs::write(dir.join(constants::APPLICATION_JSON_FILE), &app.raw).await?;

        Ok(app
            .packages_for(language)
            .into_iter()
            .map(|p| {
                let meta = p.metadata(self.metadata.cdn());
                DownloadTask::new(
                    meta.url,
                    &dir,
                    None,
                    &product.product_code,
                    &product.product_version,
                )
                .with_expected_size(meta.size_bytes)
            })
            .collect())
    }
}
