// Download command for fetching a product and its dependencies

use super::Context;
use crate::config;
use crate::report::PackageStatus;
use crate::session::{Session, SessionRequest};
use crate::ui;
use std::path::PathBuf;

pub struct DownloadArgs {
    pub code: String,
    pub version: Option<String>,
    pub language: String,
    pub dest: Option<PathBuf>,
    pub jobs: usize,
}

pub async fn download(ctx: &Context, args: DownloadArgs) -> anyhow::Result<i32> {
    let catalog = ctx.load_catalog().await?;

    let request = SessionRequest {
        product_code: args.code,
        version: args.version,
        language: args.language,
        architecture: ctx.arch,
        destination: args.dest.unwrap_or_else(config::output_dir),
        jobs: args.jobs,
    };

    let session = Session::new(
        &catalog,
        ctx.client.clone(),
        ctx.client.clone(),
        ctx.cancel.clone(),
    )
    .with_chunk_size(config::chunk_size());

    let bars = ui::DownloadBars::new();
    let summary = session.run(&request, &bars).await?;

    for outcome in &summary.outcomes {
        let label = format!(
            "[{}_{}]",
            outcome.product.product_code, outcome.product.product_version
        );
        let file = outcome
            .task
            .as_ref()
            .map(|t| t.file_name())
            .unwrap_or_default();
        match &outcome.result {
            Ok(r) if r.skipped => ui::dim(&format!("{} {} already complete", label, file)),
            Ok(r) => ui::success(&format!("{} {} ({} bytes)", label, file, r.bytes_written)),
            Err(e) => ui::error(&format!("{} {} {}", label, file, e)),
        }
    }

    let report = &summary.report;
    ui::action(&format!(
        "{} downloaded, {} skipped, {} failed in {}",
        report.count(PackageStatus::Downloaded),
        report.count(PackageStatus::Skipped),
        report.count(PackageStatus::Failed),
        summary.directory.display()
    ));

    if summary
        .failures()
        .any(|o| o.result.as_ref().is_err_and(|e| e.is_retryable()))
    {
        ui::dim("Run the same command again to resume interrupted transfers.");
    }

    // Exit codes:
    // 0 = every package complete
    // 2 = at least one package failed
    if summary.failures().next().is_some() {
        Ok(2)
    } else {
        Ok(0)
    }
}
