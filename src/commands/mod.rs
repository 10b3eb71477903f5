// Commands module: shared context for the CLI subcommands

use crate::catalog::{self, Catalog};
use crate::cli::Cli;
use crate::config::{Architecture, SchemaVersion};
use crate::error::CcdlError;
use crate::http::VendorClient;
use crate::ui;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod download;
pub mod products;
pub mod resolve;
pub mod versions;

pub struct Context {
    pub schema: SchemaVersion,
    pub arch: Architecture,
    pub catalog_file: Option<PathBuf>,
    pub client: Arc<VendorClient>,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<Self> {
        Ok(Self {
            schema: cli.schema,
            arch: cli.arch.unwrap_or_else(Architecture::host),
            catalog_file: cli.catalog_file.clone(),
            client: Arc::new(VendorClient::new()?),
            cancel,
        })
    }

    pub fn allowed_platforms(&self) -> Vec<String> {
        self.arch.allowed_platforms()
    }

    /// Fetch (or read) and parse the catalog, reporting parse warnings.
    pub async fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let allowed = self.allowed_platforms();

        let catalog = match &self.catalog_file {
            Some(path) => catalog::load_file(path, self.schema, &allowed)?,
            None => {
                let pb = ui::spinner(&format!("Downloading catalog ({})", self.schema));
                let raw = tokio::select! {
                    _ = self.cancel.cancelled() => Err(CcdlError::Cancelled),
                    raw = self.client.fetch_catalog(self.schema) => raw,
                };
                let raw = match raw {
                    Ok(raw) => raw,
                    Err(e) => {
                        ui::finish_spinner_error(&pb, "Catalog download failed");
                        return Err(e.into());
                    }
                };
                ui::finish_spinner_success(&pb, "Catalog downloaded");
                catalog::parse(&raw, self.schema, &allowed)?
            }
        };

        info!(
            "Catalog has {} products (cdn {})",
            catalog.products().len(),
            catalog.cdn()
        );
        for w in catalog.warnings() {
            ui::warning(&w.to_string());
        }
        Ok(catalog)
    }
}
