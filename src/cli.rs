// CLI module for handling command-line interface

use crate::config::{Architecture, SchemaVersion};
use crate::constants;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ccdl")]
#[command(about = "Resolve and download offline installer packages from the vendor catalog")]
#[command(version)]
pub struct Cli {
    /// Catalog schema version
    #[arg(long, global = true, value_enum, default_value = "6")]
    pub schema: SchemaVersion,

    /// Target architecture (defaults to the host's)
    #[arg(long, global = true, value_enum)]
    pub arch: Option<Architecture>,

    /// Read the catalog from a saved XML file instead of the network
    #[arg(long, global = true, env = "CCDL_CATALOG_FILE")]
    pub catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List products that can be downloaded
    Products,
    /// List downloadable versions of a product, newest first
    Versions { code: String },
    /// Show the build chosen for a product and each of its dependencies
    Resolve {
        code: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Download a product and its dependencies into a session directory
    Download {
        code: String,
        #[arg(long)]
        version: Option<String>,
        /// Install language, or ALL for every language package
        #[arg(long, default_value = constants::DEFAULT_LANGUAGE)]
        language: String,
        /// Destination root (defaults to $CCDL_DIR or the current directory)
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Number of packages downloaded concurrently
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
}
