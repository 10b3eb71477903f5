// Catalog module: normalized product catalog and its parser

use crate::config::SchemaVersion;
use crate::error::Result;
use log::info;
use std::path::Path;

pub mod full_product;
pub mod layout;
pub mod model;
pub mod parser;

pub use model::{Catalog, DependencyRef, ParseWarning, Product, VersionRecord};
pub use parser::parse;

/// Parse a catalog previously saved to disk.
pub fn load_file(
    path: &Path,
    schema: SchemaVersion,
    allowed_platforms: &[String],
) -> Result<Catalog> {
    info!("Loading catalog from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    parse(&raw, schema, allowed_platforms)
}
