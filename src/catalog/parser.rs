// Catalog parser: raw XML document to normalized Catalog

use crate::catalog::full_product;
use crate::catalog::layout::{self, Layout, layout_for};
use crate::catalog::model::{Catalog, DependencyRef, Product, VersionRecord};
use crate::config::SchemaVersion;
use crate::constants::{FULL_PRODUCT_CODE, VISIBLE_CATEGORY};
use crate::error::{CcdlError, Result};
use log::debug;
use roxmltree::{Document, Node};

/// Parse a catalog document of the given schema version.
///
/// `allowed_platforms` is only used for de-duplication: once a version key
/// holds a record on an allowed platform, further platform variants of that
/// product entry are ignored.
pub fn parse(raw: &str, schema: SchemaVersion, allowed_platforms: &[String]) -> Result<Catalog> {
    let doc = Document::parse(raw)
        .map_err(|e| CcdlError::parse(format!("not well-formed XML: {}", e)))?;
    let root = doc.root_element();
    let layout = layout_for(schema);

    let cdn = layout::find_text(root, layout.cdn)
        .ok_or_else(|| CcdlError::parse(format!("missing CDN node '{}'", layout.cdn)))?;
    let mut catalog = Catalog::new(cdn);

    let nodes = layout::find_all(root, layout.products);
    debug!(
        "Parsing {} product entries (schema {}, cdn {})",
        nodes.len(),
        schema,
        cdn
    );

    for node in nodes {
        parse_product(&mut catalog, root, node, layout, allowed_platforms)?;
    }

    Ok(catalog)
}

/// Products are visible only when their grandparent category is the visible one.
fn is_hidden(product: Node<'_, '_>) -> bool {
    product
        .parent_element()
        .and_then(|p| p.parent_element())
        .and_then(|category| category.attribute("name"))
        != Some(VISIBLE_CATEGORY)
}

fn parse_product(
    catalog: &mut Catalog,
    root: Node<'_, '_>,
    node: Node<'_, '_>,
    layout: &Layout,
    allowed_platforms: &[String],
) -> Result<()> {
    let code = node
        .attribute("id")
        .ok_or_else(|| CcdlError::parse("product entry without 'id'"))?;
    let display_name = layout::find_text(node, "displayName")
        .ok_or_else(|| CcdlError::parse(format!("product {} has no displayName", code)))?;
    let listed_version = node
        .attribute("version")
        .ok_or_else(|| CcdlError::parse(format!("product {} has no version", code)))?;

    let mut warnings = Vec::new();
    let product = catalog.add_product(Product::new(code, display_name, is_hidden(node)));
    // Key of the record an earlier variant of this entry stored
    let mut entry_key: Option<String> = None;

    for platform in layout::find_all(node, "platforms/platform") {
        if let Some(key) = &entry_key
            && holds_allowed(product, key, allowed_platforms)
        {
            break;
        }

        let (key, warning) = if code == FULL_PRODUCT_CODE {
            full_product::app_version(root, platform, code, listed_version, layout)?
        } else {
            (listed_version.to_string(), None)
        };
        if holds_allowed(product, &key, allowed_platforms) {
            break;
        }

        let record = if code == FULL_PRODUCT_CODE {
            VersionRecord {
                product_version: key.clone(),
                base_version: listed_version.to_string(),
                build_guid: full_product::manifest_url(platform, code, listed_version)?,
                ..version_record(code, listed_version, platform)?
            }
        } else {
            version_record(code, listed_version, platform)?
        };

        warnings.extend(warning);
        product.insert_version(record);
        entry_key = Some(key);
    }

    for w in warnings {
        catalog.push_warning(w);
    }
    Ok(())
}

/// Whether `key` already holds a record on an allowed platform.
fn holds_allowed(product: &Product, key: &str, allowed_platforms: &[String]) -> bool {
    product
        .version(key)
        .is_some_and(|existing| existing.is_on(allowed_platforms))
}

fn version_record(
    code: &str,
    product_version: &str,
    platform: Node<'_, '_>,
) -> Result<VersionRecord> {
    let language_set = layout::find(platform, "languageSet").ok_or_else(|| {
        CcdlError::parse(format!(
            "{} {} platform has no languageSet",
            code, product_version
        ))
    })?;

    Ok(VersionRecord {
        product_code: code.to_string(),
        product_version: product_version.to_string(),
        base_version: language_set
            .attribute("baseVersion")
            .unwrap_or_default()
            .to_string(),
        platform: platform.attribute("id").unwrap_or_default().to_string(),
        build_guid: language_set
            .attribute("buildGuid")
            .unwrap_or_default()
            .to_string(),
        dependencies: dependencies(code, language_set)?,
    })
}

fn dependencies(code: &str, language_set: Node<'_, '_>) -> Result<Vec<DependencyRef>> {
    layout::find_all(language_set, "dependencies/dependency")
        .into_iter()
        .map(|d| {
            let product_code = layout::find_text(d, "sapCode");
            let base_version = layout::find_text(d, "baseVersion");
            match (product_code, base_version) {
                (Some(p), Some(b)) => Ok(DependencyRef::new(p, b)),
                _ => Err(CcdlError::parse(format!(
                    "incomplete dependency declaration in {}",
                    code
                ))),
            }
        })
        .collect()
}
