// Version selection and dependency resolution over a parsed catalog

use crate::catalog::{Catalog, DependencyRef, Product, VersionRecord};
use crate::error::{CcdlError, Result};
use log::debug;
use std::collections::HashSet;

/// A visible product that has at least one downloadable version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableProduct {
    pub code: String,
    pub display_name: String,
    pub latest_version: String,
}

/// A concrete build chosen for one product of a download set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub product_code: String,
    pub product_version: String,
    pub base_version: String,
    pub build_guid: String,
    pub platform: String,
}

impl From<&VersionRecord> for ResolvedDependency {
    fn from(v: &VersionRecord) -> Self {
        Self {
            product_code: v.product_code.clone(),
            product_version: v.product_version.clone(),
            base_version: v.base_version.clone(),
            build_guid: v.build_guid.clone(),
            platform: v.platform.clone(),
        }
    }
}

/// Versions of `product` that can be downloaded on `allowed_platforms`,
/// most recently listed first.
pub fn selectable_versions<'a>(
    product: &'a Product,
    allowed_platforms: &[String],
) -> Vec<&'a VersionRecord> {
    product
        .versions()
        .iter()
        .rev()
        .filter(|v| v.has_build() && v.is_on(allowed_platforms))
        .collect()
}

pub fn latest_version<'a>(
    product: &'a Product,
    allowed_platforms: &[String],
) -> Option<&'a VersionRecord> {
    product
        .versions()
        .iter()
        .rev()
        .find(|v| v.has_build() && v.is_on(allowed_platforms))
}

/// Every non-hidden product with an eligible version, in catalog order.
pub fn select_latest_visible(
    catalog: &Catalog,
    allowed_platforms: &[String],
) -> Vec<SelectableProduct> {
    catalog
        .products()
        .iter()
        .filter(|p| !p.hidden)
        .filter_map(|p| {
            latest_version(p, allowed_platforms).map(|v| SelectableProduct {
                code: p.code.clone(),
                display_name: p.display_name.clone(),
                latest_version: v.product_version.clone(),
            })
        })
        .collect()
}

/// Pick a selectable version of a product, or its latest one.
pub fn select_version<'a>(
    catalog: &'a Catalog,
    product_code: &str,
    requested_version: Option<&str>,
    allowed_platforms: &[String],
) -> Result<&'a VersionRecord> {
    let product = catalog
        .product(product_code)
        .ok_or_else(|| CcdlError::NotFound(format!("product '{}'", product_code)))?;

    match requested_version {
        Some(wanted) => selectable_versions(product, allowed_platforms)
            .into_iter()
            .find(|v| v.product_version == wanted)
            .ok_or_else(|| {
                CcdlError::NotFound(format!(
                    "version '{}' of '{}' for platforms {}",
                    wanted,
                    product_code,
                    allowed_platforms.join(", ")
                ))
            }),
        None => latest_version(product, allowed_platforms).ok_or_else(|| {
            CcdlError::NotFound(format!(
                "downloadable version of '{}' for platforms {}",
                product_code,
                allowed_platforms.join(", ")
            ))
        }),
    }
}

/// Resolve each declared dependency of `record` to a concrete build.
///
/// The first record matching the dependency's base version on an allowed
/// platform wins; otherwise the first match on any platform is used.
pub fn resolve_dependencies(
    catalog: &Catalog,
    record: &VersionRecord,
    allowed_platforms: &[String],
) -> Result<Vec<ResolvedDependency>> {
    record
        .dependencies
        .iter()
        .map(|dep| resolve_one(catalog, dep, allowed_platforms))
        .collect()
}

fn resolve_one(
    catalog: &Catalog,
    dep: &DependencyRef,
    allowed_platforms: &[String],
) -> Result<ResolvedDependency> {
    let unresolved = || CcdlError::UnresolvedDependency {
        product_code: dep.product_code.clone(),
        base_version: dep.base_version.clone(),
    };

    let product = catalog.product(&dep.product_code).ok_or_else(unresolved)?;

    let mut first: Option<&VersionRecord> = None;
    let mut preferred: Option<&VersionRecord> = None;
    for v in product
        .versions()
        .iter()
        .filter(|v| v.base_version == dep.base_version)
    {
        if first.is_none() {
            first = Some(v);
        }
        if v.is_on(allowed_platforms) {
            preferred = Some(v);
            break;
        }
    }

    let chosen = preferred.or(first).ok_or_else(unresolved)?;
    if preferred.is_none() {
        debug!(
            "No allowed platform for {} {}, falling back to {}",
            dep.product_code, dep.base_version, chosen.platform
        );
    }
    Ok(chosen.into())
}

/// The selected version followed by its resolved dependencies.
///
/// Each `(product_code, build_guid)` pair appears once, at its first position.
pub fn resolve_download_set(
    catalog: &Catalog,
    record: &VersionRecord,
    allowed_platforms: &[String],
) -> Result<Vec<ResolvedDependency>> {
    let mut seen = HashSet::new();
    let set = std::iter::once(ResolvedDependency::from(record))
        .chain(resolve_dependencies(catalog, record, allowed_platforms)?)
        .filter(|d| seen.insert((d.product_code.clone(), d.build_guid.clone())))
        .collect();
    Ok(set)
}
