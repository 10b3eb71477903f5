// Normalized catalog model shared by the parser and the resolver

use std::collections::HashMap;
use std::fmt;

/// A dependency as declared by a version record, not yet tied to a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub product_code: String,
    pub base_version: String,
}

impl DependencyRef {
    pub fn new(product_code: impl Into<String>, base_version: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            base_version: base_version.into(),
        }
    }
}

/// One platform variant of a product version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub product_code: String,

    /// Key within the product; may carry vendor suffixes.
    pub product_version: String,

    /// Correlates dependency declarations across products.
    pub base_version: String,

    pub platform: String,

    /// Download-session token. Holds a manifest URL for the full product.
    pub build_guid: String,

    pub dependencies: Vec<DependencyRef>,
}

impl VersionRecord {
    pub fn has_build(&self) -> bool {
        !self.build_guid.is_empty()
    }

    pub fn is_on(&self, allowed_platforms: &[String]) -> bool {
        allowed_platforms.iter().any(|p| *p == self.platform)
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub code: String,
    pub display_name: String,
    pub hidden: bool,
    versions: Vec<VersionRecord>,
}

impl Product {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>, hidden: bool) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            hidden,
            versions: Vec::new(),
        }
    }

    /// Version records in catalog insertion order.
    pub fn versions(&self) -> &[VersionRecord] {
        &self.versions
    }

    pub fn version(&self, product_version: &str) -> Option<&VersionRecord> {
        self.versions
            .iter()
            .find(|v| v.product_version == product_version)
    }

    /// Insert a record keyed by its `product_version`.
    ///
    /// An existing record with the same key is replaced where it stands, so the
    /// key keeps the position of its first insertion.
    pub fn insert_version(&mut self, record: VersionRecord) {
        match self
            .versions
            .iter_mut()
            .find(|v| v.product_version == record.product_version)
        {
            Some(existing) => *existing = record,
            None => self.versions.push(record),
        }
    }
}

/// Non-fatal anomalies found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// No `builds/build` entry carried the application version of the full
    /// product, so the record is keyed by its installer-wrapper version.
    FullProductVersionNotFound {
        product_code: String,
        wrapper_version: String,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::FullProductVersionNotFound {
                product_code,
                wrapper_version,
            } => write!(
                f,
                "no application version found for {} {}; keeping installer version",
                product_code, wrapper_version
            ),
        }
    }
}

/// The full product set of one catalog fetch.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cdn: String,
    products: Vec<Product>,
    index: HashMap<String, usize>,
    warnings: Vec<ParseWarning>,
}

impl Catalog {
    pub fn new(cdn: impl Into<String>) -> Self {
        Self {
            cdn: cdn.into(),
            ..Default::default()
        }
    }

    /// CDN host prefix for package paths.
    pub fn cdn(&self) -> &str {
        &self.cdn
    }

    /// Products in order of first appearance.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, code: &str) -> Option<&Product> {
        self.index.get(code).map(|&i| &self.products[i])
    }

    /// Add a product unless one with the same code exists; returns the stored one.
    pub fn add_product(&mut self, product: Product) -> &mut Product {
        let i = match self.index.get(&product.code) {
            Some(&i) => i,
            None => {
                self.index.insert(product.code.clone(), self.products.len());
                self.products.push(product);
                self.products.len() - 1
            }
        };
        &mut self.products[i]
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }
}
