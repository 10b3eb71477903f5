// Document layouts of the catalog, selected by schema version

use crate::config::SchemaVersion;
use roxmltree::Node;

/// Where the full product's application version is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppVersionSource {
    /// `nglLicensingInfo/appVersion` under the platform's language set.
    LicensingInfo(&'static str),
    /// A top-level build list keyed by product code and wrapper version.
    BuildList(&'static str),
}

/// Path accessors for one document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cdn: &'static str,
    pub products: &'static str,
    pub app_version: AppVersionSource,
}

const FLAT: Layout = Layout {
    cdn: "channel/cdn/secure",
    products: "channel/products/product",
    app_version: AppVersionSource::LicensingInfo("languageSet/nglLicensingInfo/appVersion"),
};

const CHANNELS: Layout = Layout {
    cdn: "channels/channel/cdn/secure",
    products: "channels/channel/products/product",
    app_version: AppVersionSource::BuildList("builds/build"),
};

pub fn layout_for(schema: SchemaVersion) -> &'static Layout {
    match schema {
        SchemaVersion::V4 | SchemaVersion::V5 => &FLAT,
        SchemaVersion::V6 => &CHANNELS,
    }
}

/// All element descendants matching a slash-separated child path, in document order.
pub fn find_all<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for step in path.split('/').filter(|s| !s.is_empty()) {
        current = current
            .into_iter()
            .flat_map(|n| n.children().filter(move |c| c.has_tag_name(step)))
            .collect();
    }
    current
}

pub fn find<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    find_all(node, path).into_iter().next()
}

/// Trimmed text of the first element at `path`, if present and non-empty.
pub fn find_text<'a>(node: Node<'a, '_>, path: &str) -> Option<&'a str> {
    find(node, path)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
