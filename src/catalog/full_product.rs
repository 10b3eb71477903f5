// Version handling for the full product, whose catalog version is an installer-wrapper version

use crate::catalog::layout::{self, AppVersionSource, Layout};
use crate::catalog::model::ParseWarning;
use crate::error::{CcdlError, Result};
use log::warn;
use roxmltree::Node;

const MANIFEST_URL_PATH: &str = "languageSet/urls/manifestURL";
const BUILD_APP_VERSION_PATH: &str = "nglLicensingInfo/appVersion";

/// Identity of one full-product platform variant after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullProductVersion {
    /// The real application version.
    pub product_version: String,
    /// The installer-wrapper version from the catalog.
    pub base_version: String,
    /// Stored in place of the build identifier.
    pub manifest_url: String,
    pub warning: Option<ParseWarning>,
}

/// Derive the version identity of a full-product platform node.
pub fn resolve(
    root: Node<'_, '_>,
    platform: Node<'_, '_>,
    product_code: &str,
    wrapper_version: &str,
    layout: &Layout,
) -> Result<FullProductVersion> {
    let (product_version, warning) =
        app_version(root, platform, product_code, wrapper_version, layout)?;
    let manifest_url = manifest_url(platform, product_code, wrapper_version)?;

    Ok(FullProductVersion {
        product_version,
        base_version: wrapper_version.to_string(),
        manifest_url,
        warning,
    })
}

/// The real application version of a platform node, which keys its record.
///
/// In the builds-list layout a missing build entry keeps the wrapper version
/// and yields a warning instead of an error.
pub fn app_version(
    root: Node<'_, '_>,
    platform: Node<'_, '_>,
    product_code: &str,
    wrapper_version: &str,
    layout: &Layout,
) -> Result<(String, Option<ParseWarning>)> {
    match layout.app_version {
        AppVersionSource::LicensingInfo(path) => layout::find_text(platform, path)
            .map(|v| (v.to_string(), None))
            .ok_or_else(|| {
                CcdlError::parse(format!(
                    "{} {} has no application version at '{}'",
                    product_code, wrapper_version, path
                ))
            }),
        AppVersionSource::BuildList(path) => {
            match find_build(root, path, product_code, wrapper_version) {
                Some(build) => layout::find_text(build, BUILD_APP_VERSION_PATH)
                    .map(|v| (v.to_string(), None))
                    .ok_or_else(|| {
                        CcdlError::parse(format!(
                            "build entry for {} {} has no application version",
                            product_code, wrapper_version
                        ))
                    }),
                None => {
                    let w = ParseWarning::FullProductVersionNotFound {
                        product_code: product_code.to_string(),
                        wrapper_version: wrapper_version.to_string(),
                    };
                    warn!("{}", w);
                    Ok((wrapper_version.to_string(), Some(w)))
                }
            }
        }
    }
}

/// Manifest URL of a platform node, stored in place of the build identifier.
pub fn manifest_url(
    platform: Node<'_, '_>,
    product_code: &str,
    wrapper_version: &str,
) -> Result<String> {
    layout::find_text(platform, MANIFEST_URL_PATH)
        .map(str::to_string)
        .ok_or_else(|| {
            CcdlError::parse(format!(
                "{} {} has no manifest URL",
                product_code, wrapper_version
            ))
        })
}

fn find_build<'a, 'input>(
    root: Node<'a, 'input>,
    path: &str,
    product_code: &str,
    wrapper_version: &str,
) -> Option<Node<'a, 'input>> {
    layout::find_all(root, path).into_iter().find(|b| {
        b.attribute("id") == Some(product_code) && b.attribute("version") == Some(wrapper_version)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::layout::layout_for;
    use crate::config::SchemaVersion;

    const PLATFORM_V5: &str = r#"<platform id="macuniversal">
        <languageSet baseVersion="ignored" buildGuid="ignored">
            <nglLicensingInfo><appVersion>23.008.20470</appVersion></nglLicensingInfo>
            <urls><manifestURL>/AdobeProducts/APRO/mac/manifest.xml</manifestURL></urls>
        </languageSet>
    </platform>"#;

    #[test]
    fn test_licensing_info_version() {
        let doc = roxmltree::Document::parse(PLATFORM_V5).unwrap();
        let platform = doc.root_element();
        let resolved = resolve(
            platform,
            platform,
            "APRO",
            "23.6",
            layout_for(SchemaVersion::V5),
        )
        .unwrap();
        assert_eq!(resolved.product_version, "23.008.20470");
        assert_eq!(resolved.base_version, "23.6");
        assert_eq!(
            resolved.manifest_url,
            "/AdobeProducts/APRO/mac/manifest.xml"
        );
        assert!(resolved.warning.is_none());
    }

    #[test]
    fn test_build_list_version() {
        let xml = r#"<response>
            <builds>
                <build id="APRO" version="23.5"><nglLicensingInfo><appVersion>23.001</appVersion></nglLicensingInfo></build>
                <build id="APRO" version="23.6"><nglLicensingInfo><appVersion>23.008</appVersion></nglLicensingInfo></build>
            </builds>
            <platform id="macuniversal">
                <languageSet><urls><manifestURL>https://cdn.example/m.xml</manifestURL></urls></languageSet>
            </platform>
        </response>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        let platform = layout::find(root, "platform").unwrap();
        let resolved =
            resolve(root, platform, "APRO", "23.6", layout_for(SchemaVersion::V6)).unwrap();
        assert_eq!(resolved.product_version, "23.008");
        assert_eq!(resolved.base_version, "23.6");
    }

    #[test]
    fn test_build_list_missing_entry_warns() {
        let xml = r#"<response>
            <builds/>
            <platform id="macuniversal">
                <languageSet><urls><manifestURL>https://cdn.example/m.xml</manifestURL></urls></languageSet>
            </platform>
        </response>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        let platform = layout::find(root, "platform").unwrap();
        let resolved =
            resolve(root, platform, "APRO", "23.6", layout_for(SchemaVersion::V6)).unwrap();
        assert_eq!(resolved.product_version, "23.6");
        assert_eq!(
            resolved.warning,
            Some(ParseWarning::FullProductVersionNotFound {
                product_code: "APRO".into(),
                wrapper_version: "23.6".into(),
            })
        );
    }

    #[test]
    fn test_missing_manifest_url_is_parse_error() {
        let xml = r#"<platform id="macuniversal"><languageSet>
            <nglLicensingInfo><appVersion>1.0</appVersion></nglLicensingInfo>
        </languageSet></platform>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let platform = doc.root_element();
        let err = resolve(platform, platform, "APRO", "1", layout_for(SchemaVersion::V4))
            .unwrap_err();
        assert!(matches!(err, CcdlError::Parse(_)));
    }
}
