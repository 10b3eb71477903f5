// Package metadata: build identifier to downloadable package URLs and sizes

use crate::catalog::layout;
use crate::constants;
use crate::error::{CcdlError, Result};
use crate::http::VendorClient;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// URL and size of one downloadable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub url: String,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApplicationJson {
    #[serde(rename = "Packages")]
    packages: PackageList,
}

#[derive(Debug, Deserialize)]
struct PackageList {
    #[serde(rename = "Package", default)]
    package: Vec<PackageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageEntry {
    #[serde(rename = "PackageName", default)]
    pub name: String,
    /// Relative to the catalog's CDN host.
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "DownloadSize", default)]
    pub download_size: Option<u64>,
}

impl PackageEntry {
    pub fn metadata(&self, cdn: &str) -> PackageMetadata {
        PackageMetadata {
            url: join_cdn(cdn, &self.path),
            size_bytes: self.download_size,
        }
    }

    /// Core packages always install; the rest only for their language.
    pub fn applies_to(&self, language: &str) -> bool {
        language == constants::ALL_LANGUAGES
            || self.kind.as_deref() == Some("core")
            || self
                .condition
                .as_deref()
                .is_some_and(|c| c.contains(language))
    }
}

/// Parsed application metadata of one build, with the document it came from.
#[derive(Debug, Clone)]
pub struct ApplicationInfo {
    pub build_guid: String,
    pub raw: String,
    pub packages: Vec<PackageEntry>,
}

impl ApplicationInfo {
    pub fn parse(build_guid: &str, raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(CcdlError::metadata(build_guid, "empty response"));
        }
        let doc: ApplicationJson = serde_json::from_str(raw)
            .map_err(|e| CcdlError::metadata(build_guid, format!("malformed JSON: {}", e)))?;
        if doc.packages.package.is_empty() {
            return Err(CcdlError::metadata(build_guid, "package list is empty"));
        }
        if doc.packages.package.iter().any(|p| p.path.is_empty()) {
            return Err(CcdlError::metadata(build_guid, "package without a path"));
        }
        Ok(Self {
            build_guid: build_guid.to_string(),
            raw: raw.to_string(),
            packages: doc.packages.package,
        })
    }

    /// The first listed package.
    pub fn primary(&self, cdn: &str) -> PackageMetadata {
        self.packages[0].metadata(cdn)
    }

    pub fn packages_for(&self, language: &str) -> Vec<&PackageEntry> {
        self.packages
            .iter()
            .filter(|p| p.applies_to(language))
            .collect()
    }
}

/// Parse a full-product installer manifest.
pub fn parse_manifest(manifest_url: &str, raw: &str) -> Result<PackageMetadata> {
    let doc = roxmltree::Document::parse(raw)
        .map_err(|e| CcdlError::metadata(manifest_url, format!("malformed manifest: {}", e)))?;
    let root = doc.root_element();
    let url = layout::find_text(root, "asset_list/asset/asset_path")
        .ok_or_else(|| CcdlError::metadata(manifest_url, "manifest has no asset_path"))?;
    let size_bytes = layout::find_text(root, "asset_list/asset/asset_size")
        .and_then(|s| s.parse::<u64>().ok());
    Ok(PackageMetadata {
        url: url.to_string(),
        size_bytes,
    })
}

fn join_cdn(cdn: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", cdn, path)
    }
}

/// Where metadata documents come from.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn application_json(&self, build_guid: &str) -> Result<String>;
    async fn manifest(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl MetadataSource for VendorClient {
    async fn application_json(&self, build_guid: &str) -> Result<String> {
        self.fetch_application_json(build_guid).await
    }

    async fn manifest(&self, url: &str) -> Result<String> {
        self.fetch_text(url).await
    }
}

pub struct MetadataFetcher {
    source: Arc<dyn MetadataSource>,
    cdn: String,
    cancel: CancellationToken,
}

impl MetadataFetcher {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        cdn: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            cdn: cdn.into(),
            cancel,
        }
    }

    pub fn cdn(&self) -> &str {
        &self.cdn
    }

    /// Metadata of the first package of a build.
    pub async fn fetch(&self, build_guid: &str) -> Result<PackageMetadata> {
        Ok(self.fetch_application(build_guid).await?.primary(&self.cdn))
    }

    pub async fn fetch_application(&self, build_guid: &str) -> Result<ApplicationInfo> {
        if build_guid.is_empty() {
            return Err(CcdlError::metadata(build_guid, "empty build identifier"));
        }
        debug!("Fetching application metadata for build {}", build_guid);
        let raw = self.guarded(self.source.application_json(build_guid)).await?;
        ApplicationInfo::parse(build_guid, &raw)
    }

    /// Metadata of the full product, whose build identifier is a manifest URL.
    pub async fn fetch_manifest(&self, manifest_url: &str) -> Result<PackageMetadata> {
        let url = join_cdn(&self.cdn, manifest_url);
        debug!("Fetching installer manifest {}", url);
        let raw = self.guarded(self.source.manifest(&url)).await?;
        parse_manifest(manifest_url, &raw)
    }

    async fn guarded<F>(&self, request: F) -> Result<String>
    where
        F: std::future::Future<Output = Result<String>>,
    {
        if self.cancel.is_cancelled() {
            return Err(CcdlError::Cancelled);
        }
        let raw = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CcdlError::Cancelled),
            raw = request => raw?,
        };
        if self.cancel.is_cancelled() {
            return Err(CcdlError::Cancelled);
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const APP_JSON: &str = r#"{
        "Packages": {
            "Package": [
                {"PackageName": "Core", "Path": "/PHSP/25.0/Core.zip", "Type": "core", "DownloadSize": 1024},
                {"PackageName": "LangDE", "Path": "/PHSP/25.0/de_DE.zip", "Condition": "[installLanguage]==de_DE", "DownloadSize": 10},
                {"PackageName": "LangFR", "Path": "/PHSP/25.0/fr_FR.zip", "Condition": "[installLanguage]==fr_FR"}
            ]
        }
    }"#;

    struct StaticSource {
        body: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataSource for StaticSource {
        async fn application_json(&self, _build_guid: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }

        async fn manifest(&self, _url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    fn fetcher(body: &str, cancel: CancellationToken) -> (Arc<StaticSource>, MetadataFetcher) {
        let source = Arc::new(StaticSource {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        });
        let fetcher = MetadataFetcher::new(source.clone(), "https://ccmdl.example.com", cancel);
        (source, fetcher)
    }

    #[tokio::test]
    async fn test_fetch_uses_first_package() {
        let (_, fetcher) = fetcher(APP_JSON, CancellationToken::new());
        let meta = fetcher.fetch("guid-1").await.unwrap();
        assert_eq!(
            meta,
            PackageMetadata {
                url: "https://ccmdl.example.com/PHSP/25.0/Core.zip".into(),
                size_bytes: Some(1024),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_response_is_metadata_error() {
        let (_, fetcher) = fetcher("  ", CancellationToken::new());
        let err = fetcher.fetch("guid-1").await.unwrap_err();
        assert!(
            matches!(err, CcdlError::Metadata { ref build_guid, .. } if build_guid == "guid-1")
        );
    }

    #[tokio::test]
    async fn test_malformed_response_is_metadata_error() {
        for body in ["not json", r#"{"Packages": {"Package": []}}"#, r#"{"Other": 1}"#] {
            let (_, fetcher) = fetcher(body, CancellationToken::new());
            let err = fetcher.fetch("guid-1").await.unwrap_err();
            assert!(matches!(err, CcdlError::Metadata { .. }), "body {body}");
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (source, fetcher) = fetcher(APP_JSON, cancel);
        let err = fetcher.fetch("guid-1").await.unwrap_err();
        assert!(matches!(err, CcdlError::Cancelled));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    /// Cancels the shared token while its request is in flight.
    struct CancellingSource {
        cancel: CancellationToken,
        respond: bool,
    }

    #[async_trait]
    impl MetadataSource for CancellingSource {
        async fn application_json(&self, _build_guid: &str) -> Result<String> {
            self.cancel.cancel();
            if self.respond {
                Ok(APP_JSON.to_string())
            } else {
                futures::future::pending().await
            }
        }

        async fn manifest(&self, _url: &str) -> Result<String> {
            self.application_json("").await
        }
    }

    #[tokio::test]
    async fn test_cancelled_while_request_pending() {
        let cancel = CancellationToken::new();
        let source = Arc::new(CancellingSource {
            cancel: cancel.clone(),
            respond: false,
        });
        let fetcher = MetadataFetcher::new(source, "https://ccmdl.example.com", cancel);
        let err = fetcher.fetch("guid-1").await.unwrap_err();
        assert!(matches!(err, CcdlError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_during_request_discards_response() {
        let cancel = CancellationToken::new();
        let source = Arc::new(CancellingSource {
            cancel: cancel.clone(),
            respond: true,
        });
        let fetcher = MetadataFetcher::new(source, "https://ccmdl.example.com", cancel);
        let err = fetcher.fetch_application("guid-1").await.unwrap_err();
        assert!(matches!(err, CcdlError::Cancelled));
    }

    #[test]
    fn test_language_filter() {
        let info = ApplicationInfo::parse("g", APP_JSON).unwrap();
        let names = |lang: &str| -> Vec<String> {
            info.packages_for(lang).iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names("de_DE"), vec!["Core", "LangDE"]);
        assert_eq!(names("en_US"), vec!["Core"]);
        assert_eq!(names("ALL").len(), 3);
    }

    #[tokio::test]
    async fn test_manifest() {
        let manifest = r#"<manifest><asset_list><asset>
            <asset_path>https://dl.example.com/Acrobat.dmg</asset_path>
            <asset_size>2048</asset_size>
        </asset></asset_list></manifest>"#;
        let (_, fetcher) = fetcher(manifest, CancellationToken::new());
        let meta = fetcher.fetch_manifest("/APRO/manifest.xml").await.unwrap();
        assert_eq!(meta.url, "https://dl.example.com/Acrobat.dmg");
        assert_eq!(meta.size_bytes, Some(2048));
    }

    #[test]
    fn test_manifest_without_asset() {
        let err = parse_manifest("m.xml", "<manifest/>").unwrap_err();
        assert!(matches!(err, CcdlError::Metadata { .. }));
    }
}
