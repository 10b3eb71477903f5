// Report module for the per-package outcome file of a download session

use crate::constants;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Downloaded,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub product_code: String,
    pub version: String,
    pub build_guid: String,
    pub file: Option<String>,
    pub url: Option<String>,
    pub status: PackageStatus,
    pub bytes: u64,
    pub sha256: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub product: String,
    pub version: String,
    pub language: String,
    pub architecture: String,
    pub package: Vec<PackageReport>,
}

impl SessionReport {
    pub fn new(product: &str, version: &str, language: &str, architecture: &str) -> Self {
        Self {
            product: product.to_string(),
            version: version.to_string(),
            language: language.to_string(),
            architecture: architecture.to_string(),
            package: Vec::new(),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(dir.join(constants::REPORT_FILE))?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let text = toml::to_string_pretty(self)?;
        std::fs::write(dir.join(constants::REPORT_FILE), text)?;
        Ok(())
    }

    pub fn add_package(&mut self, package: PackageReport) {
        self.package.push(package);
    }

    pub fn count(&self, status: PackageStatus) -> usize {
        self.package.iter().filter(|p| p.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut report = SessionReport::new("PHSP", "25.0", "en_US", "arm64");
        report.add_package(PackageReport {
            product_code: "PHSP".into(),
            version: "25.0".into(),
            build_guid: "g".into(),
            file: Some("Core.zip".into()),
            url: Some("https://cdn.example/Core.zip".into()),
            status: PackageStatus::Downloaded,
            bytes: 10,
            sha256: Some("ab".into()),
            error: None,
        });
        report.add_package(PackageReport {
            product_code: "KBRG".into(),
            version: "14.0".into(),
            build_guid: "k".into(),
            file: None,
            url: None,
            status: PackageStatus::Failed,
            bytes: 0,
            sha256: None,
            error: Some("package list is empty".into()),
        });
        report.save(dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("session.toml")).unwrap();
        assert!(text.contains("status = \"failed\""));

        let loaded = SessionReport::load(dir.path()).unwrap();
        assert_eq!(loaded, report);
        assert_eq!(loaded.count(PackageStatus::Failed), 1);
    }
}
