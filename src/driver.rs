// Driver document describing a downloaded product set to the vendor installer

use crate::catalog::VersionRecord;
use std::fmt::Write;

const INSTALL_DIR: &str = "/Applications";

/// Render `driver.xml` for the selected version and its declared dependencies.
pub fn render(display_name: &str, record: &VersionRecord, language: &str) -> String {
    let mut dependencies = String::new();
    for dep in &record.dependencies {
        let _ = write!(
            dependencies,
            "            <Dependency>\n                <SAPCode>{code}</SAPCode>\n                <BaseVersion>{base}</BaseVersion>\n                <EsdDirectory>./{code}</EsdDirectory>\n            </Dependency>\n",
            code = escape(&dep.product_code),
            base = escape(&dep.base_version),
        );
    }

    format!(
        "<DriverInfo>\n    <ProductInfo>\n        <Name>Adobe {name}</Name>\n        <SAPCode>{code}</SAPCode>\n        <CodexVersion>{version}</CodexVersion>\n        <Platform>{platform}</Platform>\n        <EsdDirectory>./{code}</EsdDirectory>\n        <Dependencies>\n{dependencies}        </Dependencies>\n    </ProductInfo>\n    <RequestInfo>\n        <InstallDir>{install_dir}</InstallDir>\n        <InstallLanguage>{language}</InstallLanguage>\n    </RequestInfo>\n</DriverInfo>\n",
        name = escape(display_name),
        code = escape(&record.product_code),
        version = escape(&record.product_version),
        platform = escape(&record.platform),
        dependencies = dependencies,
        install_dir = INSTALL_DIR,
        language = escape(language),
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
