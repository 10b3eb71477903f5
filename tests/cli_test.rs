use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn run_command(args: &[&str], test_dir: &Path) -> (bool, String, String) {
    // Use cargo run which will build if needed
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .env("CCDL_DIR", test_dir)
        .env_remove("CCDL_CATALOG_FILE")
        .current_dir(env::current_dir().unwrap())
        .output()
        .expect("Failed to execute command");

    let success = output.status.success();
    let stdout = String::from_utf8(output.stdout).unwrap_or_default();
    let stderr = String::from_utf8(output.stderr).unwrap_or_default();

    // Filter out cargo compilation messages from stderr
    let filtered_stderr: String = stderr
        .lines()
        .filter(|line| {
            !line.contains("Compiling")
                && !line.contains("Finished")
                && !line.contains("warning:")
                && !line.contains("note:")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let combined_output = if stdout.is_empty() {
        filtered_stderr.clone()
    } else if filtered_stderr.is_empty() {
        stdout.clone()
    } else {
        format!("{}\n{}", stdout, filtered_stderr)
    };

    (success, combined_output, filtered_stderr)
}

fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

const PRODUCTS: &str = r#"
    <products>
        <product id="ILST" version="27.0">
            <displayName>Illustrator</displayName>
            <platforms>
                <platform id="osx10-64">
                    <languageSet baseVersion="27.0" buildGuid="ilst-27-x64"/>
                </platform>
            </platforms>
        </product>
        <product id="ILST" version="28.0">
            <displayName>Illustrator</displayName>
            <platforms>
                <platform id="macarm64">
                    <languageSet baseVersion="28.0" buildGuid="ilst-28-arm"/>
                </platform>
                <platform id="osx10-64">
                    <languageSet baseVersion="28.0" buildGuid="ilst-28-x64"/>
                </platform>
            </platforms>
        </product>
        <product id="PHSP" version="25.0">
            <displayName>Photoshop</displayName>
            <platforms>
                <platform id="macuniversal">
                    <languageSet baseVersion="25.0" buildGuid="phsp-25-uni">
                        <dependencies>
                            <dependency><sapCode>KBRG</sapCode><baseVersion>14.0</baseVersion></dependency>
                        </dependencies>
                    </languageSet>
                </platform>
            </platforms>
        </product>
        <product id="BRKN" version="1.0">
            <displayName>Broken Bundle</displayName>
            <platforms>
                <platform id="macuniversal">
                    <languageSet baseVersion="1.0" buildGuid="brkn-1">
                        <dependencies>
                            <dependency><sapCode>KBRG</sapCode><baseVersion>99.0</baseVersion></dependency>
                        </dependencies>
                    </languageSet>
                </platform>
            </platforms>
        </product>
    </products>"#;

const HIDDEN: &str = r#"
    <products>
        <product id="KBRG" version="14.0">
            <displayName>Bridge Support</displayName>
            <platforms>
                <platform id="macuniversal">
                    <languageSet baseVersion="14.0" buildGuid="kbrg-14"/>
                </platform>
            </platforms>
        </product>
    </products>"#;

fn write_flat_catalog(dir: &Path) -> PathBuf {
    let doc = format!(
        r#"<response>
            <channel name="ccm">
                <cdn><secure>https://ccmdl.example.com</secure></cdn>
                {}
            </channel>
            <channel name="sti">{}</channel>
        </response>"#,
        PRODUCTS, HIDDEN
    );
    let path = dir.join("catalog-v5.xml");
    fs::write(&path, doc).unwrap();
    path
}

fn write_channels_catalog(dir: &Path) -> PathBuf {
    let doc = format!(
        r#"<response>
            <channels>
                <channel name="ccm">
                    <cdn><secure>https://ccmdl.example.com</secure></cdn>
                    {}
                </channel>
                <channel name="sti">{}</channel>
            </channels>
            <builds/>
        </response>"#,
        PRODUCTS, HIDDEN
    );
    let path = dir.join("catalog-v6.xml");
    fs::write(&path, doc).unwrap();
    path
}

#[test]
fn test_products_lists_visible_products() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "5", "--arch", "arm64", "--catalog-file", catalog, "products"],
        temp_dir.path(),
    );

    assert!(success, "products should succeed. output: {}", output);
    assert!(output.contains("3 products found:"), "output: {}", output);
    assert!(output.contains("Illustrator (28.0)"), "output: {}", output);
    assert!(output.contains("Photoshop (25.0)"), "output: {}", output);
    assert!(!output.contains("KBRG"), "hidden product listed: {}", output);
}

#[test]
fn test_products_respects_architecture() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "4", "--arch", "x86_64", "--catalog-file", catalog, "products"],
        temp_dir.path(),
    );

    assert!(success, "products should succeed. output: {}", output);
    assert!(output.contains("Illustrator (28.0)"), "output: {}", output);
}

#[test]
fn test_products_with_channels_layout() {
    let temp_dir = setup_test_dir();
    let catalog = write_channels_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--arch", "arm64", "--catalog-file", catalog, "products"],
        temp_dir.path(),
    );

    assert!(success, "products should succeed. output: {}", output);
    assert!(output.contains("Photoshop (25.0)"), "output: {}", output);
    assert!(!output.contains("Bridge Support"), "output: {}", output);
}

#[test]
fn test_schema_mismatch_fails() {
    let temp_dir = setup_test_dir();
    let catalog = write_channels_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, _, _) = run_command(
        &["--schema", "5", "--arch", "arm64", "--catalog-file", catalog, "products"],
        temp_dir.path(),
    );

    assert!(!success, "a v6 document should not parse as v5");
}

#[test]
fn test_versions_newest_first() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "5", "--arch", "x86_64", "--catalog-file", catalog, "versions", "ILST"],
        temp_dir.path(),
    );

    assert!(success, "versions should succeed. output: {}", output);
    let newer = output.find("28.0").expect("28.0 listed");
    let older = output.find("27.0").expect("27.0 listed");
    assert!(newer < older, "output: {}", output);
}

#[test]
fn test_resolve_includes_dependencies() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "5", "--arch", "arm64", "--catalog-file", catalog, "resolve", "PHSP"],
        temp_dir.path(),
    );

    assert!(success, "resolve should succeed. output: {}", output);
    assert!(output.contains("PHSP 25.0 resolves to 2 product(s)"), "output: {}", output);
    assert!(output.contains("PHSP_25.0"), "output: {}", output);
    assert!(output.contains("KBRG_14.0"), "output: {}", output);
    assert!(output.contains("kbrg-14"), "output: {}", output);
}

#[test]
fn test_resolve_unresolved_dependency_fails() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "5", "--arch", "arm64", "--catalog-file", catalog, "resolve", "BRKN"],
        temp_dir.path(),
    );

    assert!(!success, "resolve should fail. output: {}", output);
    assert!(output.contains("KBRG"), "output: {}", output);
}

#[test]
fn test_download_unknown_product_fails() {
    let temp_dir = setup_test_dir();
    let catalog = write_flat_catalog(temp_dir.path());
    let catalog = catalog.to_str().unwrap();

    let (success, output, _) = run_command(
        &["--schema", "5", "--arch", "arm64", "--catalog-file", catalog, "download", "NOPE"],
        temp_dir.path(),
    );

    assert!(!success, "download should fail. output: {}", output);
    assert!(output.contains("NOPE"), "output: {}", output);
    assert!(
        !temp_dir.path().join("NOPE_").exists(),
        "no session directory should be created"
    );
}

#[test]
fn test_missing_catalog_file_fails() {
    let temp_dir = setup_test_dir();
    let missing = temp_dir.path().join("missing.xml");

    let (success, _, _) = run_command(
        &["--catalog-file", missing.to_str().unwrap(), "products"],
        temp_dir.path(),
    );

    assert!(!success, "a missing catalog file should fail");
}
