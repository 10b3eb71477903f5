// Constants module for vendor endpoints, headers and catalog sentinels

/// Catalog endpoint; `{schema}` and `{platforms}` are substituted at request time.
pub const CATALOG_URL_TEMPLATE: &str = "https://prod-rel-ffc-ccm.oobesaas.adobe.com/adobe-ffc-external/core/v{schema}/products/all?_type=xml&channel=ccm&channel=sti&platform={platforms}&productType=Desktop";
pub const APPLICATION_JSON_URL: &str = "https://cdn-ffc.oobesaas.adobe.com/core/v3/applications";

/// Every platform the catalog is asked for, regardless of the selected architecture.
pub const CATALOG_PLATFORM_FILTER: &str = "osx10-64,osx10,macarm64,macuniversal";

// Lowercase, as `HeaderName::from_static` requires.
pub const HEADER_APP_ID: &str = "x-adobe-app-id";
pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_BUILD_GUID: &str = "x-adobe-build-guid";
pub const APP_ID: &str = "accc-apps-panel-desktop";
pub const API_KEY: &str = "CC_HD_ESD_1_0";
pub const CATALOG_USER_AGENT: &str = "Adobe Application Manager 2.0";
pub const DOWNLOAD_USER_AGENT: &str = "Creative Cloud";

/// Length of the random part of the `fg` session cookie.
pub const COOKIE_TOKEN_LEN: usize = 26;
pub const COOKIE_SUFFIX: &str = "======";

/// Name of the category whose products are offered for direct selection.
pub const VISIBLE_CATEGORY: &str = "ccm";

/// Product whose catalog version is an installer-wrapper version.
pub const FULL_PRODUCT_CODE: &str = "APRO";

pub const PLATFORM_UNIVERSAL: &str = "macuniversal";
pub const PLATFORM_ARM64: &str = "macarm64";
pub const PLATFORM_X64: &str = "osx10-64";
pub const PLATFORM_X86: &str = "osx10";

pub const DEFAULT_LANGUAGE: &str = "en_US";
pub const ALL_LANGUAGES: &str = "ALL";

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub const APPLICATION_JSON_FILE: &str = "application.json";
pub const DRIVER_FILE: &str = "driver.xml";
pub const REPORT_FILE: &str = "session.toml";
pub const PRODUCTS_DIR: &str = "products";
