// Vendor HTTP client: catalog and metadata requests plus the download transport

use crate::config::SchemaVersion;
use crate::constants;
use crate::download::{ByteStream, Transport};
use crate::error::{BoxError, CcdlError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use rand::Rng;
use reqwest::header::{CONTENT_LENGTH, COOKIE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const COOKIE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// HTTP client carrying the vendor identification headers.
///
/// The session cookie is generated once and reused for the client's lifetime.
pub struct VendorClient {
    client: Client,
    cookie: String,
    request_headers: HeaderMap,
    probe_headers: HeaderMap,
}

impl VendorClient {
    pub fn new() -> Result<Self> {
        Self::with_cookie(session_cookie(&mut rand::rng()))
    }

    pub fn with_cookie(cookie: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        let mut request_headers = HeaderMap::new();
        request_headers.insert(
            HeaderName::from_static(constants::HEADER_APP_ID),
            HeaderValue::from_static(constants::APP_ID),
        );
        request_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(constants::CATALOG_USER_AGENT),
        );
        request_headers.insert(
            HeaderName::from_static(constants::HEADER_API_KEY),
            HeaderValue::from_static(constants::API_KEY),
        );
        request_headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|e| CcdlError::Config(format!("invalid session cookie: {}", e)))?,
        );

        let mut probe_headers = HeaderMap::new();
        probe_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(constants::DOWNLOAD_USER_AGENT),
        );

        Ok(Self {
            client,
            cookie,
            request_headers,
            probe_headers,
        })
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Fetch the raw catalog document.
    pub async fn fetch_catalog(&self, schema: SchemaVersion) -> Result<String> {
        let url = catalog_url(schema, constants::CATALOG_PLATFORM_FILTER);
        debug!("Fetching catalog from {}", url);
        self.get_text(&url, HeaderMap::new()).await
    }

    /// Fetch the application metadata JSON of one build.
    pub async fn fetch_application_json(&self, build_guid: &str) -> Result<String> {
        let mut extra = HeaderMap::new();
        extra.insert(
            HeaderName::from_static(constants::HEADER_BUILD_GUID),
            HeaderValue::from_str(build_guid)
                .map_err(|_| CcdlError::metadata(build_guid, "not a valid header value"))?,
        );
        self.get_text(constants::APPLICATION_JSON_URL, extra).await
    }

    /// Fetch any vendor document with the identification headers.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get_text(url, HeaderMap::new()).await
    }

    async fn get_text(&self, url: &str, extra: HeaderMap) -> Result<String> {
        let response: Response = self
            .client
            .get(url)
            .headers(self.request_headers.clone())
            .headers(extra)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for VendorClient {
    async fn content_length(&self, url: &str) -> std::result::Result<Option<u64>, BoxError> {
        let response = self
            .client
            .head(url)
            .headers(self.probe_headers.clone())
            .send()
            .await?
            .error_for_status()?;
        // Read the header directly: the body of a HEAD response is always empty.
        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok()))
    }

    async fn open(&self, url: &str) -> std::result::Result<ByteStream, BoxError> {
        let response = self
            .client
            .get(url)
            .headers(self.request_headers.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Box::new(e) as BoxError))
            .boxed())
    }
}

pub fn catalog_url(schema: SchemaVersion, platforms: &str) -> String {
    constants::CATALOG_URL_TEMPLATE
        .replace("{schema}", &schema.number().to_string())
        .replace("{platforms}", platforms)
}

/// `fg=` cookie with a random uppercase/digit token.
pub fn session_cookie<R: Rng + ?Sized>(rng: &mut R) -> String {
    let token: String = (0..constants::COOKIE_TOKEN_LEN)
        .map(|_| COOKIE_ALPHABET[rng.random_range(0..COOKIE_ALPHABET.len())] as char)
        .collect();
    format!("fg={}{}", token, constants::COOKIE_SUFFIX)
}
