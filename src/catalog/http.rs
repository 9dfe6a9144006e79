//! HTTP client for the external course catalog API.

use super::{parse_catalog_payload, CatalogError};
use crate::models::ExternalCourseItem;
use std::time::Duration;
use tracing::{debug, info};

/// Settings for [`HttpCatalog`].
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Number of items requested in the single page fetch.
    pub page_size: usize,
}

impl Default for HttpCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_key: None,
            timeout_seconds: 120,
            page_size: 8000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    config: HttpCatalogConfig,
    http_client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(config: HttpCatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn courses_url(&self) -> String {
        format!("{}/courses", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch the whole catalog in one page.
    pub async fn fetch_courses(&self) -> Result<Vec<ExternalCourseItem>, CatalogError> {
        let url = self.courses_url();
        info!("Fetching course catalog from {}", url);

        let mut request = self.http_client.get(&url).query(&[
            ("skip", "0".to_string()),
            ("take", self.config.page_size.to_string()),
        ]);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout {
                    url: url.clone(),
                    seconds: self.config.timeout_seconds,
                }
            } else if e.is_connect() {
                CatalogError::Connect(self.config.base_url.clone())
            } else {
                CatalogError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let body = response.bytes().await?;
        debug!("Catalog response: {} bytes", body.len());

        let items = parse_catalog_payload(&body)?;
        info!("Catalog returned {} courses", items.len());
        Ok(items)
    }
}
