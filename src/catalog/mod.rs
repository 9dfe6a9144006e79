//! External course catalog sources.
//!
//! A source materializes the full list of catalog items before the sync
//! engine runs; any failure here aborts the sync before a single course is
//! touched.

pub mod file;
pub mod http;

pub use file::FileCatalog;
pub use http::{HttpCatalog, HttpCatalogConfig};

use crate::models::ExternalCourseItem;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching or decoding the external catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("cannot connect to course catalog at {0}")]
    Connect(String),

    #[error("course catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("course catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed course catalog payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the item list comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Http(HttpCatalog),
    File(FileCatalog),
}

impl CatalogSource {
    pub async fn fetch_courses(&self) -> Result<Vec<ExternalCourseItem>, CatalogError> {
        match self {
            CatalogSource::Http(source) => source.fetch_courses().await,
            CatalogSource::File(source) => source.fetch_courses().await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Http(source) => source.base_url().to_string(),
            CatalogSource::File(source) => source.path().display().to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Bare(Vec<ExternalCourseItem>),
    Wrapped { items: Vec<ExternalCourseItem> },
}

/// Decode a catalog body: either a bare JSON array of items or an object
/// with an `items` array.
pub fn parse_catalog_payload(body: &[u8]) -> Result<Vec<ExternalCourseItem>, CatalogError> {
    let payload: CatalogPayload = serde_json::from_slice(body)?;
    Ok(match payload {
        CatalogPayload::Bare(items) => items,
        CatalogPayload::Wrapped { items } => items,
    })
}
