//! Catalog items read from a JSON file on disk.

use super::{parse_catalog_payload, CatalogError};
use crate::models::ExternalCourseItem;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn fetch_courses(&self) -> Result<Vec<ExternalCourseItem>, CatalogError> {
        let body = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;

        let items = parse_catalog_payload(&body)?;
        info!("Read {} courses from {}", items.len(), self.path.display());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_items_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("courses.json");
        std::fs::write(
            &path,
            r#"{"items": [{"id": "c1", "displayName": "Cliffs", "tees": [{"name": "Red"}]}]}"#,
        )
        .unwrap();

        let items = tokio_test::block_on(FileCatalog::new(&path).fetch_courses()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tees[0].name.as_deref(), Some("Red"));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileCatalog::new(temp_dir.path().join("absent.json"));
        let err = tokio_test::block_on(source.fetch_courses()).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
