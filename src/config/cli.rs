use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 將匯入結果寫到本機目錄
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .write_file("exports/2024/catalog.json", b"{}")
            .await
            .unwrap();

        let read_back = tokio::fs::read(temp_dir.path().join("exports/2024/catalog.json"))
            .await
            .unwrap();
        assert_eq!(read_back, b"{}");
    }

    #[tokio::test]
    async fn test_write_replaces_previous_archive() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file("catalog_import.zip", b"first run").await.unwrap();
        storage.write_file("catalog_import.zip", b"second").await.unwrap();

        let read_back = tokio::fs::read(temp_dir.path().join("catalog_import.zip"))
            .await
            .unwrap();
        assert_eq!(read_back, b"second");
    }
}
