use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn recreate_dir(&self, path: &str) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        match tokio::fs::remove_dir_all(&full_path).await {
            Ok(()) => tracing::info!(
                "Directory '{}' already exists, deleted and re-creating",
                full_path.display()
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tokio::fs::create_dir_all(&full_path).await?;
        tracing::debug!("Created directory '{}'", full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("nested/out.yaml", b"Resources: {}\n").await.unwrap();
        let data = storage.read_file("nested/out.yaml").await.unwrap();
        assert_eq!(data, b"Resources: {}\n");
    }

    #[tokio::test]
    async fn test_recreate_dir_clears_previous_output() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("out/stale.yaml", b"old").await.unwrap();
        storage.recreate_dir("out").await.unwrap();

        let out = dir.path().join("out");
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);

        // also works when the directory does not exist yet
        storage.recreate_dir("fresh").await.unwrap();
        assert!(dir.path().join("fresh").is_dir());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        assert!(storage.read_file("missing.csv").await.is_err());
    }
}
