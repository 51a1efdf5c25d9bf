//! Receipt object store
//!
//! The pipeline persists rendered receipts through this seam and keeps
//! only the returned reference on the sale. Production uses the local
//! filesystem under `work_dir/receipts`; tests script the trait.

use std::path::PathBuf;

use async_trait::async_trait;

use super::BillingError;

/// Durable storage for receipt documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist `bytes` under `name`, returning an opaque durable
    /// reference.
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, BillingError>;

    /// Fetch a previously persisted document.
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, BillingError>;

    /// Delete a document. Missing documents are not an error.
    async fn delete(&self, reference: &str) -> Result<(), BillingError>;
}

/// Filesystem-backed store rooted at one directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// References are plain file names; anything path-like is rejected
    /// before touching the filesystem.
    fn resolve(&self, reference: &str) -> Result<PathBuf, BillingError> {
        if reference.is_empty()
            || reference.contains("..")
            || reference.contains('/')
            || reference.contains('\\')
        {
            return Err(BillingError::Persist(format!(
                "invalid reference: {reference}"
            )));
        }
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, BillingError> {
        let path = self.resolve(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BillingError::Persist(e.to_string()))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BillingError::Persist(e.to_string()))?;
        Ok(name.to_string())
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, BillingError> {
        let path = self.resolve(reference)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| BillingError::Persist(format!("{reference}: {e}")))
    }

    async fn delete(&self, reference: &str) -> Result<(), BillingError> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BillingError::Persist(e.to_string())),
        }
    }
}
