//! Model bundle storage
//!
//! [`ModelStore`] addresses objects by bucket and key. [`S3ModelStore`] is the
//! deployed backend; [`LocalModelStore`] mirrors the same layout on disk.

mod s3;

pub use s3::S3ModelStore;

use crate::error::Result;
use crate::utils::create_parent_dir;
use std::path::{Path, PathBuf};

/// Bucket/key object storage for serialized bundles
pub trait ModelStore {
    fn is_model_present(&self, bucket: &str, key: &str) -> Result<bool>;

    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Upload the file at `path`, replacing any existing object
    fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<()>;
}

/// Stores objects under `<root>/<bucket>/<key>`
#[derive(Debug, Clone)]
pub struct LocalModelStore {
    root: PathBuf,
}

impl LocalModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ModelStore for LocalModelStore {
    fn is_model_present(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.object_path(bucket, key).is_file())
    }

    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key);
        tracing::debug!(path = %path.display(), "reading object");
        Ok(std::fs::read(path)?)
    }

    fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<()> {
        let target = self.object_path(bucket, key);
        create_parent_dir(&target)?;
        std::fs::copy(path, &target)?;
        tracing::info!(from = %path.display(), to = %target.display(), "object stored");
        Ok(())
    }
}
