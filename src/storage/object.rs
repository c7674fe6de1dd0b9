use super::{DatasetStorage, StorageError, StorageRoot};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::prefix::PrefixStore;
use object_store::{ObjectStore, PutPayload};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

const IO_THREADS: usize = 2;

/// [`DatasetStorage`] over an `object_store` backend.
///
/// The pipeline is synchronous; each call is driven to completion on a small
/// runtime owned by the storage, so it may be used from `rayon` workers.
#[derive(Debug)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    runtime: Arc<Runtime>,
    location: String,
}

impl ObjectStorage {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        location: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(IO_THREADS)
            .thread_name("storage-io")
            .enable_all()
            .build()
            .map_err(StorageError::Runtime)?;
        Ok(Self {
            store,
            runtime: Arc::new(runtime),
            location: location.into(),
        })
    }

    pub fn open(root: &StorageRoot) -> Result<Self, StorageError> {
        match root {
            StorageRoot::Local(path) => Self::local(path),
            StorageRoot::S3 { bucket, prefix } => Self::s3(bucket, prefix),
        }
    }

    /// Storage rooted at a local directory, created when missing.
    pub fn local(root: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|source| StorageError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let store = LocalFileSystem::new_with_prefix(root)?;
        Self::new(Arc::new(store), root.display().to_string())
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(Arc::new(InMemory::new()), "memory://")
    }

    /// Storage under `prefix` of an S3 bucket. Credentials and region come
    /// from the `AWS_*` environment.
    pub fn s3(bucket: &str, prefix: &str) -> Result<Self, StorageError> {
        let store = s3_builder(bucket).build()?;
        let location = StorageRoot::S3 {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }
        .to_string();
        if prefix.is_empty() {
            Self::new(Arc::new(store), location)
        } else {
            Self::new(Arc::new(PrefixStore::new(store, prefix)), location)
        }
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    async fn list_paths(&self, prefix: &Path) -> Result<Vec<Path>, StorageError> {
        let prefix = (!prefix.as_ref().is_empty()).then_some(prefix);
        let mut paths: Vec<Path> = self
            .store
            .list(prefix)
            .map_ok(|meta| meta.location)
            .try_collect()
            .await?;
        paths.sort();
        Ok(paths)
    }
}

fn s3_builder(bucket: &str) -> AmazonS3Builder {
    AmazonS3Builder::from_env().with_bucket_name(bucket)
}

fn object_path(key: &str) -> Result<Path, StorageError> {
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Path::parse(key).map_err(|_| StorageError::InvalidKey(key.to_string()))
}

impl DatasetStorage for ObjectStorage {
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix = object_path(prefix)?;
        let paths = self.block_on(self.list_paths(&prefix))?;
        Ok(paths.into_iter().map(|p| p.to_string()).collect())
    }

    fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let path = object_path(key)?;
        self.block_on(async {
            match self.store.get(&path).await {
                Ok(result) => Ok(result.bytes().await?),
                Err(object_store::Error::NotFound { .. }) => {
                    Err(StorageError::NotFound(key.to_string()))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    fn write(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = object_path(key)?;
        self.block_on(self.store.put(&path, PutPayload::from_bytes(bytes)))?;
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = object_path(key)?;
        match self.block_on(self.store.head(&path)) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_prefix(&self, prefix: &str) -> Result<(), StorageError> {
        let path = object_path(prefix)?;
        if path.as_ref().is_empty() {
            return Err(StorageError::InvalidKey(prefix.to_string()));
        }
        let removed = self.block_on(async {
            let paths = self.list_paths(&path).await?;
            for p in &paths {
                match self.store.delete(p).await {
                    Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                    Err(err) => return Err(StorageError::from(err)),
                }
            }
            Ok(paths.len())
        })?;
        debug!("Removed {} objects under {}/{}", removed, self.location, prefix);
        Ok(())
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
