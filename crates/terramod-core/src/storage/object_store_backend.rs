//! `RemoteStore` implementation backed by the `object_store` crate.
//!
//! `object_store` is async; packaging is not. Each store owns a
//! current-thread tokio runtime and blocks on it for every call.

use super::RemoteStore;
use super::StorageError;
use super::StorageResult;
use object_store::ObjectStore;
use object_store::WriteMultipart;
use object_store::path::Path as ObjectPath;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Parts allowed in flight before reading more of the archive.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Remote store backed by any `object_store` implementation.
///
/// Supports S3 (and S3-compatible endpoints) configured from the standard
/// `AWS_*` environment variables, and an in-memory store for tests.
pub struct ObjectStoreRemote {
    inner: Arc<dyn ObjectStore>,
    location: String,
    runtime: Runtime,
}

impl ObjectStoreRemote {
    /// Creates an S3 store for `bucket`.
    ///
    /// Credentials, region and endpoint come from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the client cannot be built.
    pub fn s3(bucket: &str) -> StorageResult<Self> {
        let location = format!("s3://{bucket}");
        let store = object_store::aws::AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::Configuration {
                location: location.clone(),
                message: e.to_string(),
            })?;
        Self::from_store(Arc::new(store), location)
    }

    /// Creates an empty in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the runtime cannot start.
    pub fn memory() -> StorageResult<Self> {
        Self::from_store(
            Arc::new(object_store::memory::InMemory::new()),
            "memory://".to_string(),
        )
    }

    /// Wraps an existing `object_store` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the runtime cannot start.
    pub fn from_store(inner: Arc<dyn ObjectStore>, location: String) -> StorageResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::Configuration {
                location: location.clone(),
                message: format!("failed to start async runtime: {e}"),
            })?;
        Ok(Self {
            inner,
            location,
            runtime,
        })
    }

    fn backend_error(&self, key: &str, err: &object_store::Error) -> StorageError {
        StorageError::Backend {
            location: self.location.clone(),
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Maps the result of a `head` request to an existence decision.
///
/// Only `NotFound` means "absent"; every other error is propagated.
pub(crate) fn head_outcome<T>(
    result: Result<T, object_store::Error>,
) -> Result<bool, object_store::Error> {
    match result {
        Ok(_) => Ok(true),
        Err(object_store::Error::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

impl RemoteStore for ObjectStoreRemote {
    fn location(&self) -> &str {
        &self.location
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = ObjectPath::from(key);
        let result = self.runtime.block_on(self.inner.head(&path));
        let exists = head_outcome(result).map_err(|e| self.backend_error(key, &e))?;
        tracing::debug!(location = %self.location, key, exists, "checked remote object");
        Ok(exists)
    }

    /// Streams `source` as a multipart upload; memory use does not grow
    /// with the archive size. A failed upload is aborted.
    fn upload(&self, key: &str, source: &Path) -> StorageResult<()> {
        let read_error = |e: std::io::Error| StorageError::Read {
            path: source.display().to_string(),
            source: e,
        };
        let mut file = File::open(source).map_err(read_error)?;
        let path = ObjectPath::from(key);

        let size = self.runtime.block_on(async {
            let upload = self
                .inner
                .put_multipart(&path)
                .await
                .map_err(|e| self.backend_error(key, &e))?;
            let mut writer = WriteMultipart::new(upload);
            let mut buffer = vec![0u8; READ_BUFFER_SIZE];
            let mut size = 0u64;

            loop {
                let step = match file.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => writer
                        .wait_for_capacity(MAX_CONCURRENT_PARTS)
                        .await
                        .map(|()| n)
                        .map_err(|e| self.backend_error(key, &e)),
                    Err(e) => Err(read_error(e)),
                };
                match step {
                    Ok(n) => {
                        writer.write(&buffer[..n]);
                        size += n as u64;
                    }
                    Err(err) => {
                        if let Err(abort) = writer.abort().await {
                            tracing::warn!(key, error = %abort, "failed to abort upload");
                        }
                        return Err(err);
                    }
                }
            }

            writer
                .finish()
                .await
                .map_err(|e| self.backend_error(key, &e))?;
            Ok::<_, StorageError>(size)
        })?;

        tracing::info!(location = %self.location, key, size, "uploaded archive");
        Ok(())
    }
}
