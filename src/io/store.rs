//! Object storage access for the merge pipeline.
//!
//! The pipeline only needs two operations, `fetch` and `store`, addressed by
//! bucket and key. [`ObjectStorage`] is that seam; [`ObjectStoreStorage`]
//! implements it on top of `object_store`, with one store per bucket (S3,
//! local directories, or in-memory stores in tests).

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload};
use tracing::debug;

use crate::error::StorageError;

/// Content type attached to the merged output
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Storage collaborator handed to the pipeline for the span of one invocation.
pub trait ObjectStorage {
    /// Read the whole object at `bucket`/`key`
    fn fetch(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;

    /// Write `body` to `bucket`/`key`, replacing any existing object
    fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl<T: ObjectStorage + Sync> ObjectStorage for &T {
    fn fetch(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send {
        (**self).fetch(bucket, key)
    }

    fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).store(bucket, key, body, content_type)
    }
}

struct BucketStore {
    store: Arc<dyn ObjectStore>,
    /// LocalFileSystem rejects object attributes, so content type is only sent where supported
    supports_attributes: bool,
}

/// [`ObjectStorage`] over a set of `object_store` backends keyed by bucket name
#[derive(Default)]
pub struct ObjectStoreStorage {
    buckets: HashMap<String, BucketStore>,
}

impl ObjectStoreStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store for a bucket
    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.buckets.insert(
            bucket.into(),
            BucketStore {
                store,
                supports_attributes: true,
            },
        );
        self
    }

    /// Authenticated S3 clients for each bucket.
    ///
    /// Credentials and region are loaded from the standard AWS environment
    /// (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION, ...).
    pub fn s3<'a>(buckets: impl IntoIterator<Item = &'a str>) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        for bucket in buckets {
            if storage.buckets.contains_key(bucket) {
                continue;
            }
            tracing::info!("Creating S3 client for bucket: {}", bucket);
            let store = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .with_client_options(create_client_options())
                .build()
                .map_err(|source| StorageError::Connect {
                    bucket: bucket.to_string(),
                    source,
                })?;
            storage = storage.with_store(bucket, Arc::new(store));
        }
        Ok(storage)
    }

    /// Treat each bucket as the directory `root/<bucket>`, creating it if needed
    pub fn local<'a>(
        root: &FsPath,
        buckets: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        for bucket in buckets {
            let dir: PathBuf = root.join(bucket);
            std::fs::create_dir_all(&dir).map_err(|source| StorageError::LocalRoot {
                path: dir.clone(),
                source,
            })?;
            tracing::info!("Creating LocalFileSystem store at: {}", dir.display());
            let store =
                LocalFileSystem::new_with_prefix(&dir).map_err(|source| StorageError::Connect {
                    bucket: bucket.to_string(),
                    source,
                })?;
            storage.buckets.insert(
                bucket.to_string(),
                BucketStore {
                    store: Arc::new(store),
                    supports_attributes: false,
                },
            );
        }
        Ok(storage)
    }

    fn bucket(&self, bucket: &str) -> Result<&BucketStore, StorageError> {
        self.buckets
            .get(bucket)
            .ok_or_else(|| StorageError::UnknownBucket(bucket.to_string()))
    }
}

impl ObjectStorage for ObjectStoreStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let handle = self.bucket(bucket)?;
        let path = object_path(bucket, key)?;

        let result = handle
            .store
            .get(&path)
            .await
            .map_err(|e| classify(bucket, key, e))?;
        let bytes = result.bytes().await.map_err(|e| classify(bucket, key, e))?;

        debug!(bucket, key, bytes = bytes.len(), "fetched object");
        Ok(bytes.to_vec())
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let handle = self.bucket(bucket)?;
        let path = object_path(bucket, key)?;
        let len = body.len();

        let mut opts = PutOptions::default();
        if handle.supports_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            opts.attributes = attributes;
        }

        handle
            .store
            .put_opts(&path, PutPayload::from(body), opts)
            .await
            .map_err(|e| classify(bucket, key, e))?;

        debug!(bucket, key, bytes = len, "stored object");
        Ok(())
    }
}

/// Address an object by its key verbatim; keys that are not valid object paths are rejected
fn object_path(bucket: &str, key: &str) -> Result<Path, StorageError> {
    Path::parse(key).map_err(|source| StorageError::InvalidKey {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source,
    })
}

fn classify(bucket: &str, key: &str, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        source => StorageError::Backend {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        },
    }
}

fn create_client_options() -> ClientOptions {
    ClientOptions::new()
        .with_connect_timeout(Duration::from_secs(5))
        .with_timeout(Duration::from_secs(30))
}
