//! Object storage for uploaded documents: S3-compatible (MinIO) in deployment, memory in tests.

use crate::config::StorageSettings;
use crate::error::AppError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;
    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError>;
    async fn delete(&self, name: &str) -> Result<(), AppError>;
}

/// Object name for a new upload: a fresh v4 UUID in front of the original file name.
pub fn object_name(filename: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), filename)
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "cedica-env",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(settings.endpoint_url())
            .credentials_provider(credentials)
            .load()
            .await;
        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();
        tracing::info!(endpoint = %settings.endpoint_url(), bucket = %settings.bucket, "object storage configured");
        S3Store {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tracing::info!(object = %name, size, "object stored");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let out = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        let data = out
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tracing::info!(object = %name, "object deleted");
        Ok(())
    }
}

/// Keeps objects in a map. Used by tests and when no storage server is configured.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.read().map(|m| m.contains_key(name)).unwrap_or(false)
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Storage("memory store lock poisoned".into())
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.objects
            .write()
            .map_err(poisoned)?
            .insert(name.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError> {
        self.objects
            .read()
            .map_err(poisoned)?
            .get(name)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| AppError::Storage(format!("object {} not found", name)))
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.objects.write().map_err(poisoned)?.remove(name);
        Ok(())
    }
}

/// The S3 store when a server is configured, otherwise the in-memory one.
pub async fn from_settings(settings: &StorageSettings) -> Arc<dyn ObjectStore> {
    if settings.server.is_empty() {
        tracing::warn!("MINIO_SERVER is empty; documents are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(S3Store::connect(settings).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.put("a-informe.pdf", vec![1, 2, 3], "application/pdf").await.unwrap();
        assert!(store.contains("a-informe.pdf"));
        assert_eq!(store.get("a-informe.pdf").await.unwrap(), vec![1, 2, 3]);
        store.delete("a-informe.pdf").await.unwrap();
        assert!(matches!(store.get("a-informe.pdf").await, Err(AppError::Storage(_))));
    }

    #[test]
    fn object_names_keep_the_filename() {
        let name = object_name("informe.pdf");
        assert!(name.ends_with("-informe.pdf"));
        assert_eq!(name.len(), 36 + 1 + "informe.pdf".len());
    }
}
