mod local;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Blob storage for cover images, keyed by slash-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    async fn get_opt(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        match self.get(key).await {
            Ok(data) => Ok(Some(data)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete an object. No-op if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Keys under a prefix, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get_opt(key).await?.is_some())
    }
}

// -- Keys and content types --

pub const COVERS_PREFIX: &str = "covers";

/// Object key for a cover image: `covers/{cover_id}.{ext}`.
pub fn cover_key(cover_id: &str, ext: &str) -> String {
    format!("{COVERS_PREFIX}/{cover_id}.{ext}")
}

/// MIME type inferred from the key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// -- Configuration --

/// Where cover images live. S3 when fully configured, local disk otherwise.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// S3-compatible endpoint, e.g. "http://127.0.0.1:9000".
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base directory for `LocalStore`. Defaults to the bookforge data dir.
    pub local_data_dir: Option<String>,
}

impl StoreConfig {
    /// Read `BOOKFORGE_S3_*` with `AWS_*` fallbacks, plus
    /// `BOOKFORGE_STORE_DIR` for the local directory.
    pub fn from_env() -> Self {
        let var = |primary: &str, fallback: &str| {
            std::env::var(primary)
                .or_else(|_| std::env::var(fallback))
                .ok()
        };
        Self {
            endpoint_url: var("BOOKFORGE_S3_ENDPOINT", "AWS_ENDPOINT_URL"),
            region: var("BOOKFORGE_S3_REGION", "AWS_REGION"),
            bucket: var("BOOKFORGE_S3_BUCKET", "S3_BUCKET"),
            access_key_id: var("BOOKFORGE_S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"),
            secret_access_key: var("BOOKFORGE_S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"),
            local_data_dir: std::env::var("BOOKFORGE_STORE_DIR").ok(),
        }
    }

    pub fn is_s3(&self) -> bool {
        self.endpoint_url.is_some()
            && self.access_key_id.is_some()
            && self.secret_access_key.is_some()
            && self.bucket.is_some()
    }
}

// -- Factory --

pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    if config.is_s3() {
        #[cfg(feature = "s3")]
        {
            let store = S3Store::new(config)?;
            tracing::info!(bucket = ?config.bucket, "using s3 cover store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        {
            Err(StoreError::Internal(
                "S3 configuration detected but the 's3' feature is not enabled".into(),
            ))
        }
    } else {
        let store = LocalStore::new(config);
        tracing::info!(dir = %store.base_dir().display(), "using local cover store");
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_complete() -> StoreConfig {
        StoreConfig {
            endpoint_url: Some("http://localhost:9000".into()),
            region: Some("us-east-1".into()),
            bucket: Some("covers".into()),
            access_key_id: Some("key".into()),
            secret_access_key: Some("secret".into()),
            local_data_dir: None,
        }
    }

    #[test]
    fn cover_keys_live_under_prefix() {
        assert_eq!(cover_key("abc", "png"), "covers/abc.png");
        assert_eq!(cover_key("abc", "jpg"), "covers/abc.jpg");
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for_key("covers/a.png"), "image/png");
        assert_eq!(content_type_for_key("covers/a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for_key("covers/a.jpg"), "image/jpeg");
        assert_eq!(content_type_for_key("covers/a.webp"), "image/webp");
        assert_eq!(content_type_for_key("covers/a"), "application/octet-stream");
    }

    #[test]
    fn is_s3_requires_all_fields() {
        assert!(s3_complete().is_s3());

        let mut config = s3_complete();
        config.bucket = None;
        assert!(!config.is_s3());

        let mut config = s3_complete();
        config.secret_access_key = None;
        assert!(!config.is_s3());

        assert!(!StoreConfig::default().is_s3());
    }

    #[test]
    fn create_store_local_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            local_data_dir: Some(tmp.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        assert!(create_store(&config).is_ok());
    }

    // Env vars are process-global; keep every scenario in one test.
    #[test]
    fn store_config_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        let clear_all = || {
            for var in [
                "BOOKFORGE_S3_ENDPOINT", "AWS_ENDPOINT_URL",
                "BOOKFORGE_S3_REGION", "AWS_REGION",
                "BOOKFORGE_S3_BUCKET", "S3_BUCKET",
                "BOOKFORGE_S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID",
                "BOOKFORGE_S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY",
                "BOOKFORGE_STORE_DIR",
            ] {
                std::env::remove_var(var);
            }
        };

        clear_all();
        let config = StoreConfig::from_env();
        assert!(!config.is_s3());
        assert!(config.local_data_dir.is_none());

        clear_all();
        std::env::set_var("AWS_ENDPOINT_URL", "http://aws:443");
        std::env::set_var("AWS_ACCESS_KEY_ID", "aws-key");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "aws-secret");
        std::env::set_var("S3_BUCKET", "aws-bucket");
        let config = StoreConfig::from_env();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://aws:443"));
        assert_eq!(config.bucket.as_deref(), Some("aws-bucket"));
        assert!(config.is_s3());

        std::env::set_var("BOOKFORGE_S3_ENDPOINT", "http://minio:9000");
        std::env::set_var("BOOKFORGE_S3_BUCKET", "bf-bucket");
        std::env::set_var("BOOKFORGE_STORE_DIR", "/srv/covers");
        let config = StoreConfig::from_env();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(config.bucket.as_deref(), Some("bf-bucket"));
        assert_eq!(config.local_data_dir.as_deref(), Some("/srv/covers"));

        clear_all();
    }
}
