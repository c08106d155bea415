use anyhow::Context;
use serde::Deserialize;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// S3-compatible blob store holding receipt files.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL for receipt links. Falls back to `<endpoint>/<bucket>`.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));

        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "expense-tracker".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "expense-tracker-users".into()),
        };
        let storage = StorageConfig {
            endpoint: required("S3_ENDPOINT")?,
            bucket: lookup("S3_BUCKET").unwrap_or_else(|| "receipts".into()),
            access_key: required("S3_ACCESS_KEY")?,
            secret_key: required("S3_SECRET_KEY")?,
            region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
            public_url: lookup("S3_PUBLIC_URL").filter(|v| !v.trim().is_empty()),
        };
        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            database_url,
            jwt,
            storage,
            max_upload_bytes,
        })
    }
}
