use anyhow::Context;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::storage::StorageClient;

const MAX_NAME_LEN: usize = 128;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A receipt file taken from the create form.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Where an uploaded receipt landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReceipt {
    pub key: String,
    pub url: String,
}

/// Uploads a receipt and returns its location. Any storage failure is
/// returned as is; nothing has been persisted about the file at that point.
#[instrument(skip(storage, upload), fields(file_name = %upload.file_name, size = upload.body.len()))]
pub async fn upload_receipt(
    storage: &dyn StorageClient,
    upload: ReceiptUpload,
) -> anyhow::Result<StoredReceipt> {
    storage.ensure_bucket().await.context("ensure receipt bucket")?;

    let key = object_key(Uuid::new_v4(), &upload.file_name);
    let content_type = upload
        .content_type
        .as_deref()
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    storage
        .put_object(&key, upload.body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let url = storage.object_url(&key);
    debug!(%key, %url, "receipt uploaded");
    Ok(StoredReceipt { key, url })
}

fn object_key(id: Uuid, file_name: &str) -> String {
    format!("{}-{}", id, sanitize_file_name(file_name))
}

/// Reduces a client-supplied file name to a safe object key suffix.
fn sanitize_file_name(raw: &str) -> String {
    lazy_static! {
        static ref UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
    }
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE.replace_all(last, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "receipt".to_string();
    }
    cleaned.chars().take(MAX_NAME_LEN).collect()
}
