//! Media resolution: turns a pending image payload into a durable URL.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::document::MediaSlot;
use crate::sync::SyncError;

/// A selected (and usually cropped) image waiting for Save.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPayload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl MediaPayload {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        MediaPayload {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Resolves a payload to a URL-like string. Guests have no `owner`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(
        &self,
        owner: Option<&str>,
        slot: MediaSlot,
        payload: &MediaPayload,
    ) -> Result<String, SyncError>;
}

/// Encodes the payload into a `data:` URL. Needs no network, so it is what guests
/// get and what authenticated users get when object storage is not configured.
pub struct InlineMediaStore;

#[async_trait]
impl MediaStore for InlineMediaStore {
    async fn store(
        &self,
        _owner: Option<&str>,
        _slot: MediaSlot,
        payload: &MediaPayload,
    ) -> Result<String, SyncError> {
        Ok(payload.to_data_url())
    }
}

/// Uploads to an S3-compatible bucket (AWS or MinIO).
pub struct S3MediaStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        S3MediaStore {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// `media/<owner>/<slot>/<uuid>.<ext>`; a fresh name per upload so cached URLs of an
/// older image never point at new bytes.
pub fn object_key(owner: Option<&str>, slot: MediaSlot, payload: &MediaPayload) -> String {
    format!(
        "media/{}/{}/{}.{}",
        owner.unwrap_or("guest"),
        slot,
        Uuid::new_v4(),
        payload.extension()
    )
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn store(
        &self,
        owner: Option<&str>,
        slot: MediaSlot,
        payload: &MediaPayload,
    ) -> Result<String, SyncError> {
        let key = object_key(owner, slot, payload);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(payload.bytes.clone()))
            .content_type(&payload.content_type)
            .send()
            .await
            .map_err(|e| SyncError::Upload {
                slot,
                message: e.to_string(),
            })?;

        info!("Uploaded {slot} to s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_store_produces_data_url() {
        let payload = MediaPayload::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png");
        let url = InlineMediaStore
            .store(None, MediaSlot::Photo, &payload)
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_object_key_layout() {
        let payload = MediaPayload::new(Vec::new(), "image/jpeg");
        let key = object_key(Some("user-1"), MediaSlot::Signature, &payload);
        assert!(key.starts_with("media/user-1/signature/"));
        assert!(key.ends_with(".jpg"));
    }
}
