use crate::error::{AppError, AppResult};
use crate::{GetConfig, GetHttpClient, System};

use anyhow::Context;
use bytes::Bytes;
use entrait::entrait;
use sha2::Digest;

/// A single uploaded image, buffered in memory.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Stores the image at the image host and returns its public https URL.
#[entrait(pub UploadImage, mock_api=UploadImageMock)]
async fn upload_image(
    deps: &(impl GetConfig + GetHttpClient + System),
    image: ImageUpload,
) -> AppResult<String> {
    let config = deps.get_image_host_config();
    let credentials = config
        .credentials()
        .ok_or_else(|| anyhow::anyhow!("image host credentials are not configured"))?;

    let timestamp = deps.get_current_time().unix_timestamp();

    let mut part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
        .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()));
    if let Some(content_type) = &image.content_type {
        part = part
            .mime_str(content_type)
            .map_err(|_| AppError::invalid_input("Unsupported image content type"))?;
    }

    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("api_key", credentials.api_key.to_string())
        .text("timestamp", timestamp.to_string())
        .text("signature_algorithm", "sha256")
        .text("signature", sign_upload(timestamp, credentials.api_secret));

    let url = format!(
        "{}/v1_1/{}/image/upload",
        config.base_url.trim_end_matches('/'),
        credentials.cloud_name
    );

    let response = deps
        .get_http_client()
        .post(&url)
        .multipart(form)
        .send()
        .await
        .context("image upload request failed")?
        .error_for_status()
        .context("image host rejected the upload")?;

    let UploadResponse { secure_url } = response
        .json()
        .await
        .context("unexpected image host response")?;

    tracing::debug!(%secure_url, "uploaded image");

    Ok(secure_url)
}

/// Signature over the signed upload parameters, which here is only the timestamp.
fn sign_upload(timestamp: i64, api_secret: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(format!("timestamp={timestamp}{api_secret}").as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageHostConfig;
    use crate::GetConfigMock;

    use assert_matches::*;
    use unimock::*;

    #[test]
    fn upload_signature_should_be_hex_sha256() {
        assert_eq!(
            "fe7a29a535fc65aadbec02755c08fd66fc87e4f137f7fbced1af7cde0548fff4",
            sign_upload(1700000000, "s3cr3t")
        );
    }

    #[tokio::test]
    async fn upload_without_credentials_should_fail_before_any_request() {
        let deps = Unimock::new(
            GetConfigMock::get_image_host_config
                .each_call(matching!())
                .returns(ImageHostConfig::default()),
        );

        assert_matches!(
            upload_image(
                &deps,
                ImageUpload {
                    bytes: Bytes::from_static(b"img"),
                    file_name: None,
                    content_type: None,
                },
            )
            .await,
            Err(AppError::Anyhow(_))
        );
    }
}
