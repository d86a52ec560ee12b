use crate::config::CdnConfig;
use anyhow::{bail, Context, Result};

/// Preview images are capped at 5 MiB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, serde::Deserialize)]
struct CdnUploadResponse {
    url: String,
}

/// Forward an image to the configured CDN endpoint and return the public
/// URL it assigns. The server never stores image bytes itself.
#[tracing::instrument(skip(http, cdn, bytes), fields(size = bytes.len()))]
pub async fn upload_image(
    http: &reqwest::Client,
    cdn: &CdnConfig,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<String> {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(content_type)
        .context("Invalid image content type")?;
    let form = reqwest::multipart::Form::new()
        .text("folder", cdn.folder.clone())
        .part("file", part);

    let response = http
        .post(&cdn.upload_url)
        .multipart(form)
        .send()
        .await
        .context("CDN upload request failed")?;

    if !response.status().is_success() {
        bail!("CDN rejected upload with status {}", response.status());
    }

    let body: CdnUploadResponse = response
        .json()
        .await
        .context("Invalid CDN response body")?;
    Ok(body.url)
}
