use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use nailfeed_core::{Attachment, FeedError, Result, UploadService};
use nailfeed_types::UploadedMedia;

use crate::client::StrapiClient;

const UPLOAD: &str = "/api/upload";

#[async_trait]
impl UploadService for StrapiClient {
    async fn upload(&self, file: &Attachment) -> Result<UploadedMedia> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| FeedError::Upload(format!("invalid mime type {}: {}", file.mime, e)))?;
        let form = Form::new().part("files", part);

        let uploaded: Vec<UploadedMedia> = self
            .json(self.request(Method::POST, UPLOAD).multipart(form))
            .await?;
        match uploaded.into_iter().next() {
            Some(media) => {
                info!("Uploaded {} as media {}", file.file_name, media.id);
                Ok(media)
            }
            None => {
                warn!("Upload of {} returned no media", file.file_name);
                Err(FeedError::Upload("server returned no media".into()))
            }
        }
    }
}
