//! # FileUploaded Handler

use async_trait::async_trait;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::application::services::EventHandler;
use crate::domain::events::FileUploadedEvent;

/// アップロード完了イベントを記録する
#[derive(Debug, Default)]
pub struct FileUploadedHandler;

#[async_trait]
impl EventHandler<FileUploadedEvent> for FileUploadedHandler {
    async fn handle(
        &self,
        event: &FileUploadedEvent,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        info!(
            "{} uploaded as {} ({})",
            event.file_path, event.blob_name, event.blob_uri
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FileUploadedHandler"
    }
}
