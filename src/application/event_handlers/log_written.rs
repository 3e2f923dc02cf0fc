//! # LogWrittenToFile Handler

use async_trait::async_trait;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::application::services::EventHandler;
use crate::domain::events::LogWrittenToFileEvent;

/// ログ書き込みイベントを記録する
#[derive(Debug, Default)]
pub struct LogWrittenToFileHandler;

#[async_trait]
impl EventHandler<LogWrittenToFileEvent> for LogWrittenToFileHandler {
    async fn handle(
        &self,
        event: &LogWrittenToFileEvent,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        debug!(
            "[{}] {} {}: {}",
            event.file_path.file_name(),
            event.entry.timestamp().format("%H:%M:%S%.3f"),
            event.entry.event_type(),
            event.entry.comment()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogWrittenToFileHandler"
    }
}
