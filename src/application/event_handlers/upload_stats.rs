//! # Upload Stats Handler
//!
//! アップロードの成功/失敗回数を集計する

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::application::services::EventHandler;
use crate::domain::events::{FileUploadFailedEvent, FileUploadedEvent};

/// 集計値のスナップショット
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub succeeded: u64,
    pub failed: u64,
}

impl UploadStats {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// 成功・失敗の両イベントに登録して使う
#[derive(Debug, Default)]
pub struct UploadStatsHandler {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl UploadStatsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UploadStats {
        UploadStats {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl EventHandler<FileUploadedEvent> for UploadStatsHandler {
    async fn handle(
        &self,
        _event: &FileUploadedEvent,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let count = self.succeeded.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Uploads succeeded: {}", count);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "UploadStatsHandler"
    }
}

#[async_trait]
impl EventHandler<FileUploadFailedEvent> for UploadStatsHandler {
    async fn handle(
        &self,
        _event: &FileUploadFailedEvent,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let count = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Uploads failed: {}", count);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "UploadStatsHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{EventDispatcher, HandlerRegistry};
    use crate::domain::value_objects::{BlobName, LogFilePath};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_counts_both_event_kinds() {
        let stats = Arc::new(UploadStatsHandler::new());
        let registry = HandlerRegistry::builder()
            .register::<FileUploadedEvent, _>(stats.clone())
            .register::<FileUploadFailedEvent, _>(stats.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);
        let path = LogFilePath::new("/var/log/app/2024-12-25.log").unwrap();
        let cancel = CancellationToken::new();

        dispatcher
            .dispatch(
                FileUploadedEvent::new(
                    path.clone(),
                    BlobName::new("2024-12-25.log").unwrap(),
                    "https://devstorage.blob.core.windows.net/uploads/2024-12-25.log",
                )
                .into(),
                &cancel,
            )
            .await
            .unwrap();
        for _ in 0..2 {
            dispatcher
                .dispatch(FileUploadFailedEvent::new(path.clone(), "timeout").into(), &cancel)
                .await
                .unwrap();
        }

        assert_eq!(
            stats.snapshot(),
            UploadStats {
                succeeded: 1,
                failed: 2
            }
        );
        assert_eq!(stats.snapshot().total(), 3);
    }
}
