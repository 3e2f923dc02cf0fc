//! # Upload Log Use Case
//!
//! 日次ログファイルをアップロードし、結果をドメインイベントとして配信するユースケース

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::application::dto::Outcome;
use crate::application::services::{EventDispatcher, UploadError, UploadOrchestrator, UploadReceipt};
use crate::domain::events::{DomainEvent, FileUploadFailedEvent, FileUploadedEvent};
use crate::domain::repositories::{LogFileHandler, UploadTransport};
use crate::domain::value_objects::LogFilePath;

/// ログアップロードユースケース
pub struct UploadLogCommandHandler<L, T>
where
    L: LogFileHandler,
    T: UploadTransport,
{
    log_files: Arc<L>,
    orchestrator: UploadOrchestrator<L, T>,
    dispatcher: EventDispatcher,
}

impl<L, T> UploadLogCommandHandler<L, T>
where
    L: LogFileHandler,
    T: UploadTransport,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `log_files` - ログファイルハンドラ（失敗イベントのパス解決に使用）
    /// * `orchestrator` - アップロードオーケストレーター
    /// * `dispatcher` - ドメインイベントの配信先
    pub fn new(
        log_files: Arc<L>,
        orchestrator: UploadOrchestrator<L, T>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            log_files,
            orchestrator,
            dispatcher,
        }
    }

    /// 現在のログファイルをアップロード
    ///
    /// 成功時は `FileUploadedEvent`、失敗時は `FileUploadFailedEvent` を配信する。
    /// キャンセル時はイベントを配信しない。
    pub async fn execute(&self, cancel: &CancellationToken) -> Outcome<UploadReceipt> {
        match self.orchestrator.upload_log_file(cancel).await {
            Ok(Outcome::Success(receipt)) => {
                let event = FileUploadedEvent::new(
                    receipt.file_path.clone(),
                    receipt.blob_name.clone(),
                    receipt.blob_uri.clone(),
                );
                self.publish(event.into(), cancel).await;
                Outcome::success(receipt)
            }
            Ok(Outcome::Failure(message)) => {
                self.publish_failure(None, &message, cancel).await;
                Outcome::failure(message)
            }
            Err(UploadError::Cancelled) => {
                info!("Upload cancelled");
                Outcome::failure(UploadError::Cancelled.to_string())
            }
            Err(e) => {
                let message = e.to_string();
                let path = match e {
                    UploadError::NotFound(path) => Some(path),
                    _ => None,
                };
                self.publish_failure(path, &message, cancel).await;
                Outcome::failure(message)
            }
        }
    }

    async fn publish_failure(
        &self,
        path: Option<LogFilePath>,
        message: &str,
        cancel: &CancellationToken,
    ) {
        let path = match path {
            Some(path) => path,
            None => match self.log_files.current_log_file_path() {
                Ok(path) => path,
                Err(e) => {
                    warn!("Cannot publish upload failure, log file path is invalid: {}", e);
                    return;
                }
            },
        };
        self.publish(FileUploadFailedEvent::new(path, message).into(), cancel)
            .await;
    }

    async fn publish(&self, event: DomainEvent, cancel: &CancellationToken) {
        let kind = event.kind();
        if let Err(e) = self.dispatcher.dispatch(event, cancel).await {
            warn!("Event {} was not fully handled: {}", kind, e);
        }
    }
}
