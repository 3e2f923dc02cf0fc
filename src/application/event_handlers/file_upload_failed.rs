//! # FileUploadFailed Handler
//!
//! 失敗メッセージを一時的/恒久的に分類して記録する

use async_trait::async_trait;
use log::{error, warn};
use tokio_util::sync::CancellationToken;

use crate::application::services::EventHandler;
use crate::domain::events::FileUploadFailedEvent;

const TRANSIENT_PATTERNS: [&str; 6] = [
    "timeout",
    "temporary",
    "unavailable",
    "retry",
    "network",
    "connection",
];

/// 失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 時間をおけば回復しうる
    Transient,
    /// 設定や入力の修正が必要
    Permanent,
}

/// エラーメッセージを分類（大文字小文字を区別しないキーワード一致）
pub fn classify(message: &str) -> FailureClass {
    let lower = message.to_lowercase();
    if TRANSIENT_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureClass::Transient
    } else {
        FailureClass::Permanent
    }
}

#[derive(Debug, Default)]
pub struct FileUploadFailedHandler;

#[async_trait]
impl EventHandler<FileUploadFailedEvent> for FileUploadFailedHandler {
    async fn handle(
        &self,
        event: &FileUploadFailedEvent,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        match classify(&event.error_message) {
            FailureClass::Transient => warn!(
                "Transient upload failure for {}, next cycle will retry: {}",
                event.file_path, event.error_message
            ),
            FailureClass::Permanent => error!(
                "Permanent upload failure for {}: {}",
                event.file_path, event.error_message
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FileUploadFailedHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transient_keywords() {
        assert_eq!(classify("Network Timeout"), FailureClass::Transient);
        assert_eq!(
            classify("attempt 1: authorization failed: Service Unavailable"),
            FailureClass::Transient
        );
        assert_eq!(classify("connection reset by peer"), FailureClass::Transient);
    }

    #[test]
    fn test_classify_permanent() {
        assert_eq!(classify("missing correlation id"), FailureClass::Permanent);
        assert_eq!(classify(""), FailureClass::Permanent);
    }
}
