//! # Upload Orchestrator
//!
//! 日次ログファイルを認可・転送・完了通知の3フェーズでアップロードする
//!
//! 認可から完了通知までを1つのリトライ単位として `RetryExecutor` で実行する。
//! パス解決・読み込み・BlobName の検証はリトライ単位の外で1回だけ行う。

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::dto::Outcome;
use crate::application::errors::{Classified, ErrorKind};
use crate::application::services::retry::{RetryError, RetryExecutor, RetryPolicy};
use crate::domain::errors::ValidationError;
use crate::domain::repositories::{LogFileHandler, SasUriGrant, UploadTransport};
use crate::domain::value_objects::{BlobName, LogFilePath};

/// アップロードのエラー
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("log file not found: {0}")]
    NotFound(LogFilePath),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: LogFilePath,
        #[source]
        source: std::io::Error,
    },

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("empty authorization URI")]
    EmptyAuthorizationUri,

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("missing correlation id")]
    MissingCorrelationId,

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("upload cancelled")]
    Cancelled,
}

impl Classified for UploadError {
    fn kind(&self) -> ErrorKind {
        match self {
            UploadError::NotFound(_) => ErrorKind::NotFound,
            UploadError::Validation(_) => ErrorKind::Validation,
            UploadError::Read { .. } => ErrorKind::Io,
            UploadError::Authorization(_) | UploadError::EmptyAuthorizationUri => {
                ErrorKind::Authorization
            }
            UploadError::Transfer(_) => ErrorKind::Transfer,
            UploadError::MissingCorrelationId => ErrorKind::MissingCorrelationId,
            UploadError::Notification(_) => ErrorKind::Notification,
            UploadError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// アップロードの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    ResolvingPath,
    Reading,
    Authorizing,
    Transferring,
    Notifying,
    Done,
    Failed,
}

impl UploadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Done | UploadPhase::Failed)
    }
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadPhase::Idle => "idle",
            UploadPhase::ResolvingPath => "resolving-path",
            UploadPhase::Reading => "reading",
            UploadPhase::Authorizing => "authorizing",
            UploadPhase::Transferring => "transferring",
            UploadPhase::Notifying => "notifying",
            UploadPhase::Done => "done",
            UploadPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// アップロード成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_path: LogFilePath,
    pub blob_name: BlobName,
    /// クエリ（SASトークン）を除いたBlobのURI
    pub blob_uri: String,
    pub correlation_id: String,
}

/// アップロードオーケストレーター
pub struct UploadOrchestrator<L, T>
where
    L: LogFileHandler,
    T: UploadTransport,
{
    log_files: Arc<L>,
    transport: Arc<T>,
    retry: RetryExecutor,
}

impl<L, T> UploadOrchestrator<L, T>
where
    L: LogFileHandler,
    T: UploadTransport,
{
    /// 新しいオーケストレーターを作成
    ///
    /// リトライ対象は認可・転送の失敗に限定される。
    pub fn new(log_files: Arc<L>, transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self {
            log_files,
            transport,
            retry: RetryExecutor::new(policy.retry_on(ErrorKind::RETRYABLE)),
        }
    }

    /// 現在のログファイルをアップロード
    ///
    /// # Returns
    ///
    /// プロトコルの成否を表す `Outcome`。リトライを使い切った場合の
    /// メッセージは `attempt N: ...` を試行順に連結したものになる。
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない: `UploadError::NotFound`（トランスポートは呼ばれない）
    /// - パス・BlobName の検証失敗: `UploadError::Validation`
    /// - 読み込み失敗: `UploadError::Read`
    /// - キャンセル: `UploadError::Cancelled`
    pub async fn upload_log_file(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Outcome<UploadReceipt>, UploadError> {
        enter(UploadPhase::Idle);
        let result = self.run(cancel).await;
        match &result {
            Ok(outcome) if outcome.is_success() => enter(UploadPhase::Done),
            _ => enter(UploadPhase::Failed),
        }
        result
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<Outcome<UploadReceipt>, UploadError> {
        enter(UploadPhase::ResolvingPath);
        let file_path = self.log_files.current_log_file_path()?;
        if !file_path.exists() {
            return Err(UploadError::NotFound(file_path));
        }

        enter(UploadPhase::Reading);
        let content = match tokio::fs::read(file_path.as_path()).await {
            Ok(content) => content,
            Err(source) => {
                return Err(UploadError::Read {
                    path: file_path,
                    source,
                })
            }
        };
        let blob_name = BlobName::new(file_path.file_name())?;
        debug!(
            "Uploading {} ({} bytes) as {}",
            file_path,
            content.len(),
            blob_name
        );

        let blob = &blob_name;
        let bytes = content.as_slice();
        let result = self
            .retry
            .execute(move || self.attempt(blob, bytes, cancel), cancel)
            .await;

        match result {
            Ok(grant) => {
                let blob_uri = strip_query(&grant.uri).to_string();
                info!("Uploaded {} to {}", file_path, blob_uri);
                Ok(Outcome::success(UploadReceipt {
                    file_path,
                    blob_name,
                    blob_uri,
                    correlation_id: grant.correlation_id,
                }))
            }
            Err(RetryError::Cancelled) => Err(UploadError::Cancelled),
            Err(RetryError::Exhausted(errors)) => Ok(Outcome::failure(format!(
                "upload failed after {} attempts: {}",
                errors.len(),
                errors
            ))),
            Err(RetryError::Aborted(errors)) => {
                let message = match errors.last() {
                    Some(last) if errors.len() == 1 => last.to_string(),
                    _ => format!(
                        "upload aborted after {} attempts: {}",
                        errors.len(),
                        errors
                    ),
                };
                Ok(Outcome::failure(message))
            }
        }
    }

    /// 認可 → 転送 → 完了通知（1回分の試行）
    async fn attempt(
        &self,
        blob_name: &BlobName,
        content: &[u8],
        cancel: &CancellationToken,
    ) -> Result<SasUriGrant, UploadError> {
        enter(UploadPhase::Authorizing);
        let grant = cancellable(cancel, self.transport.get_file_upload_sas_uri(blob_name))
            .await?
            .map_err(|e| UploadError::Authorization(format!("{:#}", e)))?;
        if grant.uri.trim().is_empty() {
            return Err(UploadError::EmptyAuthorizationUri);
        }

        enter(UploadPhase::Transferring);
        let transfer =
            cancellable(cancel, self.transport.upload_to_blob(&grant.uri, content)).await?;
        if let Err(e) = transfer {
            if !grant.correlation_id.trim().is_empty() {
                let notified = cancellable(
                    cancel,
                    self.transport
                        .notify_file_upload_complete(&grant.correlation_id, false),
                )
                .await?;
                if let Err(notify_err) = notified {
                    warn!(
                        "Ignoring failure notification error for {}: {:#}",
                        grant.correlation_id, notify_err
                    );
                }
            }
            return Err(UploadError::Transfer(format!("{:#}", e)));
        }

        if grant.correlation_id.trim().is_empty() {
            return Err(UploadError::MissingCorrelationId);
        }

        enter(UploadPhase::Notifying);
        cancellable(
            cancel,
            self.transport
                .notify_file_upload_complete(&grant.correlation_id, true),
        )
        .await?
        .map_err(|e| UploadError::Notification(format!("{:#}", e)))?;

        Ok(grant)
    }
}

fn enter(phase: UploadPhase) {
    debug!("Upload phase: {}", phase);
}

/// トランスポート呼び出しをキャンセル可能にする
async fn cancellable<F, R>(cancel: &CancellationToken, call: F) -> Result<R, UploadError>
where
    F: Future<Output = R>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
        result = call => Ok(result),
    }
}

fn strip_query(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(base, _)| base)
}
