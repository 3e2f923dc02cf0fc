//! # Log File Handler Trait
//!
//! 日次ログファイルの解決と追記を抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::log_entry::LogEntry;
use crate::domain::errors::ValidationError;
use crate::domain::value_objects::LogFilePath;

/// ログファイルハンドラ
///
/// 現在の日次ログファイルのパス解決と、エントリの追記を担当する
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogFileHandler: Send + Sync {
    /// 現在（対象タイムゾーンの今日）のログファイルパスを返す
    fn current_log_file_path(&self) -> Result<LogFilePath, ValidationError>;

    /// エントリを JSON Lines の1行として追記する
    ///
    /// # Errors
    ///
    /// ディレクトリ作成やファイル書き込みに失敗した場合
    async fn append_log_entry(&self, entry: &LogEntry) -> Result<()>;
}
