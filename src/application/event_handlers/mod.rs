//! # Event Handlers
//!
//! ドメインイベントの購読者
//!
//! - **LogWrittenToFileHandler**: 書き込みの記録
//! - **FileUploadedHandler**: アップロード完了の記録
//! - **FileUploadFailedHandler**: 失敗の分類と記録
//! - **UploadStatsHandler**: 成功/失敗回数の集計

pub mod file_upload_failed;
pub mod file_uploaded;
pub mod log_written;
pub mod upload_stats;

pub use file_upload_failed::{classify, FailureClass, FileUploadFailedHandler};
pub use file_uploaded::FileUploadedHandler;
pub use log_written::LogWrittenToFileHandler;
pub use upload_stats::{UploadStats, UploadStatsHandler};
