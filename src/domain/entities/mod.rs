//! # Domain Entities
//!
//! ビジネスエンティティと集約を定義するモジュール
//!
//! ## エンティティ
//!
//! - **LogEntry**: ログエントリ（JSON Lines の1行）
//! - **LogFile**: 1日分のログを保持する集約ルート

pub mod log_entry;
pub mod log_file;

pub use log_entry::{EventType, LogEntry};
pub use log_file::LogFile;
