//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **WriteLogCommandHandler**: ログエントリの生成と追記
//! - **UploadLogCommandHandler**: ログファイルのアップロードと結果の配信

pub mod upload_log;
pub mod write_log;

pub use upload_log::UploadLogCommandHandler;
pub use write_log::WriteLogCommandHandler;
