//! # Domain Repositories
//!
//! 外部協調者の trait（インターフェース）定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供
//! - 依存性逆転の原則（DIP）を実現

pub mod log_file_handler;
pub mod upload_transport;

pub use log_file_handler::LogFileHandler;
pub use upload_transport::{SasUriGrant, UploadTransport};
