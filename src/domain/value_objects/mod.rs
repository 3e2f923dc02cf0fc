//! # Value Objects
//!
//! 構築時に一度だけ検証される識別子
//!
//! - **BlobName**: アップロード先のBlob名
//! - **DeviceId**: IoTデバイスID
//! - **LogFilePath**: 日次ログファイルのパス

pub mod blob_name;
pub mod device_id;
pub mod log_file_path;

pub use blob_name::BlobName;
pub use device_id::DeviceId;
pub use log_file_path::LogFilePath;
