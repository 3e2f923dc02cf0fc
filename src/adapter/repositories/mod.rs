//! Repository Implementations
//!
//! Domain層で定義されたtraitの具体的な実装

pub mod file_log_handler;

pub use file_log_handler::FileLogHandler;
