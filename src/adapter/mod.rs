//! Adapter Layer
//!
//! 外部システム（ファイルシステム、クラウドアップロード、設定ファイル）との統合

pub mod config;
pub mod repositories;
pub mod transport;
