//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - 外部依存を持たない（Rust標準ライブラリと最小限の依存のみ）
//! - フレームワークに依存しない
//! - ファイルシステムやクラウドAPIについて何も知らない
//! - 純粋なビジネスロジック
//!
//! ## 構成要素
//!
//! - **value_objects**: 検証済み識別子（BlobName, DeviceId, LogFilePath）
//! - **entities**: エンティティと集約（LogEntry, LogFile）
//! - **events**: ドメインイベント
//! - **errors**: 検証エラー
//! - **repositories**: 外部協調者の trait

pub mod entities;
pub mod errors;
pub mod events;
pub mod repositories;
pub mod value_objects;
