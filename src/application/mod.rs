//! # Application Layer
//!
//! アプリケーション固有のビジネスフロー（ユースケース）
//!
//! ## 特徴
//!
//! - Domain層のエンティティとイベントを組み合わせてビジネスフローを実現
//! - Repository traitに依存（実装には依存しない）
//! - 外部システムの詳細は知らない
//!
//! ## 構成要素
//!
//! - **dto**: Data Transfer Object
//! - **errors**: リトライ判定用のエラー分類
//! - **event_handlers**: ドメインイベントの購読者
//! - **factories**: ログエントリの生成
//! - **services**: リトライ・イベント配信・アップロード手順
//! - **use_cases**: ユースケース

pub mod dto;
pub mod errors;
pub mod event_handlers;
pub mod factories;
pub mod services;
pub mod use_cases;
