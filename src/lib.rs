//! # logsync
//!
//! 日次の JSON Lines ログを書き込み、認可・転送・完了通知の3フェーズでアップロードするツール
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 値オブジェクト、LogFile 集約、ドメインイベント、外部協調者の trait
//! - **Application層**: リトライ実行、イベント配信、アップロード手順、ユースケース
//! - **Adapter層**: ファイルシステム、アップロードトランスポート、設定ファイル
//! - **Driver層**: CLI、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
