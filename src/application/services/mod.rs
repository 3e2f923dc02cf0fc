//! # Application Services
//!
//! リトライ実行・イベント配信・アップロード手順の中核サービス

pub mod event_dispatcher;
pub mod retry;
pub mod upload_orchestrator;

pub use event_dispatcher::{
    DispatchError, EventDispatcher, EventHandler, HandlerFailure, HandlerRegistry,
    HandlerRegistryBuilder,
};
pub use retry::{AggregateError, RetryError, RetryExecutor, RetryPolicy};
pub use upload_orchestrator::{UploadError, UploadOrchestrator, UploadPhase, UploadReceipt};
