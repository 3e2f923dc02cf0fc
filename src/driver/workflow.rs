//! Workflow Orchestration
//!
//! 依存関係の組み立てと書き込み/アップロードの実行

use anyhow::Result;
use log::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapter::config::Config;
use crate::adapter::repositories::FileLogHandler;
use crate::adapter::transport::SimulatedUploadTransport;
use crate::application::event_handlers::{
    FileUploadFailedHandler, FileUploadedHandler, LogWrittenToFileHandler, UploadStats,
    UploadStatsHandler,
};
use crate::application::factories::LogEntryFactory;
use crate::application::services::{EventDispatcher, HandlerRegistry, UploadOrchestrator};
use crate::application::use_cases::{UploadLogCommandHandler, WriteLogCommandHandler};
use crate::domain::events::{FileUploadFailedEvent, FileUploadedEvent, LogWrittenToFileEvent};

use super::cli::{Args, Mode};

/// 起動時に1度だけ構築するハンドラ表
pub fn build_registry(stats: Arc<UploadStatsHandler>) -> HandlerRegistry {
    HandlerRegistry::builder()
        .register::<LogWrittenToFileEvent, _>(Arc::new(LogWrittenToFileHandler))
        .register::<FileUploadedEvent, _>(Arc::new(FileUploadedHandler))
        .register::<FileUploadedEvent, _>(stats.clone())
        .register::<FileUploadFailedEvent, _>(Arc::new(FileUploadFailedHandler))
        .register::<FileUploadFailedEvent, _>(stats)
        .build()
}

/// Log Sync Workflow
pub struct LogSyncWorkflow {
    config: Config,
    write_use_case: WriteLogCommandHandler<FileLogHandler>,
    upload_use_case: UploadLogCommandHandler<FileLogHandler, SimulatedUploadTransport>,
    stats: Arc<UploadStatsHandler>,
}

impl LogSyncWorkflow {
    /// Create a new workflow instance with dependency injection
    ///
    /// # Errors
    ///
    /// UTCオフセットまたはデバイスIDが不正な場合
    pub fn new(config: Config) -> Result<Self> {
        let offset = config.offset()?;
        let device_id = config.device_id()?;

        // Adapter implementations
        let log_files = Arc::new(FileLogHandler::new(config.log_directory(), offset));
        let mut transport =
            SimulatedUploadTransport::new(config.storage_account.clone(), device_id);
        if config.simulate_failure {
            transport = transport.failing("simulated service unavailable");
        }

        // Event handlers
        let stats = Arc::new(UploadStatsHandler::new());
        let dispatcher = EventDispatcher::new(build_registry(stats.clone()));

        // Use Cases construction
        let write_use_case = WriteLogCommandHandler::new(
            log_files.clone(),
            Arc::new(LogEntryFactory::new(offset)),
            dispatcher.clone(),
        );
        let orchestrator =
            UploadOrchestrator::new(log_files.clone(), Arc::new(transport), config.retry_policy());
        let upload_use_case = UploadLogCommandHandler::new(log_files, orchestrator, dispatcher);

        Ok(Self {
            config,
            write_use_case,
            upload_use_case,
            stats,
        })
    }

    pub fn stats(&self) -> UploadStats {
        self.stats.snapshot()
    }

    /// Execute the workflow
    pub async fn execute(&self, args: &Args, cancel: &CancellationToken) -> Result<()> {
        info!("Starting logsync...");

        println!("✓ Using configuration:");
        println!("  Log directory: {}", self.config.log_directory().display());
        println!("  UTC offset: {}", self.config.utc_offset);
        println!("  Storage account: {}", self.config.storage_account);

        match args.mode() {
            Mode::Once { write, upload } => {
                if write {
                    self.write_once(cancel).await;
                }
                if upload {
                    self.upload_once(cancel).await;
                }
            }
            Mode::Watch { iterations } => self.watch(iterations, cancel).await,
        }

        let stats = self.stats();
        println!(
            "✓ Done: {} upload(s) succeeded, {} failed",
            stats.succeeded, stats.failed
        );
        Ok(())
    }

    /// エントリを1件書き込む
    pub async fn write_once(&self, cancel: &CancellationToken) -> bool {
        let outcome = self.write_use_case.execute(cancel).await;
        match outcome.error_message() {
            None => {
                let entry = outcome.value();
                println!("✓ [{}] {}", entry.event_type(), entry.comment());
                true
            }
            Some(message) => {
                println!("✗ Write failed: {}", message);
                false
            }
        }
    }

    /// 今日のログファイルを1回アップロードする
    pub async fn upload_once(&self, cancel: &CancellationToken) -> bool {
        let outcome = self.upload_use_case.execute(cancel).await;
        match outcome.error_message() {
            None => {
                println!("✓ Uploaded {}", outcome.value().blob_uri);
                true
            }
            Some(_) if cancel.is_cancelled() => {
                println!("⚠ Upload cancelled");
                false
            }
            Some(message) => {
                println!("✗ Upload failed: {}", message);
                false
            }
        }
    }

    /// 設定された間隔で書き込みとアップロードを繰り返す
    async fn watch(&self, iterations: Option<u64>, cancel: &CancellationToken) {
        let mut write_tick = tokio::time::interval(self.config.write_interval());
        let mut upload_tick = tokio::time::interval(self.config.upload_interval());
        // 初回のアップロードは開始からアップロード間隔の後
        upload_tick.reset();

        println!(
            "✓ Watching: write every {}s, upload every {}s (Ctrl-C to stop)",
            self.config.write_interval().as_secs(),
            self.config.upload_interval().as_secs()
        );

        let mut writes = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = write_tick.tick() => {
                    self.write_once(cancel).await;
                    writes += 1;
                    if iterations.is_some_and(|limit| writes >= limit) {
                        break;
                    }
                }
                _ = upload_tick.tick() => {
                    self.upload_once(cancel).await;
                }
            }
        }
    }
}
