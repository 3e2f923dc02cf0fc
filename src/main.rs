//! logsync - Daily Log Writer & Uploader
//!
//! 日次の JSON Lines ログを書き込み、クラウドストレージにアップロード

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use logsync::adapter::config::Config;
use logsync::driver::{Args, LogSyncWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Create workflow with injected dependencies
    let workflow = LogSyncWorkflow::new(config)?;

    // Ctrl-C で実行中の処理をキャンセル
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("⚠ Interrupted, cancelling...");
            trigger.cancel();
        }
    });

    workflow.execute(&args, &cancel).await
}
