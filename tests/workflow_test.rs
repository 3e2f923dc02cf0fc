//! Workflow Integration Tests
//!
//! LogSyncWorkflow の統合テスト

use logsync::adapter::config::Config;
use logsync::driver::cli::Args;
use logsync::driver::workflow::LogSyncWorkflow;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// テスト用のConfigファイルを作成
fn create_test_config(dir: &Path, simulate_failure: bool) -> String {
    let config_path = dir.join("config.json");
    let config_content = format!(
        r#"{{
  "device_id": "line-01/plc",
  "log_directory": "{}",
  "utc_offset": "+09:00",
  "max_retry_count": 2,
  "initial_retry_delay_ms": 1,
  "storage_account": "teststorage",
  "simulate_failure": {}
}}"#,
        dir.join("logs").display(),
        simulate_failure
    );
    fs::write(&config_path, config_content).unwrap();
    config_path.to_string_lossy().to_string()
}

#[tokio::test]
async fn test_workflow_execute_write_and_upload() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(temp_dir.path(), false);

    let config = Config::load(&config_path).unwrap();
    let args = Args {
        config: config_path,
        write: false,
        upload: false,
        watch: false,
        iterations: None,
    };
    let workflow = LogSyncWorkflow::new(config).unwrap();

    let result = workflow.execute(&args, &CancellationToken::new()).await;

    assert!(result.is_ok(), "Workflow should succeed: {:?}", result.err());
    assert_eq!(workflow.stats().succeeded, 1);
    assert_eq!(fs::read_dir(temp_dir.path().join("logs")).unwrap().count(), 1);
}

#[tokio::test]
async fn test_workflow_reports_simulated_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(temp_dir.path(), true);

    let config = Config::load(&config_path).unwrap();
    let args = Args {
        config: config_path,
        write: true,
        upload: true,
        watch: false,
        iterations: None,
    };
    let workflow = LogSyncWorkflow::new(config).unwrap();

    workflow
        .execute(&args, &CancellationToken::new())
        .await
        .unwrap();

    let stats = workflow.stats();
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_workflow_write_only_leaves_upload_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(temp_dir.path(), false);

    let config = Config::load(&config_path).unwrap();
    let args = Args {
        config: config_path,
        write: true,
        upload: false,
        watch: false,
        iterations: None,
    };
    let workflow = LogSyncWorkflow::new(config).unwrap();

    workflow
        .execute(&args, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(workflow.stats().total(), 0);
}
