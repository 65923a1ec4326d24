//! Settings loading tests

use std::path::PathBuf;
use std::time::Duration;

use deployd::deploy::PipelineStep;
use deployd::logs::LogLevel;
use deployd::server::ConcurrencyPolicy;
use deployd::storage::settings::Settings;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(&dir.path().join("absent.json")).await.unwrap();

    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.concurrency, ConcurrencyPolicy::Reject);
    assert_eq!(settings.pipeline_steps.len(), 5);
    assert_eq!(settings.pipeline_steps[1].command, "git reset --hard origin/main");
    assert!(settings.validate().is_ok());
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "log_level": "debug",
            "server": { "port": 3001 },
            "project_path": "/srv/site",
            "pipeline_steps": [
                { "command": "git fetch origin" },
                { "command": "npm run build", "working_dir": "web" },
                { "command": "pm2 reload site", "working_dir": "/opt/pm2" }
            ],
            "step_timeout_secs": 120,
            "concurrency": "queue"
        }"#,
    )
    .unwrap();

    let settings = Settings::load(&path).await.unwrap();

    assert_eq!(settings.log_level, LogLevel::Debug);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 3001);
    assert_eq!(settings.concurrency, ConcurrencyPolicy::Queue);
    assert_eq!(settings.trigger.url, "https://localhost:9000/deploy");

    let pipeline = settings.pipeline();
    assert_eq!(pipeline.timeout(), Duration::from_secs(120));
    assert_eq!(
        pipeline.steps(),
        &[
            PipelineStep::new("git fetch origin", "/srv/site"),
            PipelineStep::new("npm run build", PathBuf::from("/srv/site/web")),
            PipelineStep::new("pm2 reload site", "/opt/pm2"),
        ]
    );

    let options = settings.app_options();
    assert_eq!(options.server.port, 3001);
    assert_eq!(options.pipeline.steps().len(), 3);
}

#[tokio::test]
async fn test_invalid_json_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Settings::load(&path).await.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_validation() {
    let mut settings = Settings {
        pipeline_steps: vec![],
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    settings = Settings::default();
    settings.pipeline_steps[2].command = "   ".to_string();
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("step 3"));

    settings = Settings {
        step_timeout_secs: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_trigger_options() {
    let mut settings = Settings::default();
    settings.trigger.url = "https://deploy.example.com/deploy".to_string();
    settings.trigger.timeout_secs = 30;

    let options = settings.trigger_options();
    assert_eq!(options.url, "https://deploy.example.com/deploy");
    assert_eq!(options.timeout, Duration::from_secs(30));
}
