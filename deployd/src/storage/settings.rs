//! Settings file management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::options::{AppOptions, ServerOptions};
use crate::deploy::{Pipeline, PipelineStep};
use crate::errors::DeployError;
use crate::logs::{LogLevel, LogOptions};
use crate::server::ConcurrencyPolicy;
use crate::trigger;

/// deployd settings
///
/// Shared by the service and the trigger client; each reads the part it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Listener configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Checkout the pipeline runs in
    #[serde(default = "default_project_path")]
    pub project_path: PathBuf,

    /// Ordered pipeline steps
    #[serde(default = "default_pipeline_steps")]
    pub pipeline_steps: Vec<StepSettings>,

    /// Bound on the whole pipeline run, in seconds
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,

    /// Handling of overlapping deploy requests
    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,

    /// Trigger client configuration
    #[serde(default)]
    pub trigger: TriggerSettings,
}

fn default_project_path() -> PathBuf {
    PathBuf::from("/var/www/app")
}

fn default_pipeline_steps() -> Vec<StepSettings> {
    [
        "git fetch origin",
        "git reset --hard origin/main",
        "npm install --production",
        "npm run build",
        "pm2 reload all",
    ]
    .into_iter()
    .map(StepSettings::new)
    .collect()
}

fn default_step_timeout() -> u64 {
    600
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            server: ServerSettings::default(),
            project_path: default_project_path(),
            pipeline_steps: default_pipeline_steps(),
            step_timeout_secs: default_step_timeout(),
            concurrency: ConcurrencyPolicy::default(),
            trigger: TriggerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults when it does not exist
    pub async fn load(path: &Path) -> Result<Self, DeployError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(DeployError::ConfigError(format!(
                    "unable to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&contents)
            .map_err(|e| DeployError::ConfigError(format!("invalid {}: {}", path.display(), e)))
    }

    /// Check the service-side settings
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.pipeline_steps.is_empty() {
            return Err(DeployError::ConfigError(
                "pipeline_steps must contain at least one step".to_string(),
            ));
        }
        if let Some(index) = self
            .pipeline_steps
            .iter()
            .position(|step| step.command.trim().is_empty())
        {
            return Err(DeployError::ConfigError(format!(
                "pipeline step {} has an empty command",
                index + 1
            )));
        }
        if self.step_timeout_secs == 0 {
            return Err(DeployError::ConfigError(
                "step_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The pipeline with every working directory resolved against `project_path`
    pub fn pipeline(&self) -> Pipeline {
        let steps = self
            .pipeline_steps
            .iter()
            .map(|step| {
                let working_dir = match &step.working_dir {
                    Some(dir) => self.project_path.join(dir),
                    None => self.project_path.clone(),
                };
                PipelineStep::new(step.command.clone(), working_dir)
            })
            .collect();

        Pipeline::new(steps, Duration::from_secs(self.step_timeout_secs))
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level,
            json_format: self.log_json,
        }
    }

    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            server: ServerOptions {
                host: self.server.host.clone(),
                port: self.server.port,
            },
            pipeline: self.pipeline(),
            concurrency: self.concurrency,
        }
    }

    pub fn trigger_options(&self) -> trigger::Options {
        trigger::Options {
            url: self.trigger.url.clone(),
            timeout: Duration::from_secs(self.trigger.timeout_secs),
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// One configured pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSettings {
    /// Shell command
    pub command: String,

    /// Directory relative to `project_path`; an absolute path replaces it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl StepSettings {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
        }
    }
}

/// Trigger client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Full URL of the deploy endpoint
    #[serde(default = "default_trigger_url")]
    pub url: String,

    /// Request timeout in seconds, long enough to cover a full pipeline run
    #[serde(default = "default_trigger_timeout")]
    pub timeout_secs: u64,
}

fn default_trigger_url() -> String {
    "https://localhost:9000/deploy".to_string()
}

fn default_trigger_timeout() -> u64 {
    900
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            url: default_trigger_url(),
            timeout_secs: default_trigger_timeout(),
        }
    }
}
