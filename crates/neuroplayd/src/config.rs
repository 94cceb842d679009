//! Configuration management for neuroplayd.
//!
//! Loads settings from /etc/neuroplay/config.toml or uses defaults.

use crate::dispatcher::RetryPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file path.
pub const CONFIG_PATH: &str = "/etc/neuroplay/config.toml";

/// Intake queue and result store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// How long an unprocessed submission stays claimable.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: u64,

    /// Delivery window for a terminal result before it expires.
    #[serde(default = "default_result_ttl")]
    pub result_ttl_secs: u64,

    /// Bound on queued-but-undelivered job ids.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Interval of the expired-entry sweeper.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_pending_ttl() -> u64 {
    3600
}

fn default_result_ttl() -> u64 {
    3600
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: default_pending_ttl(),
            result_ttl_secs: default_result_ttl(),
            queue_capacity: default_queue_capacity(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl IntakeConfig {
    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }

    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Worker dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent workers pulling from the queue.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Total processing tries per job, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff between tries.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Bound on a single processing try.
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    250
}

fn default_job_timeout() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            retry_base_ms: default_retry_base_ms(),
            job_timeout_secs: default_job_timeout(),
        }
    }
}

impl WorkerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_ms),
            job_timeout: Duration::from_secs(self.job_timeout_secs),
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub worker: WorkerConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8430".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            intake: IntakeConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = DaemonConfig::default();
        assert_eq!(config.worker.max_attempts, 3);
        assert_eq!(config.intake.pending_ttl_secs, 3600);
        assert!(config.listen_addr.starts_with("127.0.0.1"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: DaemonConfig = toml::from_str(
            r#"
            listen_addr = "0.0.0.0:9000"

            [worker]
            workers = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.worker.workers, 8);
        assert_eq!(config.worker.max_attempts, 3);
        assert_eq!(config.intake.queue_capacity, 1024);
    }

    #[test]
    fn retry_policy_conversion() {
        let policy = WorkerConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.job_timeout, Duration::from_secs(30));
    }
}
