use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::stream::session::{DEFAULT_CAPACITY, DEFAULT_PERIOD};
use crate::types::RunMode;

pub const CONFIG_FILE: &str = "deepspectrum.json";
pub const MODE_ENV_VAR: &str = "DEEPSPECTRUM_MODE";

/// Startup configuration, threaded explicitly into the app composition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub run_mode: RunMode,
    pub stream_period_ms: u64,
    pub window_capacity: usize,
    pub recorded_points: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Demo,
            stream_period_ms: DEFAULT_PERIOD.as_millis() as u64,
            window_capacity: DEFAULT_CAPACITY,
            recorded_points: 30,
        }
    }
}

impl AppConfig {
    pub fn stream_period(&self) -> Duration {
        Duration::from_millis(self.stream_period_ms.max(1))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load from the working directory, falling back to defaults. A broken
    /// config file is reported but does not block startup.
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring {CONFIG_FILE}: {err:#}");
                Self::default()
            }
        }
    }

    /// Apply a `demo`/`live` override, as carried by `DEEPSPECTRUM_MODE`.
    /// Unknown values are reported and ignored.
    pub fn with_mode_override(mut self, value: Option<&str>) -> Self {
        if let Some(raw) = value {
            match RunMode::from_str_loose(raw) {
                Some(mode) => self.run_mode = mode,
                None => log::warn!("ignoring unknown run mode {raw:?}"),
            }
        }
        self
    }
}
