//! Runner configuration file.
//!
//! An optional TOML file overrides the machine defaults. Every key is
//! optional; missing keys keep the value from [`MachineConfig::default`].
//!
//! ```toml
//! base_clock_frequency = 985248
//! tacts_in_frame = 19656
//! clock_multiplier = 1
//! sample_rate = 44100
//!
//! [cpu]
//! stall_timeout_tacts = 1000
//! processor_port = true
//! telemetry_depth = 8
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use retroscope_core::core::MachineConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_clock_frequency: Option<u32>,
    pub tacts_in_frame: Option<u32>,
    pub clock_multiplier: Option<u32>,
    pub sample_rate: Option<u32>,
    pub cpu: CpuFileConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CpuFileConfig {
    pub stall_timeout_tacts: Option<u32>,
    pub processor_port: Option<bool>,
    pub telemetry_depth: Option<usize>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply the file's settings on top of the defaults.
    pub fn to_machine_config(&self) -> MachineConfig {
        let mut config = MachineConfig::default();
        if let Some(hz) = self.base_clock_frequency {
            config.base_clock_frequency = hz;
        }
        if let Some(tacts) = self.tacts_in_frame {
            config.tacts_in_frame = tacts;
        }
        if let Some(multiplier) = self.clock_multiplier {
            config.clock_multiplier = multiplier;
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(timeout) = self.cpu.stall_timeout_tacts {
            config.cpu.stall_timeout_tacts = timeout;
        }
        if let Some(port) = self.cpu.processor_port {
            config.cpu.processor_port = port;
        }
        if let Some(depth) = self.cpu.telemetry_depth {
            config.cpu.telemetry_depth = depth;
        }
        config
    }
}

/// `<config dir>/retroscope/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("retroscope").join("config.toml"))
}

/// Load the configuration. An explicit `path` must exist; the default
/// location is optional and silently skipped when absent.
pub fn load(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };
    log::debug!("loading config from {}", path.display());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    FileConfig::parse(&text).with_context(|| format!("invalid config {}", path.display()))
}
