//! Configuration management for Macrodeck.
//!
//! This module defines the structure of the `macrodeck.toml` configuration file
//! and the resolved settings handed to the store, the runner and the app.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_RECORDINGS_DIR: &str = "recs";
const DEFAULT_SUFFIX: &str = ".xns";
const DEFAULT_RECORD_CMD: &str = "bash script1.sh";
const DEFAULT_STOP_CMD: &str = "bash stoprec.sh";
const DEFAULT_REPLAY_CMD: &str = r#"sleep {delay} && cnee --replay --file "{path}""#;
const DEFAULT_REPLAY_DELAY_SECS: u64 = 5;
const DEFAULT_SHELL: &str = "sh";

/// Top-level configuration structure corresponding to `macrodeck.toml`.
///
/// Every field is optional; anything missing falls back to the defaults
/// applied by [`Settings::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Directory scanned for recordings.
    pub recordings_dir: Option<String>,
    /// File-name suffix a recording must carry to be listed.
    pub suffix: Option<String>,
    /// Command line launched fire-and-forget to start recording.
    pub record_cmd: Option<String>,
    /// Command line launched fire-and-forget to stop recording.
    pub stop_cmd: Option<String>,
    /// Shell command template for replay. `{delay}` and `{path}` are
    /// substituted before the template is handed to the shell.
    pub replay_cmd: Option<String>,
    /// Grace period in seconds before the replay tool attaches.
    pub replay_delay_secs: Option<u64>,
    /// Shell used to run the rendered replay template.
    pub shell: Option<String>,
}

/// Resolved runtime settings.
///
/// Built once at startup from the configuration file and CLI overrides,
/// then passed by reference (or clone) into every component that needs a
/// path, suffix or command line. Nothing else in the crate reads globals.
#[derive(Debug, Clone)]
pub struct Settings {
    pub recordings_dir: PathBuf,
    pub suffix: String,
    pub record_cmd: String,
    pub stop_cmd: String,
    pub replay_cmd: String,
    pub replay_delay_secs: u64,
    pub shell: String,
}

impl Settings {
    /// Merges the configuration file with the CLI directory override and
    /// fills the gaps with defaults.
    pub fn resolve(config: Config, dir_override: Option<PathBuf>) -> Settings {
        let recordings_dir = dir_override.unwrap_or_else(|| {
            PathBuf::from(
                config
                    .recordings_dir
                    .unwrap_or_else(|| DEFAULT_RECORDINGS_DIR.to_string()),
            )
        });
        Settings {
            recordings_dir,
            suffix: config.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
            record_cmd: config
                .record_cmd
                .unwrap_or_else(|| DEFAULT_RECORD_CMD.to_string()),
            stop_cmd: config
                .stop_cmd
                .unwrap_or_else(|| DEFAULT_STOP_CMD.to_string()),
            replay_cmd: config
                .replay_cmd
                .unwrap_or_else(|| DEFAULT_REPLAY_CMD.to_string()),
            replay_delay_secs: config.replay_delay_secs.unwrap_or(DEFAULT_REPLAY_DELAY_SECS),
            shell: config.shell.unwrap_or_else(|| DEFAULT_SHELL.to_string()),
        }
    }

    /// Renders the replay template for one recording path.
    pub fn render_replay(&self, path: &Path) -> String {
        self.replay_cmd
            .replace("{delay}", &self.replay_delay_secs.to_string())
            .replace("{path}", &path.display().to_string())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::resolve(Config::default(), None)
    }
}

/// Loads and parses the configuration from a file path.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
