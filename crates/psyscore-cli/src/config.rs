//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use psyscore_report::{ReportFormat, ReportOptions};

/// Top-level psyscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsyscoreConfig {
    /// Format used when `--format` is not given.
    #[serde(default)]
    pub default_format: ReportFormat,
    /// Directory for reports saved with `--save`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report heading.
    #[serde(default = "default_title")]
    pub title: String,
    /// Whether reports include the subtest table.
    #[serde(default = "default_true")]
    pub include_subtests: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./psyscore-reports")
}
fn default_title() -> String {
    "Test report".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for PsyscoreConfig {
    fn default() -> Self {
        Self {
            default_format: ReportFormat::default(),
            output_dir: default_output_dir(),
            title: default_title(),
            include_subtests: true,
        }
    }
}

impl PsyscoreConfig {
    /// Renderer options derived from this config.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: self.title.clone(),
            include_subtests: self.include_subtests,
            ..ReportOptions::default()
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `psyscore.toml` in the current directory
/// 2. `~/.config/psyscore/config.toml`
///
/// `PSYSCORE_FORMAT` overrides `default_format`.
pub fn load_config_from(path: Option<&Path>) -> Result<PsyscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("psyscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PsyscoreConfig::default(),
    };

    if let Ok(format) = std::env::var("PSYSCORE_FORMAT") {
        config.default_format = format
            .parse()
            .map_err(|e: String| anyhow::anyhow!("PSYSCORE_FORMAT: {e}"))?;
    }

    Ok(config)
}

fn parse_config(content: &str) -> Result<PsyscoreConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("psyscore"))
}
