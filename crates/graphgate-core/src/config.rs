//! `graphgate.toml` configuration.
//!
//! ```toml
//! [gate]
//! latency_budget_ms = 8.0
//! cpu_budget_pct = 80.0
//!
//! [cost]
//! base_overhead_ms = 0.05
//! edge_scale = 1.0
//! structural_coefficient = 0.02
//! frame_budget_ms = 16.67
//! default_kind_us = 1.0
//!
//! [policy]
//! disallowed_patterns = ['\bspectrogram\s*\[']
//! accessor_token = '\bAUDIO_[A-Za-z0-9_]*'
//!
//! [[validation.rules]]
//! property = "bypass"
//! rule = "boolean"
//! ```
//!
//! Unknown keys are rejected in every section. Every field has a default
//! except the gate thresholds: two incompatible
//! budget pairs are in circulation, so the caller must pick one explicitly
//! (config or CLI flags).
//!
//! # Resolution
//!
//! The first file found wins: `--config <path>` (must exist), then
//! `./graphgate.toml`, then `<config_dir>/graphgate/config.toml`, then
//! built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GateError, Result};
use crate::model::PropertyRule;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "graphgate.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphgateConfig {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default)]
    pub latency_budget_ms: Option<f64>,
    #[serde(default)]
    pub cpu_budget_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    #[serde(default = "default_base_overhead_ms")]
    pub base_overhead_ms: f64,
    #[serde(default = "default_edge_scale")]
    pub edge_scale: f64,
    #[serde(default = "default_structural_coefficient")]
    pub structural_coefficient: f64,
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: f64,
    #[serde(default = "default_kind_us")]
    pub default_kind_us: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            base_overhead_ms: default_base_overhead_ms(),
            edge_scale: default_edge_scale(),
            structural_coefficient: default_structural_coefficient(),
            frame_budget_ms: default_frame_budget_ms(),
            default_kind_us: default_kind_us(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default = "default_disallowed_patterns")]
    pub disallowed_patterns: Vec<String>,
    #[serde(default = "default_accessor_token")]
    pub accessor_token: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            disallowed_patterns: default_disallowed_patterns(),
            accessor_token: default_accessor_token(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    #[serde(default)]
    pub rules: Vec<PropertyRule>,
}

const fn default_base_overhead_ms() -> f64 {
    0.05
}

const fn default_edge_scale() -> f64 {
    1.0
}

const fn default_structural_coefficient() -> f64 {
    0.02
}

const fn default_frame_budget_ms() -> f64 {
    16.67
}

const fn default_kind_us() -> f64 {
    1.0
}

fn default_disallowed_patterns() -> Vec<String> {
    [
        r"\bspectrogram\s*\[",
        r"\bwaveform\s*\[",
        r"\bfftBins\s*\[",
        r"\baudioBuffer\s*\[",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_accessor_token() -> String {
    r"\bAUDIO_[A-Za-z0-9_]*".to_string()
}

/// Gate thresholds. Both bounds are always caller-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateThresholds {
    pub latency_budget_ms: f64,
    pub cpu_budget_pct: f64,
}

impl GateConfig {
    /// Combine CLI flag values with configured values; flags win.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::MissingThreshold`] if a bound is supplied by
    /// neither source and [`GateError::Usage`] if a bound is not a positive
    /// finite number.
    pub fn thresholds(
        &self,
        latency_flag: Option<f64>,
        cpu_flag: Option<f64>,
    ) -> Result<GateThresholds> {
        let latency_budget_ms = latency_flag
            .or(self.latency_budget_ms)
            .ok_or(GateError::MissingThreshold("latency_budget_ms"))?;
        let cpu_budget_pct = cpu_flag
            .or(self.cpu_budget_pct)
            .ok_or(GateError::MissingThreshold("cpu_budget_pct"))?;

        for (name, value) in [
            ("latency_budget_ms", latency_budget_ms),
            ("cpu_budget_pct", cpu_budget_pct),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GateError::Usage(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        Ok(GateThresholds {
            latency_budget_ms,
            cpu_budget_pct,
        })
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Project(PathBuf),
    User(PathBuf),
    Defaults,
}

/// Load and parse one config file.
///
/// # Errors
///
/// Returns [`GateError::Config`] if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<GraphgateConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GateError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config = toml::from_str::<GraphgateConfig>(&content).map_err(|e| GateError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    config.check(path)?;
    Ok(config)
}

/// Resolve the effective configuration.
///
/// # Errors
///
/// Returns [`GateError::ConfigMissing`] if `explicit` does not exist and
/// [`GateError::Config`] if the selected file is invalid.
pub fn resolve_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<(GraphgateConfig, ConfigSource)> {
    let user_path = dirs::config_dir().map(|dir| dir.join("graphgate").join("config.toml"));
    resolve_config_inner(explicit, working_dir, user_path.as_deref())
}

fn resolve_config_inner(
    explicit: Option<&Path>,
    working_dir: &Path,
    user_path: Option<&Path>,
) -> Result<(GraphgateConfig, ConfigSource)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(GateError::ConfigMissing(path.to_path_buf()));
        }
        let config = load_config_file(path)?;
        info!(path = %path.display(), "using explicit config");
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    let project = working_dir.join(PROJECT_CONFIG_FILE);
    if project.is_file() {
        let config = load_config_file(&project)?;
        debug!(path = %project.display(), "using project config");
        return Ok((config, ConfigSource::Project(project)));
    }

    if let Some(user) = user_path.filter(|p| p.is_file()) {
        let config = load_config_file(user)?;
        debug!(path = %user.display(), "using user config");
        return Ok((config, ConfigSource::User(user.to_path_buf())));
    }

    debug!("no config file found, using defaults");
    Ok((GraphgateConfig::default(), ConfigSource::Defaults))
}

impl GraphgateConfig {
    fn check(&self, path: &Path) -> Result<()> {
        let cost = &self.cost;
        let fields = [
            ("cost.base_overhead_ms", cost.base_overhead_ms),
            ("cost.edge_scale", cost.edge_scale),
            ("cost.structural_coefficient", cost.structural_coefficient),
            ("cost.default_kind_us", cost.default_kind_us),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(GateError::Config {
                path: path.to_path_buf(),
                reason: format!("{name} must be a non-negative number, got {value}"),
            });
        }
        if !cost.frame_budget_ms.is_finite() || cost.frame_budget_ms <= 0.0 {
            return Err(GateError::Config {
                path: path.to_path_buf(),
                reason: format!(
                    "cost.frame_budget_ms must be positive, got {}",
                    cost.frame_budget_ms
                ),
            });
        }
        Ok(())
    }
}
