//! `.geoimpact/config.toml` discovery and environment overrides.
//!
//! Precedence, highest first: CLI flags, `GEOIMPACT_*` environment
//! variables, the config file, built-in defaults.

use crate::error::{CliError, CliResult};
use geoimpact_compare::CompareConfig;
use geoimpact_core::Resolution;
use geoimpact_grid::GridConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".geoimpact";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_FIXTURE: &str = "GEOIMPACT_FIXTURE";
pub const ENV_CANONICAL_RESOLUTION: &str = "GEOIMPACT_CANONICAL_RESOLUTION";
pub const ENV_CACHE_CAPACITY: &str = "GEOIMPACT_CACHE_CAPACITY";
pub const ENV_GROWTH_RATE: &str = "GEOIMPACT_GROWTH_RATE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixture workspace; relative paths resolve against the project root.
    pub fixture: Option<PathBuf>,
    pub grid: GridConfig,
    pub compare: CompareConfig,
}

/// Walk up from `start` looking for a `.geoimpact/` directory.
fn find_config_dir_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Find `.geoimpact/` by walking up from cwd, falling back to `~/.geoimpact/`.
pub fn find_config_dir() -> Option<PathBuf> {
    if let Some(d) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_dir_from(&cwd))
    {
        return Some(d);
    }
    let global = dirs::home_dir()?.join(CONFIG_DIR);
    global.is_dir().then_some(global)
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> CliResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a config file. A relative `fixture` is anchored at the directory
    /// holding `.geoimpact/`, or the file's own directory elsewhere.
    pub fn read(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml(&text)?;
        if let Some(fixture) = config.fixture.take() {
            config.fixture = Some(match project_root(path) {
                Some(root) if fixture.is_relative() => root.join(fixture),
                _ => fixture,
            });
        }
        Ok(config)
    }

    /// Apply `GEOIMPACT_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CliResult<()> {
        if let Some(path) = lookup(ENV_FIXTURE) {
            self.fixture = Some(PathBuf::from(path));
        }
        if let Some(v) = lookup(ENV_CANONICAL_RESOLUTION) {
            let requested: i64 = parse_env(ENV_CANONICAL_RESOLUTION, &v)?;
            let resolution = Resolution::new(requested)
                .map_err(|e| CliError::Config(format!("{ENV_CANONICAL_RESOLUTION}: {e}")))?;
            self.grid.canonical_resolution = resolution;
        }
        if let Some(v) = lookup(ENV_CACHE_CAPACITY) {
            self.grid.cache_capacity = parse_env(ENV_CACHE_CAPACITY, &v)?;
        }
        if let Some(v) = lookup(ENV_GROWTH_RATE) {
            self.compare.growth_rate = parse_env(ENV_GROWTH_RATE, &v)?;
        }
        Ok(())
    }

    /// Apply CLI flags.
    pub fn apply_cli(&mut self, fixture: Option<&Path>) {
        if let Some(path) = fixture {
            self.fixture = Some(path.to_path_buf());
        }
    }

    pub fn require_fixture(&self) -> CliResult<&Path> {
        self.fixture.as_deref().ok_or(CliError::NoFixture)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> CliResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("{name}={value:?}: {e}")))
}

fn project_root(config_file: &Path) -> Option<PathBuf> {
    let dir = config_file.parent()?;
    if dir.file_name().is_some_and(|n| n == CONFIG_DIR) {
        dir.parent().map(Path::to_path_buf)
    } else {
        Some(dir.to_path_buf())
    }
}

/// Load configuration from `config_override` or the discovered
/// `.geoimpact/config.toml`, then apply the process environment.
pub fn load(config_override: Option<&Path>) -> CliResult<EngineConfig> {
    let path = match config_override {
        Some(p) if p.is_file() => Some(p.to_path_buf()),
        Some(p) => {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                p.display()
            )))
        }
        None => find_config_dir()
            .map(|d| d.join(CONFIG_FILE))
            .filter(|p| p.is_file()),
    };
    let mut config = match &path {
        Some(p) => EngineConfig::read(p)?,
        None => EngineConfig::default(),
    };
    config.apply_env(|k| std::env::var(k).ok())?;
    tracing::debug!(config_file = ?path, fixture = ?config.fixture, "configuration loaded");
    Ok(config)
}
