//! Project configuration (`satchel.toml`) for the Satchel CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Python minor version packaged into build environments when the
/// configuration does not pin one.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file '{0}' not found")]
    FileNotFound(String),
    #[error("No apps defined in configuration")]
    NoApps,
    #[error("App '{0}' not found in configuration")]
    UnknownApp(String),
    #[error("Multiple apps defined; select one with --app")]
    AmbiguousApp,
}

/// Tool-wide settings section
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    pub python: Option<String>,
}

/// One `[app.<name>]` table
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub formal_name: String,
    pub bundle: String,
    pub version: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tool: Option<ToolConfig>,
    // BTreeMap keeps phase iteration order deterministic across runs.
    #[serde(default)]
    pub app: BTreeMap<String, AppConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Python version targeted by generated build environments.
    pub fn python_version(&self) -> String {
        self.tool
            .as_ref()
            .and_then(|tool| tool.python.clone())
            .unwrap_or_else(|| DEFAULT_PYTHON_VERSION.to_string())
    }

    /// Resolve the apps a phase operates on: the selected app, or all of
    /// them when no selection was made.
    pub fn apps(&self, selected: Option<&str>) -> Result<Vec<AppDescriptor>, ConfigError> {
        if self.app.is_empty() {
            return Err(ConfigError::NoApps);
        }

        if let Some(name) = selected {
            let app = self
                .app
                .get(name)
                .ok_or_else(|| ConfigError::UnknownApp(name.to_string()))?;
            return Ok(vec![AppDescriptor::from_config(name, app)]);
        }

        Ok(self
            .app
            .iter()
            .map(|(name, app)| AppDescriptor::from_config(name, app))
            .collect())
    }

    /// Resolve exactly one app, for phases that act on a single binary.
    pub fn one_app(&self, selected: Option<&str>) -> Result<AppDescriptor, ConfigError> {
        let mut apps = self.apps(selected)?;
        if apps.len() > 1 {
            return Err(ConfigError::AmbiguousApp);
        }
        // Just checked non-empty via apps().
        Ok(apps.remove(0))
    }
}

/// Identity of one packaged application, fixed for the duration of a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDescriptor {
    /// Machine name, used as the registry key ("first-app")
    pub app_name: String,
    /// Display name, spaces preserved ("First App")
    pub formal_name: String,
    /// Reverse-domain bundle prefix ("com.example")
    pub bundle: String,
    pub version: String,
}

impl AppDescriptor {
    fn from_config(name: &str, app: &AppConfig) -> Self {
        Self {
            app_name: name.to_string(),
            formal_name: app.formal_name.clone(),
            bundle: app.bundle.clone(),
            version: app.version.clone(),
        }
    }

    /// Full bundle identifier ("com.example.first-app").
    pub fn bundle_identifier(&self) -> String {
        format!("{}.{}", self.bundle, self.app_name)
    }

    /// Display name with spaces replaced, for use in file names.
    pub fn normalized_name(&self) -> String {
        self.formal_name.replace(' ', "_")
    }
}
