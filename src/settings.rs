use crate::dashboard::layout::DEFAULT_TAB_NAME;
use crate::dashboard::store::DASHBOARD_FILE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger is initialised at debug level and honours
    /// `RUST_LOG`. Defaults to `false` when the field is missing.
    #[serde(default)]
    pub debug_logging: bool,
    /// Also write log output to this file.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Where the dashboard state is persisted, relative to the settings file
    /// unless absolute.
    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,
    /// Widget catalog file. If `None`, the built-in catalog is used.
    #[serde(default)]
    pub catalog_file: Option<String>,
    /// User templates file, layered over the built-in templates. Created on
    /// first use.
    #[serde(default)]
    pub templates_file: Option<String>,
    /// Name of the tab in a fresh dashboard.
    #[serde(default = "default_tab_name")]
    pub default_tab_name: String,
}

fn default_dashboard_file() -> String {
    DASHBOARD_FILE.to_string()
}

fn default_tab_name() -> String {
    DEFAULT_TAB_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            dashboard_file: default_dashboard_file(),
            catalog_file: None,
            templates_file: None,
            default_tab_name: default_tab_name(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
