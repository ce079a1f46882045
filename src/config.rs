use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::Column;
use crate::overview::{Currency, Period};

const CONFIG_CANDIDATES: [&str; 4] = ["adolens.toml", "adolens.json", "adolens.yaml", "adolens.yml"];

/// Configuration file structure for ADOLens.
///
/// Holds the connection settings plus the per-report options that the
/// dashboard widgets used to keep in their settings blobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Organization and credentials
    #[serde(default)]
    pub azure_devops: AzureDevOpsConfig,

    /// Pipeline overview options
    #[serde(default)]
    pub pipelines: PipelinesConfig,

    /// Business value options
    #[serde(default)]
    pub business_value: BusinessValueConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureDevOpsConfig {
    /// Personal access token
    pub token: Option<String>,

    /// Organization URL (e.g., 'https://dev.azure.com/fabrikam')
    pub organization_url: Option<String>,

    /// Current project, used when a single project is reported
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelinesConfig {
    /// Table title
    pub title: Option<String>,

    /// Report succeeded/failed/canceled as percentages of finished runs
    #[serde(default)]
    pub show_as_percentage: bool,

    /// Span `selected-projects` instead of the current project
    #[serde(default)]
    pub multiple_projects: bool,

    #[serde(default)]
    pub selected_projects: Vec<String>,

    /// Maximum number of builds fetched per project
    #[serde(default = "default_build_limit")]
    pub limit: usize,

    #[serde(default)]
    pub show_project_name: bool,

    #[serde(default = "default_true")]
    pub show_runs: bool,

    #[serde(default = "default_true")]
    pub show_succeeded: bool,

    #[serde(default = "default_true")]
    pub show_failed: bool,

    #[serde(default = "default_true")]
    pub show_canceled: bool,

    #[serde(default = "default_true")]
    pub show_average: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BusinessValueConfig {
    /// Card title
    pub title: Option<String>,

    #[serde(default = "default_work_item_type")]
    pub work_item_type: String,

    #[serde(default)]
    pub period: Period,

    #[serde(default)]
    pub currency: Currency,

    pub target_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            title: None,
            show_as_percentage: false,
            multiple_projects: false,
            selected_projects: Vec::new(),
            limit: default_build_limit(),
            show_project_name: false,
            show_runs: true,
            show_succeeded: true,
            show_failed: true,
            show_canceled: true,
            show_average: true,
        }
    }
}

impl Default for BusinessValueConfig {
    fn default() -> Self {
        Self {
            title: None,
            work_item_type: default_work_item_type(),
            period: Period::default(),
            currency: Currency::default(),
            target_value: None,
        }
    }
}

impl PipelinesConfig {
    /// Columns enabled by the `show-*` toggles, in table order.
    pub fn columns(&self) -> Vec<Column> {
        [
            (self.show_project_name, Column::Project),
            (self.show_runs, Column::Runs),
            (self.show_succeeded, Column::Succeeded),
            (self.show_failed, Column::Failed),
            (self.show_canceled, Column::Canceled),
            (self.show_average, Column::Average),
        ]
        .into_iter()
        .filter_map(|(enabled, column)| enabled.then_some(column))
        .collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_build_limit() -> usize {
    1000
}

fn default_work_item_type() -> String {
    "Epic".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./adolens.toml, ./adolens.json, ./adolens.yaml, ./adolens.yml
    /// 3. `<config dir>/adolens/adolens.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let mut candidates: Vec<PathBuf> = CONFIG_CANDIDATES.iter().map(PathBuf::from).collect();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("adolens").join("adolens.toml"));
        }

        match find_existing(&candidates) {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file, picking the format from the extension
    /// (TOML unless `.json`, `.yaml` or `.yml`).
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

fn find_existing(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}
