use crate::export::ReportOptions;
use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = ".Virtual360";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "VIRTUAL360_HOME";
pub const DEFAULT_LEDGER_FILE: &str = "assessment_data.csv";
pub const DEFAULT_REPORT_TITLE: &str = "Virtual360 Cost Assessment Report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger_path: PathBuf,
    pub persist: bool,
    pub export_dir: PathBuf,
    pub report_title: String,
    pub include_total_row: bool,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            persist: true,
            export_dir: PathBuf::from("."),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            include_total_row: true,
            api_port: 8360,
        }
    }
}

impl Config {
    pub fn root_dir() -> PathBuf {
        std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_root_dir)
    }

    pub fn config_path() -> PathBuf {
        Self::root_dir().join(CONFIG_FILE)
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    /// Falls back to defaults when no config file has been written yet.
    pub fn load_or_default() -> Result<Self> {
        if Self::config_path().exists() {
            Self::load()
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: (!self.report_title.is_empty()).then(|| self.report_title.clone()),
            include_total_row: self.include_total_row,
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "ledger_path" => {
                if value.trim().is_empty() {
                    bail!("ledger_path cannot be empty");
                }
                self.ledger_path = expand_home(value.trim());
            }
            "persist" => {
                self.persist = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("persist must be true/false"))?;
            }
            "export_dir" => {
                self.export_dir = expand_home(value.trim());
            }
            "report_title" => {
                self.report_title = value.trim().to_string();
            }
            "include_total_row" => {
                self.include_total_row = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("include_total_row must be true/false"))?;
            }
            "api_port" => {
                self.api_port = value
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: ledger_path|ledger.path, persist|ledger.persist, export_dir|export.dir, report_title|report.title, include_total_row|report.total_row, api_port|api.port"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "ledger_path" => Some(self.ledger_path.display().to_string()),
            "persist" => Some(self.persist.to_string()),
            "export_dir" => Some(self.export_dir.display().to_string()),
            "report_title" => Some(self.report_title.clone()),
            "include_total_row" => Some(self.include_total_row.to_string()),
            "api_port" => Some(self.api_port.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "ledger_path" | "ledger.path" => "ledger_path",
        "persist" | "ledger.persist" => "persist",
        "export_dir" | "export.dir" => "export_dir",
        "report_title" | "report.title" => "report_title",
        "include_total_row" | "report.total_row" => "include_total_row",
        "api_port" | "api.port" => "api_port",
        _ => key,
    }
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
