use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{common::error::AppError, domain::ledger::SettlementPolicy};

pub const CONFIG_ENV: &str = "DEBT_LEDGER_CONFIG";
const CONFIG_DIR: &str = ".config/debtq";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON document holding the ledger.
    pub data_file: PathBuf,
    /// Where `Debts.md` is written; no report when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
    /// Prefix for per-person amounts in the debts report.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub settlement: SettlementPolicy,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: home_dir().join(CONFIG_DIR).join("data.json"),
            report_dir: None,
            currency: default_currency(),
            settlement: SettlementPolicy::default(),
        }
    }
}

impl Config {
    /// `$DEBT_LEDGER_CONFIG` if set, else `~/.config/debtq/config.json`.
    pub fn default_path() -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => home_dir().join(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    /// Reads the config at `path`, writing and returning the default one when
    /// the file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Config, AppError> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parsing {}: {e}", path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let cfg = Config::default();
                cfg.save(path)?;
                tracing::info!(path = %path.display(), "default config written");
                Ok(cfg)
            }
            Err(e) => Err(AppError::Config(format!("reading {}: {e}", path.display()))),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("encoding config: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }
}
