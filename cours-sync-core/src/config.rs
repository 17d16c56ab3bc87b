//! Import configuration.
//!
//! Built-in defaults, overridden by an optional TOML file at
//! `~/.config/cours-sync/config.toml` and then by `COURS_SYNC_*`
//! environment variables.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::colors::{CalendarColor, EventColor};
use crate::error::{ImportError, ImportResult};

/// Google rejects batch requests with more than 50 calls.
pub const MAX_BATCH_SIZE: usize = 50;

const CLIENT_SECRET_PREFIX: &str = "client_secret";
const CLIENT_SECRET_SUFFIX: &str = ".json";
const TOKEN_FILE: &str = "token.json";

/// Colors assigned to each kind of course event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventPalette {
    pub exam: EventColor,
    pub cm: EventColor,
    pub td: EventColor,
    pub tp: EventColor,
    pub default: EventColor,
}

impl Default for EventPalette {
    fn default() -> Self {
        Self {
            exam: EventColor::Sage,
            cm: EventColor::Tomato,
            td: EventColor::Blueberry,
            tp: EventColor::Tangerine,
            default: EventColor::Graphite,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Holds `client_secret*.json` and the cached `token.json`.
    pub google_dir: PathBuf,
    pub calendar_name: String,
    pub time_zone: String,
    pub batch_size: usize,
    pub redirect_port: u16,
    pub calendar_color: CalendarColor,
    pub title_prefixes: Vec<String>,
    pub exam_keywords: Vec<String>,
    pub event_colors: EventPalette,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            google_dir: default_google_dir(),
            calendar_name: "Cours CY".to_string(),
            time_zone: "Europe/Paris".to_string(),
            batch_size: MAX_BATCH_SIZE,
            redirect_port: 8080,
            calendar_color: CalendarColor::Cobalt,
            title_prefixes: ["CM ", "TD ", "TP "].map(String::from).to_vec(),
            exam_keywords: ["examen", "rattrapage", "rattrapages", "partiel"]
                .map(String::from)
                .to_vec(),
            event_colors: EventPalette::default(),
        }
    }
}

fn default_google_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("cours-sync").join("google"))
        .unwrap_or_else(|| PathBuf::from("google"))
}

impl ImportConfig {
    pub fn config_path() -> ImportResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ImportError::Config("Could not determine config directory".into()))?
            .join("cours-sync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path (if present) and the environment.
    pub fn load() -> ImportResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit file (if present) and the environment.
    pub fn load_from(path: &Path) -> ImportResult<Self> {
        let defaults = Config::try_from(&ImportConfig::default())
            .map_err(|e| ImportError::Config(e.to_string()))?;

        let config: ImportConfig = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("COURS_SYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ImportError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ImportError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ImportError::Config(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }

        if self.calendar_name.trim().is_empty() {
            return Err(ImportError::Config("calendar_name must not be empty".into()));
        }

        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> ImportResult<Tz> {
        self.time_zone
            .parse()
            .map_err(|_| ImportError::Config(format!("Unknown time zone '{}'", self.time_zone)))
    }

    /// The Google directory with `~` expanded.
    pub fn google_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.google_dir.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    pub fn token_path(&self) -> PathBuf {
        self.google_dir().join(TOKEN_FILE)
    }

    pub fn client_secret_pattern(&self) -> String {
        format!("{CLIENT_SECRET_PREFIX}*{CLIENT_SECRET_SUFFIX}")
    }

    /// Whether a file name matches `client_secret*.json`.
    pub fn is_client_secret_name(name: &str) -> bool {
        name.starts_with(CLIENT_SECRET_PREFIX) && name.ends_with(CLIENT_SECRET_SUFFIX)
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.redirect_port)
    }

    pub fn redirect_address(&self) -> String {
        format!("127.0.0.1:{}", self.redirect_port)
    }
}
