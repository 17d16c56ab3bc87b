//! The OAuth client downloaded from the Google Cloud console.
//!
//! Google names these files `client_secret_<id>.apps.googleusercontent.com.json`
//! and nests the values under `installed` (desktop apps) or `web`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn load(path: &Path) -> ImportResult<Self> {
        let invalid = |reason: String| ImportError::InvalidClientSecret {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: ClientSecretFile =
            serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| invalid("expected an \"installed\" or \"web\" section".into()))
    }
}

/// First `client_secret*.json` in `dir`, by file name.
pub fn find_client_secret(dir: &Path, pattern: &str) -> ImportResult<PathBuf> {
    let missing = || ImportError::MissingClientSecret {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
    };

    let entries = std::fs::read_dir(dir).map_err(|_| missing())?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(ImportConfig::is_client_secret_name)
        })
        .collect();

    matches.sort();
    matches.into_iter().next().ok_or_else(missing)
}
