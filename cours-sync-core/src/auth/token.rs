//! The cached OAuth token (`token.json`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use google_calendar::AccessToken;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// Tokens are treated as expired slightly early so a run doesn't start
/// with a token that dies mid-import.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Build from a token endpoint response. Google usually omits the
    /// refresh token on refresh, so the previous one is kept.
    pub fn from_access_token(token: &AccessToken, previous_refresh: Option<&str>) -> Self {
        let expires_at = if token.expires_in > 0 {
            Some(Utc::now() + Duration::seconds(token.expires_in))
        } else {
            None
        };

        let refresh_token = if token.refresh_token.is_empty() {
            previous_refresh.map(str::to_string)
        } else {
            Some(token.refresh_token.clone())
        };

        StoredToken {
            access_token: token.access_token.clone(),
            refresh_token,
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) < expires_at,
            None => true,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// On-disk location of the cached token.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when there is no usable cached token.
    pub fn load(&self) -> ImportResult<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;

        match serde_json::from_str(&contents) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable token cache {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, token: &StoredToken) -> ImportResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ImportError::Config(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, contents)?;

        // Owner-only (0600), the file holds OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!("Saved token to {}", self.path.display());
        Ok(())
    }

    /// Returns whether a token was actually removed.
    pub fn delete(&self) -> ImportResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
