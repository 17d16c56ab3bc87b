//! Google credentials: client secret discovery, token cache, OAuth flow.

mod client_secret;
mod google_oauth;
mod token;

pub use client_secret::{ClientSecret, find_client_secret};
pub use google_oauth::{GoogleOAuth, SCOPES};
pub use token::{StoredToken, TokenCache};

use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};

/// Everything needed to talk to the Calendar API on the user's behalf.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub secret: ClientSecret,
    pub token: StoredToken,
}

/// Source of usable credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> ImportResult<Credentials>;
}

/// The network half of OAuth: user consent and token refresh.
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    async fn consent(&self, secret: &ClientSecret) -> ImportResult<StoredToken>;

    async fn refresh(&self, secret: &ClientSecret, token: &StoredToken) -> ImportResult<StoredToken>;
}

/// Replays fixed credentials without touching disk or network.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> ImportResult<Credentials> {
        Ok(self.0.clone())
    }
}

/// Credentials backed by the Google directory: cached token first, then
/// refresh, then interactive consent.
pub struct CredentialStore<F = GoogleOAuth> {
    google_dir: PathBuf,
    secret_pattern: String,
    cache: TokenCache,
    flow: F,
}

impl CredentialStore<GoogleOAuth> {
    pub fn new(config: &ImportConfig) -> Self {
        Self::with_flow(config, GoogleOAuth::new(config))
    }
}

impl<F: OAuthFlow> CredentialStore<F> {
    pub fn with_flow(config: &ImportConfig, flow: F) -> Self {
        Self {
            google_dir: config.google_dir(),
            secret_pattern: config.client_secret_pattern(),
            cache: TokenCache::new(config.token_path()),
            flow,
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Forget the cached token. Returns whether one existed.
    pub fn logout(&self) -> ImportResult<bool> {
        self.cache.delete()
    }
}

#[async_trait]
impl<F: OAuthFlow> CredentialProvider for CredentialStore<F> {
    async fn credentials(&self) -> ImportResult<Credentials> {
        let secret_path = find_client_secret(&self.google_dir, &self.secret_pattern)?;
        debug!("Using client secret {}", secret_path.display());
        let secret = ClientSecret::load(&secret_path)?;

        let token = match self.cache.load()? {
            Some(token) if token.is_valid() => {
                debug!("Cached token is still valid");
                return Ok(Credentials { secret, token });
            }
            Some(token) if token.can_refresh() => {
                info!("Access token expired, refreshing");
                match self.flow.refresh(&secret, &token).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!("Token refresh failed, removing {}", self.cache.path().display());
                        self.cache.delete()?;
                        return Err(match e {
                            ImportError::TokenRefresh(_) => e,
                            other => ImportError::TokenRefresh(other.to_string()),
                        });
                    }
                }
            }
            _ => self.flow.consent(&secret).await?,
        };

        self.cache.save(&token)?;
        Ok(Credentials { secret, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    const SECRET: &str =
        r#"{"installed": {"client_id": "id.apps.googleusercontent.com", "client_secret": "s"}}"#;

    #[derive(Default)]
    struct FakeFlow {
        fail_refresh: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeFlow {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn token(access: &str, expires_in: i64, refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }

    #[async_trait]
    impl OAuthFlow for FakeFlow {
        async fn consent(&self, _secret: &ClientSecret) -> ImportResult<StoredToken> {
            self.calls.lock().unwrap().push("consent");
            Ok(token("consented", 3600, Some("1//fresh")))
        }

        async fn refresh(
            &self,
            _secret: &ClientSecret,
            previous: &StoredToken,
        ) -> ImportResult<StoredToken> {
            self.calls.lock().unwrap().push("refresh");
            if self.fail_refresh {
                return Err(ImportError::TokenRefresh("invalid_grant".into()));
            }
            Ok(token("refreshed", 3600, previous.refresh_token.as_deref()))
        }
    }

    fn setup(with_secret: bool) -> (tempfile::TempDir, ImportConfig) {
        let dir = tempfile::tempdir().unwrap();
        if with_secret {
            std::fs::write(dir.path().join("client_secret_test.json"), SECRET).unwrap();
        }
        let config = ImportConfig {
            google_dir: dir.path().to_path_buf(),
            ..ImportConfig::default()
        };
        (dir, config)
    }

    #[tokio::test]
    async fn missing_secret_fails_before_any_flow() {
        let (_dir, config) = setup(false);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());

        let err = store.credentials().await.unwrap_err();
        assert!(matches!(err, ImportError::MissingClientSecret { .. }));
        assert!(store.flow.calls().is_empty());
    }

    #[tokio::test]
    async fn first_run_consents_and_persists() {
        let (_dir, config) = setup(true);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());

        let creds = store.credentials().await.unwrap();
        assert_eq!(creds.token.access_token, "consented");
        assert_eq!(creds.secret.client_secret, "s");
        assert_eq!(store.flow.calls(), vec!["consent"]);
        assert_eq!(store.cache().load().unwrap(), Some(creds.token));
    }

    #[tokio::test]
    async fn valid_cached_token_is_replayed() {
        let (_dir, config) = setup(true);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());
        store.cache().save(&token("cached", 3600, None)).unwrap();

        let creds = store.credentials().await.unwrap();
        assert_eq!(creds.token.access_token, "cached");
        assert!(store.flow.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_saved() {
        let (_dir, config) = setup(true);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());
        store
            .cache()
            .save(&token("stale", -60, Some("1//keep")))
            .unwrap();

        let creds = store.credentials().await.unwrap();
        assert_eq!(creds.token.access_token, "refreshed");
        assert_eq!(creds.token.refresh_token.as_deref(), Some("1//keep"));
        assert_eq!(store.flow.calls(), vec!["refresh"]);

        let saved = store.cache().load().unwrap().unwrap();
        assert_eq!(saved.access_token, "refreshed");
    }

    #[tokio::test]
    async fn failed_refresh_deletes_the_cache() {
        let (_dir, config) = setup(true);
        let flow = FakeFlow {
            fail_refresh: true,
            ..FakeFlow::default()
        };
        let store = CredentialStore::with_flow(&config, flow);
        store
            .cache()
            .save(&token("stale", -60, Some("1//revoked")))
            .unwrap();

        let err = store.credentials().await.unwrap_err();
        assert!(matches!(err, ImportError::TokenRefresh(_)));
        assert!(!store.cache().path().exists());
    }

    #[tokio::test]
    async fn expired_token_without_refresh_reconsents() {
        let (_dir, config) = setup(true);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());
        store.cache().save(&token("stale", -60, None)).unwrap();

        let creds = store.credentials().await.unwrap();
        assert_eq!(creds.token.access_token, "consented");
        assert_eq!(store.flow.calls(), vec!["consent"]);
    }

    #[tokio::test]
    async fn logout_removes_token() {
        let (_dir, config) = setup(true);
        let store = CredentialStore::with_flow(&config, FakeFlow::default());
        store.cache().save(&token("cached", 3600, None)).unwrap();

        assert!(store.logout().unwrap());
        assert!(!store.logout().unwrap());
    }

    #[tokio::test]
    async fn static_credentials_are_replayed() {
        let creds = Credentials {
            secret: ClientSecret {
                client_id: "id".into(),
                client_secret: "s".into(),
            },
            token: token("static", 3600, None),
        };
        let provider = StaticCredentials(creds);
        assert_eq!(
            provider.credentials().await.unwrap().token.access_token,
            "static"
        );
    }
}
