//! Interactive installed-app OAuth flow against Google.
//!
//! Prints the consent URL (and tries to open it), then waits on a loopback
//! listener for Google to redirect back with the authorization code.

use async_trait::async_trait;
use google_calendar::Client;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

use super::OAuthFlow;
use super::client_secret::ClientSecret;
use super::token::StoredToken;
use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/html; charset=utf-8\r\n\
    Connection: close\r\n\
    \r\n\
    <html><body>\
    <h1>Authentication successful!</h1>\
    <p>You can close this window and return to the terminal.</p>\
    </body></html>";

const DENIED_PAGE: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/html; charset=utf-8\r\n\
    Connection: close\r\n\
    \r\n\
    <html><body>\
    <h1>Authentication failed</h1>\
    <p>Return to the terminal for details.</p>\
    </body></html>";

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n";

#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    redirect_uri: String,
    redirect_address: String,
}

impl GoogleOAuth {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            redirect_uri: config.redirect_uri(),
            redirect_address: config.redirect_address(),
        }
    }

    fn client(&self, secret: &ClientSecret, access: String, refresh: String) -> Client {
        Client::new(
            secret.client_id.clone(),
            secret.client_secret.clone(),
            self.redirect_uri.clone(),
            access,
            refresh,
        )
    }
}

#[async_trait]
impl OAuthFlow for GoogleOAuth {
    async fn consent(&self, secret: &ClientSecret) -> ImportResult<StoredToken> {
        let mut client = self.client(secret, String::new(), String::new());

        let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
        let auth_url = consent_url(&client.user_consent_url(&scopes))?;

        // Bind before showing the URL so a fast browser can't beat us.
        let listener = TcpListener::bind(&self.redirect_address).await.map_err(|e| {
            ImportError::Auth(format!(
                "Failed to bind OAuth callback listener on {}: {e}",
                self.redirect_address
            ))
        })?;

        eprintln!("\nOpen this URL in your browser to authenticate:\n");
        eprintln!("{}\n", auth_url);

        if open::that(&auth_url).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let (code, state) = wait_for_callback(&listener).await?;

        info!("Received authorization code, exchanging for tokens");

        let access_token = client
            .get_access_token(&code, &state)
            .await
            .map_err(|e| ImportError::Auth(format!("Failed to exchange code for tokens: {e}")))?;

        Ok(StoredToken::from_access_token(&access_token, None))
    }

    async fn refresh(&self, secret: &ClientSecret, token: &StoredToken) -> ImportResult<StoredToken> {
        let refresh_token = token.refresh_token.clone().unwrap_or_default();
        let client = self.client(secret, token.access_token.clone(), refresh_token);

        let access_token = client
            .refresh_access_token()
            .await
            .map_err(|e| ImportError::TokenRefresh(e.to_string()))?;

        Ok(StoredToken::from_access_token(
            &access_token,
            token.refresh_token.as_deref(),
        ))
    }
}

/// Force the offline-access + explicit-consent parameters so Google always
/// hands back a refresh token.
fn consent_url(base: &str) -> ImportResult<String> {
    let mut url = Url::parse(base).map_err(|e| ImportError::Auth(e.to_string()))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_type" && k != "prompt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");

    Ok(url.into())
}

enum Callback {
    Code { code: String, state: String },
    Denied(String),
    Ignored,
}

/// Parse the request target of the redirect (`/?code=...&state=...`).
fn parse_callback(target: &str) -> ImportResult<Callback> {
    let url = Url::parse(&format!("http://localhost{}", target))
        .map_err(|e| ImportError::Auth(format!("Invalid OAuth callback: {e}")))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Ok(Callback::Denied(error));
    }

    match param("code") {
        Some(code) => Ok(Callback::Code {
            code,
            state: param("state").unwrap_or_default(),
        }),
        None => Ok(Callback::Ignored),
    }
}

async fn wait_for_callback(listener: &TcpListener) -> ImportResult<(String, String)> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| ImportError::Auth(format!("Failed to accept OAuth callback: {e}")))?;

        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        if let Err(e) = reader.read_line(&mut request_line).await {
            debug!("Dropped connection from {peer}: {e}");
            continue;
        }

        // Browsers open speculative connections and ask for /favicon.ico.
        let Some(target) = request_line.split_whitespace().nth(1) else {
            debug!("Empty request from {peer}, waiting for the redirect");
            continue;
        };

        let callback = match parse_callback(target) {
            Ok(callback) => callback,
            Err(e) => {
                warn!("Ignoring request from {peer}: {e}");
                Callback::Ignored
            }
        };
        let mut stream = reader.into_inner();

        match callback {
            Callback::Code { code, state } => {
                stream.write_all(SUCCESS_PAGE.as_bytes()).await?;
                stream.flush().await?;
                return Ok((code, state));
            }
            Callback::Denied(error) => {
                stream.write_all(DENIED_PAGE.as_bytes()).await?;
                stream.flush().await?;
                return Err(ImportError::Auth(format!("Consent refused: {error}")));
            }
            Callback::Ignored => {
                if let Err(e) = stream.write_all(NOT_FOUND.as_bytes()).await {
                    debug!("Could not answer {peer}: {e}");
                }
            }
        }
    }
}
