use anyhow::Result;
use cours_sync_core::{CredentialProvider, CredentialStore, ImportConfig};
use owo_colors::OwoColorize;

use super::print_hint;

pub async fn run(config: &ImportConfig) -> Result<()> {
    let store = CredentialStore::new(config);

    println!("Authenticating with Google...");

    match store.credentials().await {
        Ok(credentials) => {
            println!("{} Authenticated", "✓".green());
            if let Some(expires_at) = credentials.token.expires_at {
                println!("   Access token valid until {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
            println!("   Token cached in {}", store.cache().path().display());
            println!("\nRun `cours-sync import <FILE>` to import your schedule.");
            Ok(())
        }
        Err(e) => {
            print_hint(&e);
            Err(e.into())
        }
    }
}
