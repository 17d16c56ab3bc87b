use anyhow::Result;
use cours_sync_core::{CredentialStore, ImportConfig};

pub fn run(config: &ImportConfig) -> Result<()> {
    let store = CredentialStore::new(config);

    if store.logout()? {
        println!("Removed {}", store.cache().path().display());
    } else {
        println!("Not logged in.");
    }

    Ok(())
}
