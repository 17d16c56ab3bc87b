use std::path::Path;

use anyhow::Result;
use cours_sync_core::auth::StaticCredentials;
use cours_sync_core::{CredentialProvider, CredentialStore, ImportConfig, ImportError, import};

use super::print_hint;
use crate::render::Render;
use crate::utils::tui::{create_spinner, pluralize};

pub async fn run(config: &ImportConfig, file: &Path) -> Result<()> {
    match import_file(config, file).await {
        Ok(()) => Ok(()),
        Err(e) => {
            print_hint(&e);
            Err(e.into())
        }
    }
}

async fn import_file(config: &ImportConfig, file: &Path) -> Result<(), ImportError> {
    println!(
        "Importing {} into '{}'",
        file.display(),
        config.calendar_name
    );

    // Authenticate before starting the spinner: consent prints a URL.
    let credentials = CredentialStore::new(config).credentials().await?;

    let spinner = create_spinner("Recreating calendar");
    let progress = spinner.clone();
    let result = import::import_events_with_progress(
        config,
        &StaticCredentials(credentials),
        file,
        None,
        move |n| progress.set_message(format!("Imported {n} events")),
    )
    .await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.render());

    if !report.is_complete() {
        println!(
            "\n{} from the schedule are missing from Google Calendar.",
            pluralize("event", report.skipped.len() + report.rejected.len())
        );
    }

    Ok(())
}
