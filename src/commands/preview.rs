use std::path::Path;

use anyhow::Result;
use cours_sync_core::{ImportConfig, preview};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui::pluralize;

pub async fn run(config: &ImportConfig, file: &Path) -> Result<()> {
    let preview = preview(config, file).await?;

    println!("📅 {}", config.calendar_name.bold());
    for event in &preview.events {
        println!("   {}", event.render());
    }

    if !preview.skipped.is_empty() {
        println!();
        for skipped in &preview.skipped {
            println!("   {}", skipped.render());
        }
    }

    println!(
        "\n{} to import, {} skipped",
        pluralize("event", preview.events.len()),
        preview.skipped.len()
    );

    Ok(())
}
