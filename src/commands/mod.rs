pub mod auth;
pub mod import;
pub mod logout;
pub mod preview;

use cours_sync_core::ImportError;
use owo_colors::OwoColorize;

const CONSOLE_URL: &str = "https://console.cloud.google.com/apis/credentials";

/// What the user can do about a failure, when we know.
pub fn hint_for(error: &ImportError) -> Option<String> {
    if error.is_auth() {
        return Some(format!(
            "Check that your Google account is listed as a test user of the OAuth app:\n  {CONSOLE_URL}"
        ));
    }

    let message = error.to_string().to_lowercase();
    let throttled = ["403", "429", "access denied", "accessdenied", "quota", "ratelimit"]
        .iter()
        .any(|needle| message.contains(needle));

    match error {
        ImportError::Provisioning(_) | ImportError::BatchSubmission(_) if throttled => Some(
            "Google is refusing requests, probably a usage limit. Wait a few minutes and retry."
                .to_string(),
        ),
        _ => None,
    }
}

pub fn print_hint(error: &ImportError) {
    if let Some(hint) = hint_for(error) {
        eprintln!("\n{} {}", "hint:".cyan().bold(), hint);
    }
}
