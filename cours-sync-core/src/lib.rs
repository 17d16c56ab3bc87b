//! Import a course schedule (.ics) into a dedicated Google Calendar.
//!
//! - `ics` and `event` read VEVENTs out of the schedule file
//! - `normalize` and `to_google` clean titles and assign colors
//! - `auth` obtains Google credentials (client secret, token cache, OAuth)
//! - `provision` recreates the target calendar
//! - `batch` and `api` talk to the Calendar API
//! - `import` ties everything together

pub mod api;
pub mod auth;
pub mod batch;
pub mod colors;
pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod import;
pub mod normalize;
pub mod provision;
pub mod to_google;

#[cfg(test)]
mod testing;

pub use api::{CalendarApi, CalendarSummary, GoogleCalendarApi};
pub use auth::{CredentialProvider, CredentialStore, Credentials};
pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use ics::SkippedEvent;
pub use import::{ImportReport, Importer, Preview, RejectedEvent, import_events, preview};
pub use to_google::TargetEvent;
