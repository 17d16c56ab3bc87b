//! The import itself: read, normalize, provision, submit in batches.

use std::path::Path;

use log::{debug, info, warn};

use crate::api::{CalendarApi, GoogleCalendarApi};
use crate::auth::CredentialProvider;
use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::ics::{self, ParsedEvent, SkippedEvent};
use crate::provision::find_or_create_calendar;
use crate::to_google::{EventMapper, TargetEvent};

/// An event Google refused inside an otherwise successful batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    pub summary: String,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub calendar_id: String,
    pub calendar_name: String,
    pub imported: usize,
    /// Size of each submitted batch, in order.
    pub batches: Vec<usize>,
    pub skipped: Vec<SkippedEvent>,
    pub rejected: Vec<RejectedEvent>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.rejected.is_empty()
    }
}

/// What an import would send, computed without network access.
#[derive(Debug, Clone, Default)]
pub struct Preview {
    pub events: Vec<TargetEvent>,
    pub skipped: Vec<SkippedEvent>,
}

type ProgressFn = Box<dyn Fn(usize) + Send + Sync>;

pub struct Importer<'a, A: CalendarApi + ?Sized> {
    config: &'a ImportConfig,
    api: &'a A,
    mapper: EventMapper,
    on_progress: Option<ProgressFn>,
}

impl<'a, A: CalendarApi + ?Sized> Importer<'a, A> {
    pub fn new(config: &'a ImportConfig, api: &'a A) -> ImportResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            api,
            mapper: EventMapper::new(config)?,
            on_progress: None,
        })
    }

    /// Called with the running total after every submitted batch.
    pub fn with_progress(mut self, on_progress: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Replace the configured calendar with the events from `path`.
    ///
    /// `calendar_id` is accepted for callers that already know a calendar,
    /// but the calendar is always re-provisioned.
    pub async fn run(&self, path: &Path, calendar_id: Option<&str>) -> ImportResult<ImportReport> {
        if let Some(id) = calendar_id {
            warn!("Ignoring calendar id {id}: the calendar is always recreated");
        }

        // Read before provisioning: a bad file must not cost the existing calendar.
        let parsed = ics::read_file(path).await?;
        debug!("Read {} VEVENTs from {}", parsed.len(), path.display());

        let calendar_id = find_or_create_calendar(self.api, self.config).await?;
        self.import_into(&calendar_id, parsed).await
    }

    /// Normalize and submit already-parsed events into `calendar_id`.
    pub async fn import_into(
        &self,
        calendar_id: &str,
        parsed: Vec<ParsedEvent>,
    ) -> ImportResult<ImportReport> {
        info!(
            "Importing events into '{}' ({})",
            self.config.calendar_name, calendar_id
        );

        let mut report = ImportReport {
            calendar_id: calendar_id.to_string(),
            calendar_name: self.config.calendar_name.clone(),
            ..ImportReport::default()
        };

        let mut batch: Vec<TargetEvent> = Vec::with_capacity(self.config.batch_size);

        for (index, parsed_event) in parsed.into_iter().enumerate() {
            match map_event(&self.mapper, index, parsed_event) {
                Ok(target) => batch.push(target),
                Err(skipped) => {
                    warn!("Skipping {}: {}", skipped.label(), skipped.reason);
                    report.skipped.push(skipped);
                    continue;
                }
            }

            if batch.len() >= self.config.batch_size {
                self.submit(calendar_id, &mut batch, &mut report).await?;
            }
        }

        if !batch.is_empty() {
            self.submit(calendar_id, &mut batch, &mut report).await?;
        }

        info!(
            "Imported {} events in {} batches ({} skipped, {} rejected)",
            report.imported,
            report.batches.len(),
            report.skipped.len(),
            report.rejected.len()
        );

        Ok(report)
    }

    async fn submit(
        &self,
        calendar_id: &str,
        batch: &mut Vec<TargetEvent>,
        report: &mut ImportReport,
    ) -> ImportResult<()> {
        let bodies: Vec<_> = batch.iter().map(|t| t.body.clone()).collect();
        let statuses = self.api.insert_events(calendar_id, &bodies).await?;

        for status in statuses {
            if status.is_success() {
                report.imported += 1;
                continue;
            }

            let summary = batch
                .get(status.index)
                .map(|t| t.summary().to_string())
                .unwrap_or_default();
            let message = status.message.unwrap_or_default();
            warn!("Google rejected '{}': {} {}", summary, status.status, message);

            report.rejected.push(RejectedEvent {
                summary,
                status: status.status,
                message,
            });
        }

        report.batches.push(batch.len());
        batch.clear();

        if let Some(on_progress) = &self.on_progress {
            on_progress(report.imported);
        }

        Ok(())
    }
}

fn map_event(mapper: &EventMapper, index: usize, parsed: ParsedEvent) -> Result<TargetEvent, SkippedEvent> {
    let source = parsed?;
    mapper.to_google(&source).map_err(|reason| SkippedEvent {
        index,
        uid: source.uid.clone(),
        summary: Some(source.summary.clone()),
        reason,
    })
}

/// Authenticate, then run a full import against Google Calendar.
pub async fn import_events<P: CredentialProvider + ?Sized>(
    config: &ImportConfig,
    credentials: &P,
    path: &Path,
    calendar_id: Option<&str>,
) -> ImportResult<ImportReport> {
    import_events_with_progress(config, credentials, path, calendar_id, |_| {}).await
}

pub async fn import_events_with_progress<P: CredentialProvider + ?Sized>(
    config: &ImportConfig,
    credentials: &P,
    path: &Path,
    calendar_id: Option<&str>,
    on_progress: impl Fn(usize) + Send + Sync + 'static,
) -> ImportResult<ImportReport> {
    let credentials = credentials.credentials().await?;
    let api = GoogleCalendarApi::new(&credentials);

    Importer::new(config, &api)?
        .with_progress(on_progress)
        .run(path, calendar_id)
        .await
}

/// Parse and normalize `path` without contacting Google.
pub async fn preview(config: &ImportConfig, path: &Path) -> ImportResult<Preview> {
    let mapper = EventMapper::new(config)?;
    let mut preview = Preview::default();

    for (index, parsed) in ics::read_file(path).await?.into_iter().enumerate() {
        match map_event(&mapper, index, parsed) {
            Ok(target) => preview.events.push(target),
            Err(skipped) => preview.skipped.push(skipped),
        }
    }

    Ok(preview)
}
