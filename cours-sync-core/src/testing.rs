//! In-memory [`CalendarApi`] used by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use google_calendar::types::Event as GoogleEvent;

use crate::api::{CalendarApi, CalendarSummary};
use crate::batch::PartStatus;
use crate::error::{ImportError, ImportResult};

#[derive(Default)]
pub struct FakeCalendarApi {
    pub fail_create: bool,
    pub fail_batch: bool,
    /// Events whose summary contains this are rejected inside the batch.
    pub reject_marker: Option<String>,
    pub(crate) calendars: Mutex<Vec<CalendarSummary>>,
    pub(crate) time_zones: Mutex<HashMap<String, String>>,
    pub(crate) colors: Mutex<HashMap<String, String>>,
    pub(crate) batches: Mutex<Vec<Vec<GoogleEvent>>>,
    pub(crate) next_id: Mutex<usize>,
}

impl FakeCalendarApi {
    pub fn with_calendars(calendars: Vec<CalendarSummary>) -> Self {
        let api = Self::default();
        *api.calendars.lock().unwrap() = calendars;
        api
    }

    pub fn calendars(&self) -> Vec<CalendarSummary> {
        self.calendars.lock().unwrap().clone()
    }

    pub fn color_of(&self, id: &str) -> Option<String> {
        self.colors.lock().unwrap().get(id).cloned()
    }

    pub fn time_zone_of(&self, id: &str) -> Option<String> {
        self.time_zones.lock().unwrap().get(id).cloned()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn inserted(&self) -> Vec<GoogleEvent> {
        self.batches.lock().unwrap().concat()
    }
}

#[async_trait]
impl CalendarApi for FakeCalendarApi {
    async fn list_calendars(&self) -> ImportResult<Vec<CalendarSummary>> {
        Ok(self.calendars())
    }

    async fn delete_calendar(&self, calendar_id: &str) -> ImportResult<()> {
        let mut calendars = self.calendars.lock().unwrap();
        let before = calendars.len();
        calendars.retain(|c| c.id != calendar_id);
        if calendars.len() == before {
            return Err(ImportError::Provisioning(format!("404 {calendar_id}")));
        }
        Ok(())
    }

    async fn create_calendar(&self, name: &str, time_zone: &str) -> ImportResult<String> {
        if self.fail_create {
            return Err(ImportError::Provisioning("403 quota exceeded".into()));
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("cal-{}@group.calendar.google.com", *next_id);

        self.calendars.lock().unwrap().push(CalendarSummary {
            id: id.clone(),
            name: name.to_string(),
        });
        self.time_zones
            .lock()
            .unwrap()
            .insert(id.clone(), time_zone.to_string());
        Ok(id)
    }

    async fn set_calendar_color(&self, calendar_id: &str, color_id: &str) -> ImportResult<()> {
        self.colors
            .lock()
            .unwrap()
            .insert(calendar_id.to_string(), color_id.to_string());
        Ok(())
    }

    async fn insert_events(
        &self,
        _calendar_id: &str,
        events: &[GoogleEvent],
    ) -> ImportResult<Vec<PartStatus>> {
        if self.fail_batch {
            return Err(ImportError::BatchSubmission("HTTP 403: rateLimitExceeded".into()));
        }

        self.batches.lock().unwrap().push(events.to_vec());

        Ok(events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let rejected = self
                    .reject_marker
                    .as_deref()
                    .is_some_and(|m| event.summary.contains(m));
                PartStatus {
                    index,
                    status: if rejected { 400 } else { 200 },
                    message: rejected.then(|| "Bad Request".to_string()),
                }
            })
            .collect())
    }
}
