//! Calendar API seam and its Google implementation.

use async_trait::async_trait;
use google_calendar::Client;
use google_calendar::types::{Calendar as GoogleCalendar, Event as GoogleEvent, MinAccessRole};
use log::debug;
use reqwest::header::CONTENT_TYPE;

use crate::auth::Credentials;
use crate::batch::{
    BATCH_URL, PartStatus, boundary_from_content_type, decode_batch_response, encode_insert_batch,
};
use crate::error::{ImportError, ImportResult};

/// A calendar visible to the account.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSummary {
    pub id: String,
    pub name: String,
}

/// The calendar operations an import needs.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_calendars(&self) -> ImportResult<Vec<CalendarSummary>>;

    async fn delete_calendar(&self, calendar_id: &str) -> ImportResult<()>;

    /// Returns the id of the new calendar.
    async fn create_calendar(&self, name: &str, time_zone: &str) -> ImportResult<String>;

    async fn set_calendar_color(&self, calendar_id: &str, color_id: &str) -> ImportResult<()>;

    /// Insert all events in one batched call. Returns one status per event.
    async fn insert_events(
        &self,
        calendar_id: &str,
        events: &[GoogleEvent],
    ) -> ImportResult<Vec<PartStatus>>;
}

pub struct GoogleCalendarApi {
    client: Client,
    http: reqwest::Client,
    access_token: String,
}

impl GoogleCalendarApi {
    pub fn new(credentials: &Credentials) -> Self {
        let client = Client::new(
            credentials.secret.client_id.clone(),
            credentials.secret.client_secret.clone(),
            String::new(),
            credentials.token.access_token.clone(),
            credentials.token.refresh_token.clone().unwrap_or_default(),
        );

        Self {
            client,
            http: reqwest::Client::new(),
            access_token: credentials.token.access_token.clone(),
        }
    }
}

/// Body of a `calendars.insert` call.
fn new_calendar(name: &str, time_zone: &str) -> GoogleCalendar {
    GoogleCalendar {
        conference_properties: None,
        description: String::new(),
        etag: String::new(),
        id: String::new(),
        kind: String::new(),
        location: String::new(),
        summary: name.to_string(),
        time_zone: time_zone.to_string(),
    }
}

fn provisioning<E: std::fmt::Display>(action: &str) -> impl Fn(E) -> ImportError + '_ {
    move |e| ImportError::Provisioning(format!("Failed to {action}: {e}"))
}

#[async_trait]
impl CalendarApi for GoogleCalendarApi {
    async fn list_calendars(&self) -> ImportResult<Vec<CalendarSummary>> {
        let response = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .map_err(provisioning("list calendars"))?;

        Ok(response
            .body
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| CalendarSummary {
                id: c.id,
                name: c.summary,
            })
            .collect())
    }

    async fn delete_calendar(&self, calendar_id: &str) -> ImportResult<()> {
        self.client
            .calendars()
            .delete(calendar_id)
            .await
            .map_err(provisioning("delete calendar"))?;
        Ok(())
    }

    async fn create_calendar(&self, name: &str, time_zone: &str) -> ImportResult<String> {
        let calendar = new_calendar(name, time_zone);

        let response = self
            .client
            .calendars()
            .insert(&calendar)
            .await
            .map_err(provisioning("create calendar"))?;

        Ok(response.body.id)
    }

    async fn set_calendar_color(&self, calendar_id: &str, color_id: &str) -> ImportResult<()> {
        let mut entry = self
            .client
            .calendar_list()
            .list_get(calendar_id)
            .await
            .map_err(provisioning("fetch calendar list entry"))?
            .body;

        entry.color_id = color_id.to_string();

        self.client
            .calendar_list()
            .list_update(calendar_id, false, &entry)
            .await
            .map_err(provisioning("set calendar color"))?;
        Ok(())
    }

    async fn insert_events(
        &self,
        calendar_id: &str,
        events: &[GoogleEvent],
    ) -> ImportResult<Vec<PartStatus>> {
        let boundary = format!("batch_{}", uuid::Uuid::new_v4().simple());
        let body = encode_insert_batch(&boundary, calendar_id, events)?;

        debug!("Submitting batch of {} events", events.len());

        let response = self
            .http
            .post(BATCH_URL)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, format!("multipart/mixed; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .map_err(|e| ImportError::BatchSubmission(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_default();
        let text = response
            .text()
            .await
            .map_err(|e| ImportError::BatchSubmission(e.to_string()))?;

        if !status.is_success() {
            return Err(ImportError::BatchSubmission(format!("HTTP {status}: {text}")));
        }

        let response_boundary = boundary_from_content_type(&content_type).ok_or_else(|| {
            ImportError::BatchSubmission(format!("unexpected content type '{content_type}'"))
        })?;

        decode_batch_response(&response_boundary, &text)
    }
}
