//! Mapping source events to Google Calendar event bodies.

use chrono_tz::Tz;
use google_calendar::types::{Event as GoogleEvent, EventDateTime};

use crate::colors::EventColor;
use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::event::{EventTime, SourceEvent};
use crate::normalize::{EventKind, Normalizer, decode_entities, decode_optional};

/// A normalized event, ready to be inserted.
#[derive(Debug, Clone)]
pub struct TargetEvent {
    pub kind: EventKind,
    pub color: EventColor,
    pub body: GoogleEvent,
}

impl TargetEvent {
    pub fn summary(&self) -> &str {
        &self.body.summary
    }

    /// Start as shown to the user: the date for all-day events, otherwise
    /// the local time in the event's zone.
    pub fn start_label(&self) -> String {
        let Some(start) = &self.body.start else {
            return String::new();
        };

        match (&start.date_time, &start.date) {
            (Some(dt), _) => match start.time_zone.parse::<Tz>() {
                Ok(tz) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
                Err(_) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
            (None, Some(date)) => date.format("%Y-%m-%d").to_string(),
            (None, None) => String::new(),
        }
    }
}

pub struct EventMapper {
    normalizer: Normalizer,
    tz: Tz,
}

impl EventMapper {
    pub fn new(config: &ImportConfig) -> ImportResult<Self> {
        Ok(Self {
            normalizer: Normalizer::new(config),
            tz: config.tz()?,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Build the Google body for one event. Errors are per-event reasons.
    pub fn to_google(&self, event: &SourceEvent) -> Result<TargetEvent, String> {
        let summary = self.normalizer.clean_title(&event.summary);
        let summary = decode_entities(&summary).into_owned();

        let kind = self.normalizer.classify(&summary);
        let color = self.normalizer.color_for(kind);

        let start = self.event_time_to_google(&event.start)?;
        let end = self.event_time_to_google(&event.end)?;

        let body = GoogleEvent {
            summary,
            location: decode_optional(event.location.as_deref()).unwrap_or_default(),
            description: decode_optional(event.description.as_deref()).unwrap_or_default(),
            start: Some(start),
            end: Some(end),
            color_id: color.id().to_string(),
            ..Default::default()
        };

        Ok(TargetEvent { kind, color, body })
    }

    fn event_time_to_google(&self, time: &EventTime) -> Result<EventDateTime, String> {
        let date_time = time.to_utc(self.tz)?;

        Ok(EventDateTime {
            date: time.date(),
            date_time,
            time_zone: self.tz.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn source(summary: &str, start: EventTime, end: EventTime) -> SourceEvent {
        SourceEvent {
            uid: Some("uid-1".to_string()),
            summary: summary.to_string(),
            location: Some("Amphi &Eacute;cole".to_string()),
            description: None,
            start,
            end,
        }
    }

    fn floating(h: u32) -> EventTime {
        EventTime::DateTimeFloating(
            NaiveDate::from_ymd_opt(2025, 2, 3)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn builds_cleaned_and_colored_body() {
        let mapper = EventMapper::new(&ImportConfig::default()).unwrap();
        let target = mapper
            .to_google(&source("CM CM R&#233;seaux", floating(8), floating(10)))
            .unwrap();

        assert_eq!(target.summary(), "CM Réseaux");
        assert_eq!(target.kind, EventKind::Lecture);
        assert_eq!(target.body.color_id, "11");
        assert_eq!(target.body.location, "Amphi École");
        assert_eq!(target.body.description, "");
    }

    #[test]
    fn times_carry_the_configured_zone() {
        let mapper = EventMapper::new(&ImportConfig::default()).unwrap();
        let target = mapper
            .to_google(&source("TD Algo", floating(8), floating(10)))
            .unwrap();

        let start = target.body.start.unwrap();
        assert_eq!(start.time_zone, "Europe/Paris");
        assert_eq!(
            start.date_time,
            Some(Utc.with_ymd_and_hms(2025, 2, 3, 7, 0, 0).unwrap())
        );
        assert_eq!(start.date, None);
    }

    #[test]
    fn all_day_events_use_dates() {
        let mapper = EventMapper::new(&ImportConfig::default()).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let target = mapper
            .to_google(&source("Férié", EventTime::Date(day), EventTime::Date(next)))
            .unwrap();

        assert_eq!(target.start_label(), "2025-05-01");
        let start = target.body.start.unwrap();
        assert_eq!(start.date, Some(day));
        assert_eq!(start.date_time, None);
    }

    #[test]
    fn start_label_uses_local_time() {
        let mapper = EventMapper::new(&ImportConfig::default()).unwrap();
        let target = mapper
            .to_google(&source("CM Algo", floating(8), floating(10)))
            .unwrap();
        assert_eq!(target.start_label(), "2025-02-03 08:00");
    }

    #[test]
    fn unknown_tzid_is_a_per_event_error() {
        let mapper = EventMapper::new(&ImportConfig::default()).unwrap();
        let zoned = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 2, 3)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            tzid: "Not/AZone".to_string(),
        };
        let err = mapper
            .to_google(&source("TP Python", zoned, floating(10)))
            .unwrap_err();
        assert!(err.contains("Not/AZone"));
    }
}
