//! Events as read from the source ICS file.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Start or end of an event, keeping the form it had in the ICS file.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    /// No zone given; interpreted in the configured time zone.
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Resolve to an absolute instant. All-day dates resolve to `None`.
    pub fn to_utc(&self, default_tz: Tz) -> Result<Option<DateTime<Utc>>, String> {
        match self {
            EventTime::Date(_) => Ok(None),
            EventTime::DateTimeUtc(dt) => Ok(Some(*dt)),
            EventTime::DateTimeFloating(naive) => local_to_utc(default_tz, naive).map(Some),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let tz: Tz = tzid
                    .parse()
                    .map_err(|_| format!("unknown TZID '{tzid}'"))?;
                local_to_utc(tz, datetime).map(Some)
            }
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            EventTime::Date(d) => Some(*d),
            _ => None,
        }
    }
}

fn local_to_utc(tz: Tz, naive: &NaiveDateTime) -> Result<DateTime<Utc>, String> {
    // Ambiguous times (DST fall-back) take the earlier instant.
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("{naive} does not exist in {}", tz.name()))
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} {}", datetime.format("%Y-%m-%d %H:%M"), tzid)
            }
        }
    }
}

/// One VEVENT from the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub uid: Option<String>,
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}
