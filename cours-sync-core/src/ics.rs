//! Reading VEVENTs out of an ICS file using the icalendar crate's parser.

use std::path::Path;

use icalendar::parser::{Component, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::error::{ImportError, ImportResult};
use crate::event::{EventTime, SourceEvent};

/// A VEVENT that could not be turned into a [`SourceEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    /// Position of the VEVENT in the file, starting at 0.
    pub index: usize,
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub reason: String,
}

impl SkippedEvent {
    /// Short human-readable label for reports.
    pub fn label(&self) -> String {
        match (&self.summary, &self.uid) {
            (Some(summary), _) => summary.clone(),
            (None, Some(uid)) => uid.clone(),
            (None, None) => format!("event #{}", self.index + 1),
        }
    }
}

pub type ParsedEvent = Result<SourceEvent, SkippedEvent>;

pub async fn read_file(path: &Path) -> ImportResult<Vec<ParsedEvent>> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| ImportError::ReadIcs {
            path: path.to_path_buf(),
            source,
        })?;

    parse_events(&String::from_utf8_lossy(&content))
}

/// Parse every VEVENT in the calendar, in file order.
///
/// Fails only when the file is not a calendar at all; individual broken
/// events come back as `Err(SkippedEvent)`.
pub fn parse_events(content: &str) -> ImportResult<Vec<ParsedEvent>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(ImportError::IcsParse("no VCALENDAR component found".into()));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(ImportError::IcsParse)?;

    let mut vevents = Vec::new();
    for component in &calendar.components {
        collect_vevents(component, &mut vevents);
    }

    Ok(vevents
        .into_iter()
        .enumerate()
        .map(|(index, vevent)| parse_vevent(index, vevent))
        .collect())
}

fn collect_vevents<'a>(component: &'a Component<'a>, out: &mut Vec<&'a Component<'a>>) {
    if component.name == "VEVENT" {
        out.push(component);
    }
    for child in &component.components {
        collect_vevents(child, out);
    }
}

fn parse_vevent(index: usize, vevent: &Component<'_>) -> ParsedEvent {
    let text = |name: &str| vevent.find_prop(name).map(|p| unescape_text(p.val.as_ref()));

    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let summary = text("SUMMARY");

    let skip = |reason: String| SkippedEvent {
        index,
        uid: uid.clone(),
        summary: summary.clone(),
        reason,
    };

    let start = event_time(vevent, "DTSTART").map_err(skip)?;
    let end = event_time(vevent, "DTEND").map_err(skip)?;

    Ok(SourceEvent {
        uid: uid.clone(),
        summary: summary.clone().unwrap_or_else(|| "(No title)".to_string()),
        location: text("LOCATION"),
        description: text("DESCRIPTION"),
        start,
        end,
    })
}

fn event_time(vevent: &Component<'_>, name: &str) -> Result<EventTime, String> {
    let prop = vevent
        .find_prop(name)
        .ok_or_else(|| format!("missing {name}"))?;

    let dpt = DatePerhapsTime::try_from(prop)
        .map_err(|_| format!("invalid {name} value '{}'", prop.val.as_ref()))?;

    Ok(match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::DateTimeUtc(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            EventTime::DateTimeFloating(naive)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            }
        }
    })
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
