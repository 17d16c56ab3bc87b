//! Google Calendar color palettes.
//!
//! Events and calendars use two different palettes with their own ids, see
//! `GET https://www.googleapis.com/calendar/v3/colors`.

use serde::{Deserialize, Serialize};

/// Colors available for individual events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Lavender,
    Sage,
    Grape,
    Flamingo,
    Banana,
    Tangerine,
    Peacock,
    Graphite,
    Blueberry,
    Basil,
    Tomato,
}

impl EventColor {
    pub fn id(self) -> &'static str {
        match self {
            EventColor::Lavender => "1",
            EventColor::Sage => "2",
            EventColor::Grape => "3",
            EventColor::Flamingo => "4",
            EventColor::Banana => "5",
            EventColor::Tangerine => "6",
            EventColor::Peacock => "7",
            EventColor::Graphite => "8",
            EventColor::Blueberry => "9",
            EventColor::Basil => "10",
            EventColor::Tomato => "11",
        }
    }
}

/// Colors available for a calendar's list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarColor {
    Cocoa,
    Flamingo,
    Tomato,
    Tangerine,
    Pumpkin,
    Mango,
    Eucalyptus,
    Basil,
    Pistachio,
    Avocado,
    Citron,
    Banana,
    Sage,
    Peacock,
    Cobalt,
    Blueberry,
    Lavender,
    Wisteria,
    Graphite,
    Birch,
    Radicchio,
    #[serde(rename = "cherry_blossom")]
    CherryBlossom,
    Grape,
    Amethyst,
}

impl CalendarColor {
    pub fn id(self) -> &'static str {
        match self {
            CalendarColor::Cocoa => "1",
            CalendarColor::Flamingo => "2",
            CalendarColor::Tomato => "3",
            CalendarColor::Tangerine => "4",
            CalendarColor::Pumpkin => "5",
            CalendarColor::Mango => "6",
            CalendarColor::Eucalyptus => "7",
            CalendarColor::Basil => "8",
            CalendarColor::Pistachio => "9",
            CalendarColor::Avocado => "10",
            CalendarColor::Citron => "11",
            CalendarColor::Banana => "12",
            CalendarColor::Sage => "13",
            CalendarColor::Peacock => "14",
            CalendarColor::Cobalt => "15",
            CalendarColor::Blueberry => "16",
            CalendarColor::Lavender => "17",
            CalendarColor::Wisteria => "18",
            CalendarColor::Graphite => "19",
            CalendarColor::Birch => "20",
            CalendarColor::Radicchio => "21",
            CalendarColor::CherryBlossom => "22",
            CalendarColor::Grape => "23",
            CalendarColor::Amethyst => "24",
        }
    }
}
