//! Cosmetic cleanup applied to every imported event.

use std::borrow::Cow;

use crate::colors::EventColor;
use crate::config::{EventPalette, ImportConfig};

/// Course category derived from an event title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Exam,
    Lecture,
    Tutorial,
    Lab,
    Other,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Exam => "Exam",
            EventKind::Lecture => "CM",
            EventKind::Tutorial => "TD",
            EventKind::Lab => "TP",
            EventKind::Other => "Other",
        }
    }
}

/// Title cleanup and color classification, parameterized by the config.
#[derive(Debug, Clone)]
pub struct Normalizer {
    prefixes: Vec<String>,
    exam_keywords: Vec<String>,
    palette: EventPalette,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            prefixes: config.title_prefixes.clone(),
            exam_keywords: config
                .exam_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            palette: config.event_colors.clone(),
        }
    }

    /// Drop the first occurrence of any prefix that appears more than once,
    /// e.g. `"CM CM Algorithmique"` becomes `"CM Algorithmique"`.
    pub fn clean_title(&self, summary: &str) -> String {
        let mut title = summary.to_string();

        for prefix in &self.prefixes {
            if prefix.is_empty() || title.matches(prefix.as_str()).count() <= 1 {
                continue;
            }
            if let Some(pos) = title.find(prefix.as_str()) {
                title.replace_range(pos..pos + prefix.len(), "");
            }
        }

        title
    }

    /// Exam keywords win over CM, which wins over TD, then TP.
    pub fn classify(&self, summary: &str) -> EventKind {
        let lower = summary.to_lowercase();
        let upper = summary.to_uppercase();

        if self.exam_keywords.iter().any(|k| lower.contains(k.as_str())) {
            EventKind::Exam
        } else if upper.contains("CM") {
            EventKind::Lecture
        } else if upper.contains("TD") {
            EventKind::Tutorial
        } else if upper.contains("TP") {
            EventKind::Lab
        } else {
            EventKind::Other
        }
    }

    pub fn classify_color(&self, summary: &str) -> EventColor {
        self.color_for(self.classify(summary))
    }

    pub fn color_for(&self, kind: EventKind) -> EventColor {
        match kind {
            EventKind::Exam => self.palette.exam,
            EventKind::Lecture => self.palette.cm,
            EventKind::Tutorial => self.palette.td,
            EventKind::Lab => self.palette.tp,
            EventKind::Other => self.palette.default,
        }
    }
}

/// Decode HTML entities (`&#224;`, `&eacute;`, ...). Empty input is returned as is.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }
    html_escape::decode_html_entities(text)
}

/// Same as [`decode_entities`] for optional fields.
pub fn decode_optional(text: Option<&str>) -> Option<String> {
    text.map(|t| decode_entities(t).into_owned())
}
