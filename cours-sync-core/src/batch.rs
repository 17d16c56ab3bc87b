//! Google batch requests (`multipart/mixed`).
//!
//! See <https://developers.google.com/calendar/api/guides/batch>. Each part
//! of the request is a complete HTTP request; each part of the response is
//! the matching HTTP response, tagged `response-<content id>`.

use google_calendar::types::Event as GoogleEvent;
use url::Url;

use crate::error::{ImportError, ImportResult};

pub const BATCH_URL: &str = "https://www.googleapis.com/batch/calendar/v3";

/// Status of one inner request of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PartStatus {
    /// Position of the request inside its batch.
    pub index: usize,
    pub status: u16,
    pub message: Option<String>,
}

impl PartStatus {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of a batch of `events.insert` calls.
pub fn encode_insert_batch(
    boundary: &str,
    calendar_id: &str,
    events: &[GoogleEvent],
) -> ImportResult<String> {
    let path = events_path(calendar_id)?;
    let mut body = String::new();

    for (index, event) in events.iter().enumerate() {
        let json = serde_json::to_string(event)?;
        body.push_str(&format!("--{boundary}\r\n"));
        body.push_str("Content-Type: application/http\r\n");
        body.push_str(&format!("Content-ID: <item-{index}>\r\n\r\n"));
        body.push_str(&format!("POST {path} HTTP/1.1\r\n"));
        body.push_str("Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.push_str(&json);
        body.push_str("\r\n");
    }

    body.push_str(&format!("--{boundary}--\r\n"));
    Ok(body)
}

/// `/calendar/v3/calendars/<id>/events`, with the id escaped as a path segment.
fn events_path(calendar_id: &str) -> ImportResult<String> {
    let mut url = Url::parse("https://www.googleapis.com/calendar/v3/calendars")
        .map_err(|e| ImportError::BatchSubmission(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| ImportError::BatchSubmission("base URL cannot take a path".into()))?
        .push(calendar_id)
        .push("events");

    Ok(url.path().to_string())
}

/// The `boundary=` parameter of a multipart content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Parse the multipart response into one status per inner request, sorted
/// by request position.
pub fn decode_batch_response(boundary: &str, body: &str) -> ImportResult<Vec<PartStatus>> {
    let delimiter = format!("--{boundary}");
    let mut statuses = Vec::new();

    for (position, part) in body
        .split(delimiter.as_str())
        .map(str::trim)
        .filter(|part| !part.is_empty() && *part != "--")
        .enumerate()
    {
        let index = content_id_index(part).unwrap_or(position);

        let status_line = part
            .lines()
            .find(|line| line.starts_with("HTTP/"))
            .ok_or_else(|| {
                ImportError::BatchSubmission(format!("batch part {position} has no status line"))
            })?;

        let status: u16 = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .ok_or_else(|| {
                ImportError::BatchSubmission(format!("invalid status line '{status_line}'"))
            })?;

        let message = if (200..300).contains(&status) {
            None
        } else {
            Some(error_message(part).unwrap_or_else(|| status_line.trim().to_string()))
        };

        statuses.push(PartStatus {
            index,
            status,
            message,
        });
    }

    statuses.sort_by_key(|s| s.index);
    Ok(statuses)
}

fn content_id_index(part: &str) -> Option<usize> {
    part.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-id")
                .then(|| value.trim().to_string())
        })
        .and_then(|id| {
            id.trim_matches(|c| c == '<' || c == '>')
                .rsplit('-')
                .next()
                .and_then(|n| n.parse().ok())
        })
}

/// `error.message` from the JSON payload of a failed part, if any.
fn error_message(part: &str) -> Option<String> {
    let json_start = part.find('{')?;
    let json_end = part.rfind('}')?;
    let value: serde_json::Value = serde_json::from_str(&part[json_start..=json_end]).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str) -> GoogleEvent {
        GoogleEvent {
            summary: summary.to_string(),
            color_id: "11".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn encodes_one_part_per_event() {
        let body = encode_insert_batch(
            "b0",
            "abc@group.calendar.google.com",
            &[event("CM Algo"), event("TD Algo")],
        )
        .unwrap();

        assert_eq!(body.matches("--b0\r\n").count(), 2);
        assert!(body.ends_with("--b0--\r\n"));
        assert!(body.contains("Content-ID: <item-1>"));
        assert!(body.contains("POST /calendar/v3/calendars/abc@group.calendar.google.com/events"));
        assert!(body.contains("\"summary\":\"CM Algo\""));
    }

    #[test]
    fn calendar_id_is_escaped_as_a_path_segment() {
        assert_eq!(
            events_path("cours cy/2025#a").unwrap(),
            "/calendar/v3/calendars/cours%20cy%2F2025%23a/events"
        );
    }

    #[test]
    fn reads_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/mixed; boundary=batch_XyZ"),
            Some("batch_XyZ".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/mixed; boundary=\"quoted\""),
            Some("quoted".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
    }

    #[test]
    fn decodes_mixed_statuses() {
        let body = "--batch_x\r\n\
Content-Type: application/http\r\n\
Content-ID: <response-item-1>\r\n\
\r\n\
HTTP/1.1 400 Bad Request\r\n\
Content-Type: application/json\r\n\
\r\n\
{\"error\": {\"code\": 400, \"message\": \"Bad Request: end before start\"}}\r\n\
--batch_x\r\n\
Content-Type: application/http\r\n\
Content-ID: <response-item-0>\r\n\
\r\n\
HTTP/1.1 200 OK\r\n\
Content-Type: application/json\r\n\
\r\n\
{\"id\": \"evt1\"}\r\n\
--batch_x--\r\n";

        let statuses = decode_batch_response("batch_x", body).unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].index, 0);
        assert!(statuses[0].is_success());
        assert_eq!(statuses[1].index, 1);
        assert_eq!(statuses[1].status, 400);
        assert_eq!(
            statuses[1].message.as_deref(),
            Some("Bad Request: end before start")
        );
    }

    #[test]
    fn part_without_status_line_is_an_error() {
        let body = "--b\r\nContent-Type: application/http\r\n\r\ngarbage\r\n--b--";
        assert!(matches!(
            decode_batch_response("b", body),
            Err(ImportError::BatchSubmission(_))
        ));
    }
}
