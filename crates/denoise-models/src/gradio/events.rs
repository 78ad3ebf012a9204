//! Server-sent event parsing for Gradio's `/call/<api>/<event_id>` stream.

/// One event from a server-sent event body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    /// Event name (`complete`, `error`, `heartbeat`, `generating`, ...).
    pub event: String,
    /// Event payload, multiple `data:` lines joined with `\n`.
    pub data: String,
}

/// Parses a complete SSE body into its events.
///
/// Events are separated by blank lines. Comment lines (starting with `:`)
/// and unknown fields are skipped. An event without an `event:` field is
/// named `message`.
pub fn parse_events(body: &str) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    let mut name: Option<String> = None;
    let mut data: Vec<&str> = Vec::new();

    for raw in body.lines() {
        let line = raw.trim_end_matches('\r');

        if line.is_empty() {
            flush(&mut events, &mut name, &mut data);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => name = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }
    flush(&mut events, &mut name, &mut data);

    events
}

fn flush(events: &mut Vec<ServerEvent>, name: &mut Option<String>, data: &mut Vec<&str>) {
    if name.is_none() && data.is_empty() {
        return;
    }
    events.push(ServerEvent {
        event: name.take().unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
    });
    data.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_after_heartbeat() {
        let body = "event: heartbeat\ndata: null\n\nevent: complete\ndata: [1, 2]\n\n";
        let events = parse_events(body);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "heartbeat");
        assert_eq!(events[0].data, "null");
        assert_eq!(events[1].event, "complete");
        assert_eq!(events[1].data, "[1, 2]");
    }

    #[test]
    fn test_parse_crlf_and_missing_trailing_blank_line() {
        let body = "event: error\r\ndata: \"GPU quota exceeded\"";
        let events = parse_events(body);
        assert_eq!(
            events,
            vec![ServerEvent {
                event: "error".to_string(),
                data: "\"GPU quota exceeded\"".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_multiline_data_and_comments() {
        let body = ": keep-alive\n\ndata: first\ndata: second\n\n";
        let events = parse_events(body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_events("").is_empty());
        assert!(parse_events("\n\n").is_empty());
    }
}
