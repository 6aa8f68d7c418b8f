//! Event scanner (C3, §4.3): splits `events.jsonl` on literal LF bytes,
//! preserving each line's absolute byte range, and parses each line as a
//! JSON object.
//!
//! Modeled as a restartable iterator the way the teacher frames its
//! lazy pipelines (original §9): constructing a fresh [`EventScanner`]
//! over the same byte slice always replays the same sequence from the
//! start, with no hidden cursor state surviving the scanner's lifetime.

const LF: u8 = 0x0A;

/// The narrative kind of an event (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Observation,
    SafetyTrigger,
    Other,
}

impl EventKind {
    fn from_str(s: &str) -> Self {
        match s {
            "observation" => Self::Observation,
            "safety_trigger" => Self::SafetyTrigger,
            _ => Self::Other,
        }
    }
}

/// One parsed event (§3).
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub frame_id: Option<u64>,
    pub t: Option<String>,
    /// The full parsed JSON object, for fields this crate doesn't
    /// interpret but downstream consumers (the graph builder) may.
    pub raw: serde_json::Value,
}

impl Event {
    fn from_value(value: serde_json::Value) -> Result<Self, String> {
        let obj = value.as_object().ok_or("event line is not a JSON object")?;
        let kind = obj
            .get("kind")
            .and_then(|v| v.as_str())
            .map(EventKind::from_str)
            .ok_or("event missing string field \"kind\"")?;
        let frame_id = obj.get("frame_id").and_then(serde_json::Value::as_u64);
        let t = obj
            .get("t")
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string);
        Ok(Self {
            kind,
            frame_id,
            t,
            raw: value,
        })
    }
}

/// A scanned line plus its parsed event: the absolute byte range into
/// `events.jsonl` (`byte_end` exclusive of the delimiting LF) and the
/// parsed [`Event`].
#[derive(Debug, Clone)]
pub struct ScannedEvent {
    pub byte_start: usize,
    pub byte_end: usize,
    pub event: Event,
}

/// Error scanning or parsing an event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventScanError {
    /// The line's bytes are not valid JSON.
    InvalidJson { line_start: usize, detail: String },
    /// The JSON value parsed, but trailing bytes followed it on the line.
    TrailingBytesAfterValue { line_start: usize },
    /// The JSON value is not an object.
    NotAnObject { line_start: usize },
    /// The object is missing a required field or has the wrong type for it.
    InvalidEvent { line_start: usize, detail: String },
}

impl std::fmt::Display for EventScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson { line_start, detail } => {
                write!(f, "invalid JSON at byte {line_start}: {detail}")
            }
            Self::TrailingBytesAfterValue { line_start } => {
                write!(f, "trailing bytes after JSON value at byte {line_start}")
            }
            Self::NotAnObject { line_start } => {
                write!(f, "event at byte {line_start} is not a JSON object")
            }
            Self::InvalidEvent { line_start, detail } => {
                write!(f, "invalid event at byte {line_start}: {detail}")
            }
        }
    }
}

impl std::error::Error for EventScanError {}

/// Iterator over the lines of `events.jsonl`.
///
/// Line ranges are pairwise disjoint and monotonically increasing;
/// concatenating the slices separated by single LFs reproduces the input
/// file exactly. A trailing empty line (the file ending in LF) is
/// permitted and silently skipped, never yielded.
pub struct EventScanner<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> EventScanner<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }
}

impl Iterator for EventScanner<'_> {
    type Item = Result<ScannedEvent, EventScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.data.len() {
            return None;
        }

        let byte_start = self.cursor;
        let line_end = match self.data[self.cursor..].iter().position(|&b| b == LF) {
            Some(rel) => self.cursor + rel,
            None => self.data.len(),
        };
        let line = &self.data[byte_start..line_end];
        self.cursor = if line_end < self.data.len() {
            line_end + 1
        } else {
            line_end
        };

        // A bare trailing LF (empty final line) is permitted and ignored,
        // not yielded as an event.
        if line.is_empty() {
            return self.next();
        }

        Some(parse_line(byte_start, line_end, line))
    }
}

fn parse_line(
    byte_start: usize,
    byte_end: usize,
    line: &[u8],
) -> Result<ScannedEvent, EventScanError> {
    let mut de = serde_json::Deserializer::from_slice(line);
    let value: serde_json::Value =
        serde::Deserialize::deserialize(&mut de).map_err(|e| EventScanError::InvalidJson {
            line_start: byte_start,
            detail: e.to_string(),
        })?;
    de.end().map_err(|_| EventScanError::TrailingBytesAfterValue {
        line_start: byte_start,
    })?;

    if !value.is_object() {
        return Err(EventScanError::NotAnObject {
            line_start: byte_start,
        });
    }

    let event = Event::from_value(value).map_err(|detail| EventScanError::InvalidEvent {
        line_start: byte_start,
        detail,
    })?;

    Ok(ScannedEvent {
        byte_start,
        byte_end,
        event,
    })
}
