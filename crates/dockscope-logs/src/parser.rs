use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{LogEntry, StreamKind};

/// Docker's multiplexing header: stream type byte, 3 padding bytes, big-endian payload length
const FRAME_HEADER_LEN: usize = 8;

/// Zulu-suffixed fixed-precision layouts, tried after RFC 3339
const FIXED_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.9fZ", "%Y-%m-%dT%H:%M:%S%.3fZ"];

/// Parser turning one raw container log line into a LogEntry
pub struct LogParser;

impl LogParser {
    /// Parse one raw line (already split on `\n`) into a LogEntry.
    ///
    /// Never fails. Blank input yields an entry with an empty message, which
    /// callers must treat as "no entry" (see [`LogEntry::is_empty`]). Lines
    /// without a recognizable timestamp are stamped with the current time.
    pub fn parse(container_id: &str, raw: impl AsRef<[u8]>) -> LogEntry {
        let raw = raw.as_ref();

        let payload = Self::strip_frame_header(raw);
        let text = String::from_utf8_lossy(payload);
        let line = text.trim();
        if line.is_empty() {
            return LogEntry {
                container_id: container_id.to_string(),
                timestamp: DateTime::<Utc>::default(),
                message: String::new(),
                stream: StreamKind::Stdout,
            };
        }

        let (timestamp, message) = match Self::extract_timestamp(line) {
            Some((ts, rest)) => (ts, rest.trim()),
            None => (Utc::now(), line),
        };

        // Heuristics misfired: keep the original bytes rather than lose the line
        let message = if message.is_empty() {
            String::from_utf8_lossy(raw).trim().to_string()
        } else {
            message.to_string()
        };

        LogEntry {
            container_id: container_id.to_string(),
            timestamp,
            message,
            // stderr is not distinguished downstream yet
            stream: StreamKind::Stdout,
        }
    }

    /// Skip the 8-byte multiplexing header when the line looks framed.
    ///
    /// Plain `docker logs` text has no header, so this only strips when the
    /// first byte is a stdout (1) or stderr (2) marker and the line is long
    /// enough. A text line that genuinely starts with byte 1 or 2 will be
    /// misread as framed; that ambiguity is accepted.
    fn strip_frame_header(raw: &[u8]) -> &[u8] {
        match raw.first() {
            Some(1 | 2) if raw.len() >= FRAME_HEADER_LEN => &raw[FRAME_HEADER_LEN..],
            _ => raw,
        }
    }

    /// Split off a leading timestamp, returning it with the remainder of the line
    fn extract_timestamp(line: &str) -> Option<(DateTime<Utc>, &str)> {
        let (candidate, rest) = line.split_once(' ')?;
        Self::parse_timestamp(candidate).map(|ts| (ts, rest))
    }

    fn parse_timestamp(candidate: &str) -> Option<DateTime<Utc>> {
        // RFC 3339 covers both the nanosecond and the second precision forms
        if let Ok(ts) = DateTime::parse_from_rfc3339(candidate) {
            return Some(ts.with_timezone(&Utc));
        }

        FIXED_TIMESTAMP_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(candidate, format)
                .ok()
                .map(|naive| naive.and_utc())
        })
    }
}
