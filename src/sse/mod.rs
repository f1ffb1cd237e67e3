//! Server-sent event frame splitting.
//!
//! Turns an incrementally-arriving byte stream into discrete event frames.
//! Transport read boundaries carry no semantic meaning: a logical frame may
//! straddle two reads, so partial lines are buffered across [`FrameSplitter::push`]
//! calls. The buffer is session-scoped and never shared.

/// One SSE record as delivered on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SseFrame {
    /// Event name from an `event:` line, if any.
    pub event: Option<String>,
    /// Payload from `data:` lines; multi-line data is joined with `\n`.
    pub data: String,
}

/// Frame-level envelope handed to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A data-carrying frame whose payload still needs decoding.
    Data(SseFrame),
    /// The literal `[DONE]` sentinel, recognized without JSON parsing.
    Done,
}

const DONE_SENTINEL: &str = "[DONE]";

/// Splits raw byte fragments into complete event frames.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
    current: SseFrame,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport read; returns every frame it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut events = Vec::new();
        while let Some(line_end) = self.buffer.find('\n') {
            let line = self.buffer[..line_end].trim_end_matches('\r').to_string();
            self.buffer.drain(..=line_end);

            if line.is_empty() {
                // Blank line terminates the record.
                if let Some(event) = self.take_frame() {
                    events.push(event);
                }
            } else {
                self.field_line(&line);
            }
        }
        events
    }

    /// Drain a trailing unterminated record at stream close.
    pub fn flush(&mut self) -> Option<StreamEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.field_line(line.trim_end_matches('\r'));
        }
        self.take_frame()
    }

    fn field_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return; // comment
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.current.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            if !self.current.data.is_empty() {
                self.current.data.push('\n');
            }
            self.current.data.push_str(value);
        }
        // id:, retry:, and unknown fields are ignored
    }

    fn take_frame(&mut self) -> Option<StreamEvent> {
        if self.current.data.is_empty() {
            // Records with no data (keep-alive pings, lone event names)
            // carry nothing to decode.
            self.current = SseFrame::default();
            return None;
        }
        let frame = std::mem::take(&mut self.current);
        if frame.data == DONE_SENTINEL {
            Some(StreamEvent::Done)
        } else {
            Some(StreamEvent::Data(frame))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data_frames(events: Vec<StreamEvent>) -> Vec<SseFrame> {
        events
            .into_iter()
            .map(|e| match e {
                StreamEvent::Data(frame) => frame,
                StreamEvent::Done => panic!("unexpected Done"),
            })
            .collect()
    }

    #[test]
    fn splits_complete_frames() {
        let mut splitter = FrameSplitter::new();
        let frames = data_frames(splitter.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n"));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "{\"a\":1}");
        assert_eq!(frames[1].data, "{\"b\":2}");
    }

    #[test]
    fn buffers_frame_across_reads() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"data: {\"text\":").is_empty());
        assert!(splitter.push(b"\"hi\"}").is_empty());
        let frames = data_frames(splitter.push(b"\n\n"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"text\":\"hi\"}");
    }

    #[test]
    fn carries_event_name() {
        let mut splitter = FrameSplitter::new();
        let frames =
            data_frames(splitter.push(b"event: content_block_delta\ndata: {\"x\":1}\n\n"));
        assert_eq!(frames[0].event.as_deref(), Some("content_block_delta"));
    }

    #[test]
    fn joins_multiline_data() {
        let mut splitter = FrameSplitter::new();
        let frames = data_frames(splitter.push(b"data: line1\ndata: line2\n\n"));
        assert_eq!(frames[0].data, "line1\nline2");
    }

    #[test]
    fn done_sentinel_is_distinct() {
        let mut splitter = FrameSplitter::new();
        let events = splitter.push(b"data: [DONE]\n\n");
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn ignores_comments_and_unknown_fields() {
        let mut splitter = FrameSplitter::new();
        let events = splitter.push(b": keep-alive\nid: 42\nretry: 100\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let mut splitter = FrameSplitter::new();
        let frames = data_frames(splitter.push(b"data: hello\r\n\r\n"));
        assert_eq!(frames[0].data, "hello");
    }

    #[test]
    fn flush_drains_unterminated_record() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"data: tail").is_empty());
        let event = splitter.flush().unwrap();
        assert_eq!(event, StreamEvent::Data(SseFrame { event: None, data: "tail".into() }));
        assert!(splitter.flush().is_none());
    }

    #[test]
    fn event_only_records_are_dropped() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"event: ping\n\n").is_empty());
        assert!(splitter.push(b"event: ping\ndata:\n\n").is_empty());
        // A stale event name must not leak into the next record.
        let frames = data_frames(splitter.push(b"data: {\"a\":1}\n\n"));
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "{\"a\":1}");
    }
}
