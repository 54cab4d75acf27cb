//! Buffered Server-Sent Events decoder for provider streaming responses
//!
//! Network chunks do not respect SSE event boundaries, and they can split a
//! multi-byte UTF-8 character in half. The decoder carries both kinds of
//! partial state forward: undecodable trailing bytes wait for the next
//! chunk, and incomplete events stay buffered until their terminating blank
//! line arrives.

/// A parsed SSE event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Event type (e.g. "content_block_delta"); absent for plain data events
    pub event_type: Option<String>,
    /// The event payload, multi-line data joined with newlines
    pub data: String,
}

impl SseEvent {
    /// Check if this is the `[DONE]` terminator (OpenAI format)
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Incremental SSE decoder.
///
/// Feed raw bytes as they arrive; complete events come back in order,
/// everything else stays buffered.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text waiting for an event terminator
    buffer: String,
    /// Trailing bytes that were not a complete UTF-8 sequence
    partial_utf8: Vec<u8>,
}

impl SseDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and extract every complete event.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let bytes = if self.partial_utf8.is_empty() {
            chunk.to_vec()
        } else {
            let mut combined = std::mem::take(&mut self.partial_utf8);
            combined.extend_from_slice(chunk);
            combined
        };

        let (text, remainder) = decode_utf8_prefix(&bytes);
        self.buffer.push_str(&text);
        self.partial_utf8 = remainder;

        let mut events = Vec::new();
        while let Some(end) = self.find_event_boundary() {
            let event_text: String = self.buffer.drain(..end).collect();
            self.skip_delimiter();
            if let Some(event) = parse_event(&event_text) {
                events.push(event);
            }
        }
        events
    }

    /// Check if the decoder still holds undelivered data
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty() || !self.partial_utf8.is_empty()
    }

    /// Events end at a blank line: `\n\n` or `\r\n\r\n`
    fn find_event_boundary(&self) -> Option<usize> {
        self.buffer
            .find("\n\n")
            .or_else(|| self.buffer.find("\r\n\r\n"))
    }

    fn skip_delimiter(&mut self) {
        let trimmed = self.buffer.trim_start_matches(['\r', '\n']).len();
        let offset = self.buffer.len() - trimmed;
        self.buffer.drain(..offset);
    }
}

/// Decode the longest valid UTF-8 prefix, returning any trailing bytes that
/// may be the start of a character split across chunks. Genuinely invalid
/// bytes are replaced rather than wedging the stream.
fn decode_utf8_prefix(bytes: &[u8]) -> (String, Vec<u8>) {
    let mut text = String::new();
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                return (text, Vec::new());
            }
            Err(error) => {
                let valid_up_to = error.valid_up_to();
                text.push_str(std::str::from_utf8(&rest[..valid_up_to]).unwrap_or_default());
                match error.error_len() {
                    // invalid sequence mid-stream: replace and move on
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &rest[valid_up_to + len..];
                    }
                    // incomplete sequence at the end: carry it forward
                    None => return (text, rest[valid_up_to..].to_vec()),
                }
            }
        }
    }
}

/// Parse one event's text into its fields. Events without data are dropped.
fn parse_event(text: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_start();
        if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim_start());
        }
        // other fields (id, retry, comments) are ignored for LLM streams
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        event_type,
        data: data_lines.join("\n"),
    })
}
