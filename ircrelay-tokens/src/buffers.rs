use crate::command::CommandToken;
use crate::message::MESSAGE_LENGTH;
use crate::rpl::Reply;

/// An accumulator of serialized octet lines, ready to be sent on a
/// transport. Built from one or more [`MessageBuffer`]s.
#[derive(Default)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer { bytes: Vec::new() }
    }

    /// Start a new line of the form `[:prefix ]COMMAND`, ready for
    /// `.param(..)`/`.trailing_param(..)` calls. The line is finalized
    /// (CR LF appended, truncated to 510 payload octets if needed) when the
    /// returned `MessageBuffer` is dropped.
    pub fn message<T: CommandToken>(&mut self, prefix: &str, command: T) -> MessageBuffer<'_> {
        let line_start = self.bytes.len();
        if !prefix.is_empty() {
            self.bytes.push(b':');
            self.bytes.extend_from_slice(prefix.as_bytes());
            self.bytes.push(b' ');
        }
        self.bytes.extend_from_slice(command.token().as_bytes());
        MessageBuffer { bytes: &mut self.bytes, line_start }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A line under construction. Each method call appends one more token;
/// dropping (or calling [`MessageBuffer::build`]) finalizes the line.
pub struct MessageBuffer<'a> {
    bytes: &'a mut Vec<u8>,
    line_start: usize,
}

impl<'a> MessageBuffer<'a> {
    pub fn param(&mut self, value: impl AsRef<str>) -> &mut Self {
        self.bytes.push(b' ');
        self.bytes.extend_from_slice(value.as_ref().as_bytes());
        self
    }

    pub fn trailing_param(&mut self, value: impl AsRef<str>) -> &mut Self {
        self.bytes.extend_from_slice(b" :");
        self.bytes.extend_from_slice(value.as_ref().as_bytes());
        self
    }

    /// Push a space then hand back the raw byte buffer, for building a
    /// parameter incrementally (e.g. a NAMES listing's space-separated
    /// nick list).
    pub fn raw_param(&mut self) -> &mut Vec<u8> {
        self.bytes.push(b' ');
        self.bytes
    }

    /// Push ` :` then hand back the raw byte buffer, for building a
    /// trailing parameter incrementally.
    pub fn raw_trailing_param(&mut self) -> &mut Vec<u8> {
        self.bytes.extend_from_slice(b" :");
        self.bytes
    }

    /// Finalize the line now rather than at end of scope. Equivalent to
    /// just letting the value drop; kept for readability at call sites
    /// that don't otherwise need a block.
    pub fn build(self) {}
}

impl<'a> Drop for MessageBuffer<'a> {
    fn drop(&mut self) {
        self.bytes.extend_from_slice(b"\r\n");
        let line_len = self.bytes.len() - self.line_start;
        if line_len > MESSAGE_LENGTH {
            let payload_end = self.line_start + (MESSAGE_LENGTH - 2);
            self.bytes.truncate(payload_end);
            self.bytes.extend_from_slice(b"\r\n");
        }
    }
}

/// A [`Buffer`] paired with the server domain and the issuing client's
/// current target name (nick, or `*` before registration), for building
/// numeric replies addressed to one client.
///
/// Holds owned copies of `domain`/`target` rather than borrowing them, so a
/// `ReplyBuffer` built at the start of dispatching a command doesn't keep
/// the engine's own state borrowed while its handler runs.
pub struct ReplyBuffer {
    buffer: Buffer,
    domain: String,
    target: String,
}

impl ReplyBuffer {
    pub fn new(domain: impl Into<String>, target: impl Into<String>) -> Self {
        ReplyBuffer { buffer: Buffer::new(), domain: domain.into(), target: target.into() }
    }

    /// Start a numeric reply: `:<domain> <NNN> <target>`.
    pub fn reply(&mut self, code: Reply) -> MessageBuffer<'_> {
        let line_start = self.buffer.bytes.len();
        self.buffer.bytes.push(b':');
        self.buffer.bytes.extend_from_slice(self.domain.as_bytes());
        self.buffer.bytes.push(b' ');
        self.buffer.bytes.extend_from_slice(format!("{:03}", code).as_bytes());
        let mut mb = MessageBuffer { bytes: &mut self.buffer.bytes, line_start };
        mb.param(&self.target);
        mb
    }

    /// Start a relayed (non-numeric) message, e.g. `:nick JOIN :#chan`.
    pub fn message<T: CommandToken>(&mut self, prefix: &str, command: T) -> MessageBuffer<'_> {
        self.buffer.message(prefix, command)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl From<ReplyBuffer> for Buffer {
    fn from(rb: ReplyBuffer) -> Buffer {
        rb.buffer
    }
}
