//! Per-connection state and the outbound message queue.

use ircrelay_tokens::{Buffer, ReplyBuffer};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use ircrelay_unicase::UniCase;

/// Stable, opaque handle identifying one client connection for as long as
/// it is attached to the [`crate::registry::Registry`]. Connections never
/// reuse an id while still attached; `slab` may reuse the numeric value
/// only after the previous occupant has been detached.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub(crate) usize);

/// One outbound frame: an immutable, cheaply-clonable byte buffer.
///
/// Fan-out to many recipients (a room broadcast, a QUIT notification) needs
/// to hand the same serialized bytes to several queues without
/// re-serializing or deep-copying; `Arc<[u8]>` makes that clone a refcount
/// bump.
#[derive(Clone)]
pub struct Frame(Arc<[u8]>);

impl From<Buffer> for Frame {
    fn from(buf: Buffer) -> Self {
        Frame(buf.into_bytes().into())
    }
}

impl From<ReplyBuffer> for Frame {
    fn from(rb: ReplyBuffer) -> Self {
        Frame::from(Buffer::from(rb))
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

pub type MessageQueue = mpsc::UnboundedSender<Frame>;
pub type MessageQueueReceiver = mpsc::UnboundedReceiver<Frame>;

/// The server-side state of one connection.
pub(crate) struct Connection {
    /// `None` until the first successful `NICK`.
    identity: Option<String>,

    /// Room keys (ASCII-folded) this connection currently belongs to.
    pub(crate) rooms: HashSet<UniCase<String>>,

    queue: MessageQueue,
}

impl Connection {
    pub(crate) fn new(queue: MessageQueue) -> Self {
        Connection { identity: None, rooms: HashSet::new(), queue }
    }

    pub fn is_registered(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The name used as `<target>` in numeric replies: the current
    /// identity, or `*` before registration.
    pub fn target(&self) -> &str {
        self.identity.as_deref().unwrap_or("*")
    }

    pub(crate) fn set_identity(&mut self, nick: String) {
        self.identity = Some(nick);
    }

    /// Queue `frame` for delivery. A send to a connection whose receiving
    /// task has already gone away is a silent no-op, per the relay's error
    /// handling rules: transport errors never propagate into the engine.
    pub fn send(&self, frame: impl Into<Frame>) {
        let _ = self.queue.send(frame.into());
    }
}
