//! Protocol Engine: the relay's transition system.
//!
//! `Engine` is a cheaply-clonable handle onto one [`Registry`] guarded by a
//! mutex, plus the small set of immutable configuration values every
//! handler needs (server domain, length limits). Every connection task
//! gets its own clone of the handle; `handle_line` and `disconnect` take
//! the mutex for the duration of one command, so commands from different
//! connections never interleave their effects on shared state.

use crate::client::{ConnId, Frame, MessageQueue};
use crate::config::Config;
use crate::lines;
use crate::registry::Registry;
use ircrelay_tokens::{rpl, Buffer, Command, Message, ReplyBuffer};
use std::sync::Arc;
use tokio::sync::Mutex;

mod handlers;
mod validate;
#[cfg(test)]
mod test;

/// What the Connection Driver should do with the transport after a line
/// has been dispatched.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    Continue,
    Disconnect,
}

#[derive(Clone)]
pub struct Engine(Arc<Mutex<EngineInner>>);

struct EngineInner {
    domain: String,
    nicklen: usize,
    channellen: usize,
    registry: Registry,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Engine(Arc::new(Mutex::new(EngineInner {
            domain: config.domain.clone(),
            nicklen: config.nicklen,
            channellen: config.channellen,
            registry: Registry::new(),
        })))
    }

    /// Register a new connection with no identity and no room memberships.
    pub async fn attach(&self, queue: MessageQueue) -> ConnId {
        let id = self.0.lock().await.registry.attach(queue);
        log::debug!("{:?}: attached", id);
        id
    }

    /// Parse and dispatch one inbound line (CR LF already stripped by the
    /// Connection Driver). Non-UTF-8 octets are lossily substituted: the
    /// wire format itself is 8-bit clean, but the line codec is built on
    /// `&str` throughout.
    pub async fn handle_line(&self, id: ConnId, line: &[u8]) -> Outcome {
        let text = String::from_utf8_lossy(line);
        match Message::parse(&text) {
            Some(msg) => self.0.lock().await.handle_message(id, msg),
            None => Outcome::Continue,
        }
    }

    /// Detach `id` from every index and notify its captured audience
    /// exactly once each. Used for both an explicit `QUIT` and a
    /// transport-level disconnect.
    pub async fn disconnect(&self, id: ConnId, reason: &str) {
        self.0.lock().await.disconnect(id, reason);
    }
}

impl EngineInner {
    fn handle_message(&mut self, id: ConnId, msg: Message<'_>) -> Outcome {
        let command = match msg.command {
            Ok(command) => command,
            Err(token) => {
                if self.registry.is_registered(id) {
                    log::debug!("{:?}: unknown command {:?}", id, token);
                    let mut rb = self.reply_buffer(id);
                    rb.reply(rpl::ERR_UNKNOWNCOMMAND)
                        .param(token)
                        .trailing_param(lines::UNKNOWN_COMMAND);
                    self.flush(id, rb);
                }
                return Outcome::Continue;
            }
        };

        let exempt_from_registration = matches!(command, Command::Nick | Command::Ping | Command::Quit);
        if !exempt_from_registration && !self.registry.is_registered(id) {
            log::debug!("{:?}: {} rejected, not registered", id, command);
            let mut rb = self.reply_buffer(id);
            rb.reply(rpl::ERR_NOTREGISTERED).trailing_param(lines::NOT_REGISTERED);
            self.flush(id, rb);
            return Outcome::Continue;
        }

        log::debug!("{:?}: {}", id, command);
        let params = &msg.params[..msg.num_params];
        match command {
            Command::Nick => {
                self.cmd_nick(id, params.first().copied().unwrap_or(""));
                Outcome::Continue
            }
            Command::Ping => {
                self.cmd_ping(id, params.first().copied().unwrap_or(""));
                Outcome::Continue
            }
            Command::PrivMsg => {
                self.cmd_privmsg(
                    id,
                    params.first().copied().unwrap_or(""),
                    params.get(1).copied().unwrap_or(""),
                );
                Outcome::Continue
            }
            Command::Join => {
                self.cmd_join(id, params.first().copied().unwrap_or(""));
                Outcome::Continue
            }
            Command::Part => {
                self.cmd_part(id, params.first().copied().unwrap_or(""));
                Outcome::Continue
            }
            Command::Quit => {
                let reason = params.first().copied().unwrap_or(lines::CLIENT_QUIT);
                self.disconnect(id, reason);
                Outcome::Disconnect
            }
        }
    }

    fn reply_buffer(&self, id: ConnId) -> ReplyBuffer {
        ReplyBuffer::new(self.domain.clone(), self.registry.target(id).to_owned())
    }

    /// Send an accumulated reply to `id`, unless nothing was written (a
    /// no-op command, e.g. a repeated `NICK`) or `id` has already
    /// disappeared — a send to a closed connection is a silent no-op.
    fn flush(&self, id: ConnId, rb: ReplyBuffer) {
        if rb.is_empty() {
            return;
        }
        if let Some(conn) = self.registry.connection(id) {
            conn.send(rb);
        }
    }

    fn disconnect(&mut self, id: ConnId, reason: &str) {
        log::debug!("{:?}: disconnecting ({})", id, reason);
        let nick = self.registry.identity(id).map(str::to_owned);
        let audience = self.registry.detach(id);

        if let Some(nick) = nick {
            let mut buf = Buffer::new();
            buf.message(&nick, Command::Quit).trailing_param(reason);
            let frame = Frame::from(buf);
            for peer in audience {
                if let Some(conn) = self.registry.connection(peer) {
                    conn.send(frame.clone());
                }
            }
        }
    }
}
