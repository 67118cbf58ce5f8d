//! Per-command handlers: one function per supported command.
//!
//! Each function owns the full reaction to one command: it may accumulate
//! a numeric reply into a fresh [`ReplyBuffer`] (flushed to the issuing
//! connection through [`EngineInner::flush`]), relay a message directly to
//! one or more peers, or both, in the order the protocol requires.

use super::validate::{is_valid_nick, is_valid_room};
use super::EngineInner;
use crate::client::{ConnId, Frame};
use crate::lines;
use crate::registry::RegistryError;
use ircrelay_tokens::{rpl, Buffer, Command};

impl EngineInner {
    pub(super) fn cmd_nick(&mut self, id: ConnId, nick: &str) {
        let mut rb = self.reply_buffer(id);

        if nick.is_empty() {
            rb.reply(rpl::ERR_NONICKNAMEGIVEN).trailing_param(lines::NO_NICKNAME_GIVEN);
            self.flush(id, rb);
            return;
        }
        if !is_valid_nick(nick, self.nicklen) {
            rb.reply(rpl::ERR_ERRONEUSNICKNAME).param(nick).trailing_param(lines::ERRONEUS_NICKNAME);
            self.flush(id, rb);
            return;
        }

        let previous = self.registry.identity(id).map(str::to_owned);
        if let Some(current) = &previous {
            if current.eq_ignore_ascii_case(nick) {
                return;
            }
        }

        match self.registry.set_identity(id, nick) {
            Err(RegistryError::InUse) => {
                rb.reply(rpl::ERR_NICKNAMEINUSE).param(nick).trailing_param(lines::NICKNAME_IN_USE);
                self.flush(id, rb);
            }
            Err(RegistryError::NotOnChannel) => {
                unreachable!("set_identity never reports NotOnChannel")
            }
            Ok(()) => match previous {
                None => {
                    rb.reply(rpl::WELCOME).trailing_param(lines::WELCOME);
                    rb.reply(rpl::ERR_NOMOTD).trailing_param(lines::NO_MOTD);
                    self.flush(id, rb);
                }
                Some(old_nick) => {
                    let audience = self.registry.audience(id);
                    let mut buf = Buffer::new();
                    buf.message(&old_nick, Command::Nick).trailing_param(nick);
                    let frame = Frame::from(buf);
                    if let Some(conn) = self.registry.connection(id) {
                        conn.send(frame.clone());
                    }
                    for peer in audience {
                        if let Some(conn) = self.registry.connection(peer) {
                            conn.send(frame.clone());
                        }
                    }
                }
            },
        }
    }

    pub(super) fn cmd_ping(&mut self, id: ConnId, payload: &str) {
        let mut rb = self.reply_buffer(id);
        let domain = self.domain.clone();
        rb.message(&domain, "PONG").param(&domain).trailing_param(payload);
        self.flush(id, rb);
    }

    pub(super) fn cmd_privmsg(&mut self, id: ConnId, target: &str, text: &str) {
        let mut rb = self.reply_buffer(id);

        if target.is_empty() {
            rb.reply(rpl::ERR_NORECIPIENT).trailing_param(lines::NO_RECIPIENT);
            self.flush(id, rb);
            return;
        }
        if text.is_empty() {
            rb.reply(rpl::ERR_NOTEXTTOSEND).trailing_param(lines::NO_TEXT_TO_SEND);
            self.flush(id, rb);
            return;
        }

        let sender = self.registry.identity(id).unwrap_or("*").to_owned();

        if target.starts_with('#') {
            if !is_valid_room(target, self.channellen) || !self.registry.room_exists(target) {
                rb.reply(rpl::ERR_NOSUCHCHANNEL).param(target).trailing_param(lines::NO_SUCH_CHANNEL);
                self.flush(id, rb);
                return;
            }
            let display = self.registry.room_display_name(target).unwrap_or(target).to_owned();

            if !self.registry.is_member(id, target) {
                rb.reply(rpl::ERR_CANNOTSENDTOCHAN)
                    .param(&display)
                    .trailing_param(lines::CANNOT_SEND_TO_CHAN);
                self.flush(id, rb);
                return;
            }

            let mut buf = Buffer::new();
            buf.message(&sender, Command::PrivMsg).param(&display).trailing_param(text);
            let frame = Frame::from(buf);
            let members: Vec<ConnId> = self
                .registry
                .room_members(target)
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default();
            for member in members {
                if member != id {
                    if let Some(conn) = self.registry.connection(member) {
                        conn.send(frame.clone());
                    }
                }
            }
        } else if !is_valid_nick(target, self.nicklen) {
            rb.reply(rpl::ERR_NOSUCHNICK).param(target).trailing_param(lines::NO_SUCH_NICK);
            self.flush(id, rb);
        } else {
            match self.registry.find_by_nick(target) {
                None => {
                    rb.reply(rpl::ERR_NOSUCHNICK).param(target).trailing_param(lines::NO_SUCH_NICK);
                    self.flush(id, rb);
                }
                Some(recipient) => {
                    let mut buf = Buffer::new();
                    buf.message(&sender, Command::PrivMsg).param(target).trailing_param(text);
                    if let Some(conn) = self.registry.connection(recipient) {
                        conn.send(buf);
                    }
                }
            }
        }
    }

    pub(super) fn cmd_join(&mut self, id: ConnId, keys: &str) {
        if keys.is_empty() {
            let mut rb = self.reply_buffer(id);
            rb.reply(rpl::ERR_NEEDMOREPARAMS).param("JOIN").trailing_param(lines::NEED_MORE_PARAMS);
            self.flush(id, rb);
            return;
        }

        let nick = match self.registry.identity(id).map(str::to_owned) {
            Some(nick) => nick,
            None => return,
        };

        for key in keys.split(',').filter(|k| !k.is_empty()) {
            if !is_valid_room(key, self.channellen) {
                let mut rb = self.reply_buffer(id);
                rb.reply(rpl::ERR_NOSUCHCHANNEL).param(key).trailing_param(lines::NO_SUCH_CHANNEL);
                self.flush(id, rb);
                continue;
            }
            if self.registry.is_member(id, key) {
                continue;
            }

            let display = self.registry.room_display_name(key).unwrap_or(key).to_owned();

            let existing: Vec<ConnId> = self
                .registry
                .room_members(key)
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default();

            let mut join_buf = Buffer::new();
            join_buf.message(&nick, Command::Join).trailing_param(&display);
            let join_frame = Frame::from(join_buf);
            for member in existing {
                if let Some(conn) = self.registry.connection(member) {
                    conn.send(join_frame.clone());
                }
            }

            self.registry.join(id, key);

            if let Some(conn) = self.registry.connection(id) {
                conn.send(join_frame.clone());
            }

            self.send_names(id, key);
        }
    }

    /// One or more `353` lines followed by a `366` terminator, for `key`.
    /// Continuation lines are split so each serialized `353` line stays
    /// within the wire size cap; at least one `353` is always emitted,
    /// since `id` is already a member of `key` by the time this runs.
    fn send_names(&self, id: ConnId, key: &str) {
        const BUDGET: usize = 510;

        let display = self.registry.room_display_name(key).unwrap_or(key).to_owned();
        let nicks = self.registry.sorted_member_nicks(key).unwrap_or_default();
        let target = self.registry.target(id).to_owned();
        let prefix_len = format!(":{} 353 {} = {} :", self.domain, target, display).len();

        let mut rb = self.reply_buffer(id);
        let mut nicks = nicks.into_iter().peekable();
        while nicks.peek().is_some() {
            let mut msg = rb.reply(rpl::NAMREPLY);
            msg.param("=").param(&display);
            let trailing = msg.raw_trailing_param();
            let mut line_len = prefix_len;
            let mut first = true;
            while let Some(&nick) = nicks.peek() {
                let additional = nick.len() + if first { 0 } else { 1 };
                if !first && line_len + additional > BUDGET {
                    break;
                }
                if !first {
                    trailing.push(' ');
                }
                trailing.extend_from_slice(nick.as_bytes());
                line_len += additional;
                first = false;
                nicks.next();
            }
        }
        rb.reply(rpl::ENDOFNAMES).param(&display).trailing_param(lines::END_OF_NAMES);
        self.flush(id, rb);
    }

    pub(super) fn cmd_part(&mut self, id: ConnId, keys: &str) {
        if keys.is_empty() {
            let mut rb = self.reply_buffer(id);
            rb.reply(rpl::ERR_NEEDMOREPARAMS).param("PART").trailing_param(lines::NEED_MORE_PARAMS);
            self.flush(id, rb);
            return;
        }

        let nick = match self.registry.identity(id).map(str::to_owned) {
            Some(nick) => nick,
            None => return,
        };

        for key in keys.split(',').filter(|k| !k.is_empty()) {
            let display = self.registry.room_display_name(key).unwrap_or(key).to_owned();

            if !self.registry.is_member(id, key) {
                let mut rb = self.reply_buffer(id);
                rb.reply(rpl::ERR_NOTONCHANNEL).param(&display).trailing_param(lines::NOT_ON_CHANNEL);
                self.flush(id, rb);
                continue;
            }

            let snapshot: Vec<ConnId> = self
                .registry
                .room_members(key)
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default();

            let mut buf = Buffer::new();
            buf.message(&nick, Command::Part).param(&display);
            let frame = Frame::from(buf);

            let _ = self.registry.leave(id, key);

            for member in snapshot {
                if let Some(conn) = self.registry.connection(member) {
                    conn.send(frame.clone());
                }
            }
        }
    }
}
