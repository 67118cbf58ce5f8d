//! Authoritative in-memory indices relating connections, identities and
//! rooms. All mutation of the server's state happens here; everything
//! else only reads through these methods.
//!
//! Invariants maintained by every method below:
//!
//! 1. For every registered connection `C` with identity `N`:
//!    `nick_index[fold(N)] == C` and `C`'s stored identity is `N`.
//! 2. A connection is registered iff it has an identity.
//! 3. Every room is a non-empty member set; every member's `rooms` set
//!    contains that room's key.
//! 4. For every connection `C` and room key `K` in `C`'s rooms: `C` is a
//!    member of `rooms[K]`.
//! 5. No room with empty membership is kept around.
//! 6. Identity and room-key uniqueness are both ASCII case-insensitive.

use crate::channel::Room;
use crate::client::{ConnId, Connection, MessageQueue};
use ircrelay_unicase::UniCase;
use slab::Slab;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryError {
    /// `setIdentity` target nick is held by a different connection.
    InUse,
    /// `leave` target room is not one the caller belongs to.
    NotOnChannel,
}

pub struct Registry {
    connections: Slab<Connection>,
    nick_index: HashMap<UniCase<String>, ConnId>,
    rooms: HashMap<UniCase<String>, Room>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            connections: Slab::new(),
            nick_index: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    /// Register a new connection with no identity and no room memberships.
    pub fn attach(&mut self, queue: MessageQueue) -> ConnId {
        ConnId(self.connections.insert(Connection::new(queue)))
    }

    pub fn is_registered(&self, id: ConnId) -> bool {
        self.connections.get(id.0).map_or(false, Connection::is_registered)
    }

    pub fn identity(&self, id: ConnId) -> Option<&str> {
        self.connections.get(id.0).and_then(Connection::identity)
    }

    pub fn target(&self, id: ConnId) -> &str {
        self.connections.get(id.0).map_or("*", Connection::target)
    }

    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    /// Assign `nick` to `id`.
    ///
    /// Fails with `InUse` if another connection already holds `fold(nick)`.
    /// Idempotent (and a pure no-op) if `id` already holds it.
    pub fn set_identity(&mut self, id: ConnId, nick: &str) -> Result<(), RegistryError> {
        let fold = UniCase(nick.to_owned());
        if let Some(&holder) = self.nick_index.get(&fold) {
            return if holder == id { Ok(()) } else { Err(RegistryError::InUse) };
        }

        let conn = &mut self.connections[id.0];
        if let Some(old) = conn.identity() {
            self.nick_index.remove(<&UniCase<str>>::from(old));
        }
        conn.set_identity(nick.to_owned());
        self.nick_index.insert(fold, id);
        Ok(())
    }

    /// Remove `id` from every index: the nickname table and every room it
    /// was a member of, deleting any room left empty. Returns the set of
    /// other connections that shared at least one room with `id`
    /// immediately before the removal — the fan-out audience for a QUIT.
    pub fn detach(&mut self, id: ConnId) -> HashSet<ConnId> {
        let audience = self.audience(id);

        let conn = match self.connections.try_remove(id.0) {
            Some(conn) => conn,
            None => return HashSet::new(),
        };

        if let Some(nick) = conn.identity() {
            self.nick_index.remove(<&UniCase<str>>::from(nick));
        }

        for room_key in &conn.rooms {
            if let Some(room) = self.rooms.get_mut(room_key) {
                room.members.remove(&id);
                if room.members.is_empty() {
                    self.rooms.remove(room_key);
                }
            }
        }

        audience
    }

    /// Join `id` to the room named `key`. Returns `true` if this call
    /// actually changed membership (creating the room if it didn't
    /// exist); `false` if `id` was already a member (a no-op, per the
    /// idempotence rule — no notification should be sent by the caller in
    /// that case).
    pub fn join(&mut self, id: ConnId, key: &str) -> bool {
        let fold = UniCase(key.to_owned());

        if self.connections[id.0].rooms.contains(&fold) {
            return false;
        }

        self.rooms
            .entry(fold.clone())
            .and_modify(|room| {
                room.members.insert(id);
            })
            .or_insert_with(|| Room::new(key.to_owned(), id));

        self.connections[id.0].rooms.insert(fold);
        true
    }

    /// Remove `id` from the room named `key`. Fails with `NotOnChannel` if
    /// `id` isn't a member. Deletes the room if it becomes empty.
    pub fn leave(&mut self, id: ConnId, key: &str) -> Result<(), RegistryError> {
        let fold = UniCase(key.to_owned());

        if !self.connections[id.0].rooms.remove(&fold) {
            return Err(RegistryError::NotOnChannel);
        }

        if let Some(room) = self.rooms.get_mut(&fold) {
            room.members.remove(&id);
            if room.members.is_empty() {
                self.rooms.remove(&fold);
            }
        }

        Ok(())
    }

    /// The deduplicated set of every connection sharing at least one room
    /// with `id` (excluding `id` itself).
    pub fn audience(&self, id: ConnId) -> HashSet<ConnId> {
        let mut out = HashSet::new();
        if let Some(conn) = self.connections.get(id.0) {
            for room_key in &conn.rooms {
                if let Some(room) = self.rooms.get(room_key) {
                    out.extend(room.members.iter().copied().filter(|&m| m != id));
                }
            }
        }
        out
    }

    /// Look up a connection by its currently registered nickname.
    pub fn find_by_nick(&self, nick: &str) -> Option<ConnId> {
        self.nick_index.get(<&UniCase<str>>::from(nick)).copied()
    }

    /// The member set of an existing room, or `None` if no such room.
    pub fn room_members(&self, key: &str) -> Option<&HashSet<ConnId>> {
        self.rooms.get(<&UniCase<str>>::from(key)).map(|room| &room.members)
    }

    pub fn room_exists(&self, key: &str) -> bool {
        self.rooms.contains_key(<&UniCase<str>>::from(key))
    }

    /// The casing supplied by whoever's `JOIN` created `key`'s room, or
    /// `None` if no such room exists. Callers that echo a room name in a
    /// notification or reply should prefer this over the raw per-command
    /// argument casing a client happened to send, so a room's displayed name
    /// stays fixed for its whole lifetime.
    pub fn room_display_name(&self, key: &str) -> Option<&str> {
        self.rooms.get(<&UniCase<str>>::from(key)).map(|room| room.display_name.as_str())
    }

    /// Whether `id` currently belongs to the room named `key`.
    pub fn is_member(&self, id: ConnId, key: &str) -> bool {
        self.connections
            .get(id.0)
            .map_or(false, |conn| conn.rooms.contains(<&UniCase<str>>::from(key)))
    }

    /// Nicknames of every member of `key`, in ASCII-ascending order of
    /// their stored casing. `None` if no such room.
    pub fn sorted_member_nicks(&self, key: &str) -> Option<Vec<&str>> {
        let room = self.rooms.get(<&UniCase<str>>::from(key))?;
        let mut nicks: Vec<&str> = room
            .members
            .iter()
            .filter_map(|&member| self.connections.get(member.0).and_then(Connection::identity))
            .collect();
        nicks.sort_unstable();
        Some(nicks)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn attach(reg: &mut Registry) -> ConnId {
        let (tx, _rx) = mpsc::unbounded_channel();
        reg.attach(tx)
    }

    #[test]
    fn set_identity_then_lookup() {
        let mut reg = Registry::new();
        let a = attach(&mut reg);
        reg.set_identity(a, "Alice").unwrap();
        assert!(reg.is_registered(a));
        assert_eq!(reg.identity(a), Some("Alice"));
        assert_eq!(reg.find_by_nick("alice"), Some(a));
        assert_eq!(reg.find_by_nick("ALICE"), Some(a));
    }

    #[test]
    fn set_identity_collision_is_case_insensitive() {
        let mut reg = Registry::new();
        let a = attach(&mut reg);
        let b = attach(&mut reg);
        reg.set_identity(a, "Alice").unwrap();
        assert_eq!(reg.set_identity(b, "ALICE"), Err(RegistryError::InUse));
    }

    #[test]
    fn set_identity_same_connection_is_idempotent() {
        let mut reg = Registry::new();
        let a = attach(&mut reg);
        reg.set_identity(a, "Alice").unwrap();
        assert_eq!(reg.set_identity(a, "alice"), Ok(()));
        assert_eq!(reg.identity(a), Some("Alice"));
    }

    #[test]
    fn join_is_idempotent_and_leave_restores_prior_state() {
        let mut reg = Registry::new();
        let a = attach(&mut reg);
        reg.set_identity(a, "alice").unwrap();

        assert!(reg.join(a, "#room"));
        assert!(!reg.join(a, "#room"));
        assert!(reg.room_exists("#room"));

        reg.leave(a, "#room").unwrap();
        assert!(!reg.room_exists("#room"));
        assert_eq!(reg.leave(a, "#room"), Err(RegistryError::NotOnChannel));
    }

    #[test]
    fn room_survives_while_any_member_remains() {
        let mut reg = Registry::new();
        let a = attach(&mut reg);
        let b = attach(&mut reg);
        reg.join(a, "#room");
        reg.join(b, "#room");

        reg.leave(a, "#room").unwrap();
        assert!(reg.room_exists("#room"));
        assert!(reg.is_member(b, "#room"));

        reg.leave(b, "#room").unwrap();
        assert!(!reg.room_exists("#room"));
    }

    #[test]
    fn detach_returns_audience_and_cleans_up_empty_rooms() {
        let mut reg = Registry::new();
        let alice = attach(&mut reg);
        let bob = attach(&mut reg);
        let carol = attach(&mut reg);
        reg.set_identity(alice, "alice").unwrap();
        reg.set_identity(bob, "bob").unwrap();
        reg.set_identity(carol, "carol").unwrap();

        reg.join(alice, "#chan");
        reg.join(bob, "#chan");
        reg.join(carol, "#chan");
        reg.join(bob, "#other");
        reg.join(carol, "#other");

        let audience = reg.detach(bob);
        assert_eq!(audience, [alice, carol].into_iter().collect());
        assert!(reg.room_exists("#chan"));
        assert!(reg.room_exists("#other"));
        assert!(!reg.is_registered(bob));
        assert_eq!(reg.find_by_nick("bob"), None);
    }

    #[test]
    fn sorted_member_nicks_are_ascending() {
        let mut reg = Registry::new();
        let bob = attach(&mut reg);
        let alice = attach(&mut reg);
        reg.set_identity(bob, "bob").unwrap();
        reg.set_identity(alice, "alice").unwrap();
        reg.join(bob, "#chan");
        reg.join(alice, "#chan");

        assert_eq!(reg.sorted_member_nicks("#chan").unwrap(), vec!["alice", "bob"]);
    }
}
