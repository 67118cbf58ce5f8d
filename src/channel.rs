//! Room data.
//!
//! Rooms are ephemeral multicast groups: created implicitly by the first
//! `JOIN`, destroyed the instant their last member leaves or quits. There
//! is no channel mode, topic, ban list or invite list here — those are all
//! explicitly out of scope for this relay.

use crate::client::ConnId;
use std::collections::HashSet;

pub(crate) struct Room {
    /// The casing supplied by whoever's `JOIN` created this room. Room keys
    /// are compared case-insensitively but displayed with this casing for
    /// the lifetime of the room.
    pub(crate) display_name: String,

    pub(crate) members: HashSet<ConnId>,
}

impl Room {
    pub(crate) fn new(display_name: String, first_member: ConnId) -> Self {
        let mut members = HashSet::new();
        members.insert(first_member);
        Room { display_name, members }
    }
}
