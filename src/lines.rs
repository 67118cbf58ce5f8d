//! The fixed human-readable trailing text of every reply this relay sends.
//!
//! Kept as one place so the exact wording (and the testable properties that
//! pin it down) doesn't drift between handlers.

pub const NOT_REGISTERED: &str = "You have not registered";
pub const NO_NICKNAME_GIVEN: &str = "No nickname given";
pub const ERRONEUS_NICKNAME: &str = "Erroneous nickname";
pub const NICKNAME_IN_USE: &str = "Nickname is already in use";
pub const WELCOME: &str = "Welcome";
pub const NO_MOTD: &str = "MOTD File is missing";
pub const NO_RECIPIENT: &str = "No recipient given (PRIVMSG)";
pub const NO_TEXT_TO_SEND: &str = "No text to send";
pub const NO_SUCH_CHANNEL: &str = "No such channel";
pub const CANNOT_SEND_TO_CHAN: &str = "Cannot send to channel";
pub const NO_SUCH_NICK: &str = "No such nick/channel";
pub const NEED_MORE_PARAMS: &str = "Not enough parameters";
pub const NOT_ON_CHANNEL: &str = "You're not on that channel";
pub const UNKNOWN_COMMAND: &str = "Unknown command";
pub const END_OF_NAMES: &str = "End of /NAMES list.";

/// Default `QUIT` reason for an explicit client quit with no reason given.
pub const CLIENT_QUIT: &str = "Client quit";

/// Default `QUIT` reason when the disconnect was triggered by peer
/// half-close or a read error, rather than an explicit `QUIT`.
pub const CONNECTION_CLOSED: &str = "Connection closed";
