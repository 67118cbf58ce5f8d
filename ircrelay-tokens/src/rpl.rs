//! Numeric reply codes used by this relay.
//!
//! Only the subset enumerated by the protocol: `001, 366, 401, 403, 404,
//! 411, 412, 421, 422, 431, 432, 433, 442, 451, 461`.

pub type Reply = u16;

pub const WELCOME: Reply = 1;
pub const NAMREPLY: Reply = 353;
pub const ENDOFNAMES: Reply = 366;
pub const ERR_NOSUCHNICK: Reply = 401;
pub const ERR_NOSUCHCHANNEL: Reply = 403;
pub const ERR_CANNOTSENDTOCHAN: Reply = 404;
pub const ERR_NORECIPIENT: Reply = 411;
pub const ERR_NOTEXTTOSEND: Reply = 412;
pub const ERR_UNKNOWNCOMMAND: Reply = 421;
pub const ERR_NOMOTD: Reply = 422;
pub const ERR_NONICKNAMEGIVEN: Reply = 431;
pub const ERR_ERRONEUSNICKNAME: Reply = 432;
pub const ERR_NICKNAMEINUSE: Reply = 433;
pub const ERR_NOTONCHANNEL: Reply = 442;
pub const ERR_NOTREGISTERED: Reply = 451;
pub const ERR_NEEDMOREPARAMS: Reply = 461;
