/// The closed set of commands this relay understands, plus whatever the
/// dispatcher needs to report an unrecognized one.
///
/// `PONG` is deliberately not a variant here: this relay never sends an
/// unsolicited `PING` to a client, and an inbound `PONG` is outside the
/// command grammar, so it falls into the same unknown-command path as any
/// other unrecognized token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Nick,
    Ping,
    PrivMsg,
    Join,
    Part,
    Quit,
}

impl Command {
    /// ASCII-fold `token` and match it against the known command set.
    ///
    /// On failure, returns the original (non-folded) token so it can be
    /// echoed back verbatim in an `ERR_UNKNOWNCOMMAND` reply.
    pub fn parse(token: &str) -> Result<Command, &str> {
        if token.eq_ignore_ascii_case("NICK") {
            Ok(Command::Nick)
        } else if token.eq_ignore_ascii_case("PING") {
            Ok(Command::Ping)
        } else if token.eq_ignore_ascii_case("PRIVMSG") {
            Ok(Command::PrivMsg)
        } else if token.eq_ignore_ascii_case("JOIN") {
            Ok(Command::Join)
        } else if token.eq_ignore_ascii_case("PART") {
            Ok(Command::Part)
        } else if token.eq_ignore_ascii_case("QUIT") {
            Ok(Command::Quit)
        } else {
            Err(token)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Nick => "NICK",
            Command::Ping => "PING",
            Command::PrivMsg => "PRIVMSG",
            Command::Join => "JOIN",
            Command::Part => "PART",
            Command::Quit => "QUIT",
        }
    }

    /// Minimum number of parameters this command needs before its handler
    /// runs. Commands whose missing-argument reply depends on exactly
    /// which parameter is absent (`PRIVMSG`) are checked more precisely by
    /// the engine; this just gates dispatch.
    pub fn min_params(self) -> usize {
        match self {
            Command::Nick => 1,
            Command::Ping => 0,
            Command::PrivMsg => 2,
            Command::Join => 1,
            Command::Part => 1,
            Command::Quit => 0,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token accepted by [`Buffer::message`] / [`ReplyBuffer::message`]: a
/// relayed [`Command`] or a raw command string (used when relaying a
/// command this crate's `Command` enum doesn't name, such as `PONG`'s
/// reply form already covered here, kept generic for future commands).
pub trait CommandToken {
    fn token(&self) -> &str;
}

impl CommandToken for Command {
    fn token(&self) -> &str {
        self.as_str()
    }
}

impl CommandToken for &str {
    fn token(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands_case_insensitively() {
        assert_eq!(Command::parse("nick"), Ok(Command::Nick));
        assert_eq!(Command::parse("NICK"), Ok(Command::Nick));
        assert_eq!(Command::parse("NiCk"), Ok(Command::Nick));
        assert_eq!(Command::parse("PRIVMSG"), Ok(Command::PrivMsg));
    }

    #[test]
    fn rejects_unknown_command_preserving_original_case() {
        assert_eq!(Command::parse("Foobar"), Err("Foobar"));
    }
}
