use crate::command::Command;

/// Maximum octets of a serialized line, CR LF included.
pub const MESSAGE_LENGTH: usize = 512;

/// Maximum number of parameters kept per message. Comfortably above what
/// any command in this relay's grammar needs; extra tokens beyond this are
/// dropped rather than overflowing the fixed-size array.
pub const PARAMS_LENGTH: usize = 15;

/// A parsed inbound line.
///
/// `command` is `Err(token)` for anything outside the closed command set,
/// with `token` kept in its original (non-folded) casing so it can be
/// echoed back to the client.
#[derive(Debug)]
pub struct Message<'a> {
    pub prefix: Option<&'a str>,
    pub command: Result<Command, &'a str>,
    pub params: [&'a str; PARAMS_LENGTH],
    pub num_params: usize,
}

impl<'a> Message<'a> {
    /// Parse one line, as delivered by the Connection Driver after it has
    /// already split the byte stream on CR LF. `line` must not include the
    /// terminator, though a trailing `\r` is tolerated and stripped.
    ///
    /// Returns `None` for empty lines and lines containing only whitespace
    /// (per the wire framing rule: these are ignored, not errors).
    pub fn parse(line: &'a str) -> Option<Message<'a>> {
        let line = line.trim_end_matches(['\r', '\n'].as_ref());
        let line = line.trim_matches(' ');
        if line.is_empty() {
            return None;
        }

        let mut rest = line;
        let mut prefix = None;
        if let Some(after_colon) = rest.strip_prefix(':') {
            let (p, r) = split_first_word(after_colon);
            prefix = Some(p);
            rest = r;
        }

        let (head, rest) = split_first_word(rest.trim_start_matches(' '));
        if head.is_empty() {
            return None;
        }
        let command = Command::parse(head);

        let mut params = [""; PARAMS_LENGTH];
        let mut num_params = 0;
        let mut rest = rest;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                if num_params < PARAMS_LENGTH {
                    params[num_params] = trailing;
                    num_params += 1;
                }
                break;
            }
            let (token, r) = split_first_word(rest);
            rest = r;
            if token.is_empty() {
                continue;
            }
            if num_params < PARAMS_LENGTH {
                params[num_params] = token;
                num_params += 1;
            }
        }

        Some(Message { prefix, command, params, num_params })
    }

    /// Whether enough parameters were given to run this command's handler
    /// at all. Commands that need a finer-grained check (e.g. `PRIVMSG`
    /// distinguishing a missing target from missing text) do that
    /// themselves in the dispatcher.
    pub fn has_enough_params(&self) -> bool {
        match self.command {
            Ok(cmd) => self.num_params >= cmd.min_params(),
            Err(_) => true,
        }
    }
}

fn split_first_word(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_command() {
        let msg = Message::parse("NICK alice\r\n").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, Ok(Command::Nick));
        assert_eq!(msg.num_params, 1);
        assert_eq!(msg.params[0], "alice");
    }

    #[test]
    fn parses_trailing_param_with_spaces() {
        let msg = Message::parse("PRIVMSG #chan :hello there world").unwrap();
        assert_eq!(msg.command, Ok(Command::PrivMsg));
        assert_eq!(msg.num_params, 2);
        assert_eq!(msg.params[0], "#chan");
        assert_eq!(msg.params[1], "hello there world");
    }

    #[test]
    fn ignores_leading_source_prefix() {
        let msg = Message::parse(":ignored-by-server NICK bob").unwrap();
        assert_eq!(msg.prefix, Some("ignored-by-server"));
        assert_eq!(msg.command, Ok(Command::Nick));
        assert_eq!(msg.params[0], "bob");
    }

    #[test]
    fn collapses_extra_spaces_and_drops_empty_tokens() {
        let msg = Message::parse("JOIN   #a,#b").unwrap();
        assert_eq!(msg.num_params, 1);
        assert_eq!(msg.params[0], "#a,#b");
    }

    #[test]
    fn empty_and_whitespace_only_lines_are_none() {
        assert!(Message::parse("").is_none());
        assert!(Message::parse("   ").is_none());
        assert!(Message::parse("\r\n").is_none());
    }

    #[test]
    fn unknown_command_keeps_original_casing() {
        let msg = Message::parse("FooBar baz").unwrap();
        assert_eq!(msg.command, Err("FooBar"));
    }

    #[test]
    fn has_enough_params_gates_on_command_minimum() {
        let ping = Message::parse("PING").unwrap();
        assert!(ping.has_enough_params());

        let privmsg = Message::parse("PRIVMSG alice").unwrap();
        assert!(!privmsg.has_enough_params());
    }
}
