//! Parse and build lines of the relay's wire format.
//!
//! This crate is the Line Codec: it tokenizes inbound octet lines into a
//! `Message` (optional source prefix, command, argument vector with an
//! optional trailing parameter) and serializes outbound messages through
//! `Buffer`/`ReplyBuffer`, capping each line at 512 octets including the
//! terminator.

pub use buffers::{Buffer, MessageBuffer, ReplyBuffer};
pub use command::{Command, CommandToken};
pub use message::{Message, MESSAGE_LENGTH, PARAMS_LENGTH};

mod buffers;
mod command;
mod message;
pub mod rpl;

/// Assert the shape of a parsed message in tests.
///
/// Empty elements in `params` will not be asserted with their equivalent in `msg.params`, but will
/// still count for the assertion of the number of parameters.
pub fn assert_msg(msg: &Message<'_>, prefix: Option<&str>, command: Result<Command, &str>,
                  params: &[&str])
{
    assert_eq!(msg.prefix, prefix, "prefix of {:?}", msg);
    assert_eq!(msg.command, command, "command of {:?}", msg);
    assert_eq!(msg.num_params, params.len(), "number of parameters of {:?}", msg);
    for (i, (actual, expected)) in msg.params[..msg.num_params].iter().zip(params.iter()).enumerate() {
        if expected.is_empty() {
            continue;
        }
        assert_eq!(actual, expected, "parameter #{} of {:?}", i, msg);
    }
}
