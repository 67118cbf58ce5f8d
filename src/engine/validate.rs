//! Syntax validation for identities and room keys.
//!
//! Both grammars are ASCII-only; folding and validation never consult
//! locale-sensitive rules.

/// `^[A-Za-z][A-Za-z0-9_-]*$`, plus a length cap.
pub(super) fn is_valid_nick(s: &str, max_len: usize) -> bool {
    let b = s.as_bytes();
    !b.is_empty()
        && b.len() <= max_len
        && b[0].is_ascii_alphabetic()
        && b[1..].iter().all(|&c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-')
}

/// `#` followed by a valid identity-shaped name, plus a length cap that
/// includes the leading `#`.
pub(super) fn is_valid_room(s: &str, max_len: usize) -> bool {
    s.len() <= max_len && s.starts_with('#') && is_valid_nick(&s[1..], usize::MAX)
}
