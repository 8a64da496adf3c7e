use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// SEC-001: Strip terminal control characters and ANSI escape sequences from text.
///
/// Feed titles and links are attacker-controlled and printed straight to the
/// terminal, so anything that could move the cursor, recolor output or set
/// the window title is removed.
///
/// Strips:
/// - ASCII control chars other than tab, newline and carriage return, plus DEL
/// - CSI sequences: `ESC [` up to and including the final byte (0x40-0x7E)
/// - OSC sequences: `ESC ]` up to BEL or ST (`ESC \`)
/// - A bare ESC
///
/// Returns `Cow::Borrowed` when nothing needs stripping.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => skip_escape_sequence(&mut chars),
            c if is_stripped(c) => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Consumes the body of an escape sequence whose ESC was just read.
fn skip_escape_sequence(chars: &mut Peekable<Chars<'_>>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\x07' {
                    break;
                }
                if c == '\x1b' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}
