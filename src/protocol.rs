//! Serial command protocol
//!
//! Line format: byte 0 is a sign character, `@` for sync and `$` for a
//! structured command. For `$` lines the layout is fixed-width:
//!
//! ```text
//! $ KKKKKAAAAA
//! 0 2    7
//! ```
//!
//! five bytes of keyword at offset 2 and five bytes of argument at
//! offset 7, both space-padded. Parsing is total: malformed input never
//! errors, it yields [`Command::Unknown`].

/// Keyword field offset and width
const KEYWORD_OFFSET: usize = 2;
/// Argument field offset
const ARG_OFFSET: usize = 7;
/// Width of both fixed fields
const FIELD_WIDTH: usize = 5;

/// One decoded serial command
///
/// Produced by [`parse`], consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `@` heartbeat, answered in-band
    Sync,
    /// `$ START` - begin the experiment
    Start,
    /// `$ STOP` - end the experiment
    Stop,
    /// `$ ROOT` - promote this node to DAG root
    SetRoot,
    /// `$ DURATnnnnn` - set experiment duration in seconds
    SetDuration(u32),
    /// `$ IP` - report the node's IPv6 address
    QueryIp,
    /// `$ PAREN` - report the preferred parent's address
    QueryParent,
    /// Anything unrecognized; carries the raw line for the echo reply
    Unknown(String),
}

/// Extract a fixed-width field, tolerating lines shorter than the
/// field's end. Returns the field with trailing padding removed.
fn field(line: &str, offset: usize, width: usize) -> Option<&str> {
    if line.len() < offset {
        return None;
    }
    let end = (offset + width).min(line.len());
    // Offsets are byte positions; reject if we'd split a multi-byte
    // character rather than read garbage.
    if !line.is_char_boundary(offset) || !line.is_char_boundary(end) {
        return None;
    }
    Some(line[offset..end].trim_end_matches([' ', '\0']))
}

/// Decode one received line into a [`Command`]
///
/// Total and deterministic: the same bytes always produce the same
/// command, and no input is an error.
pub fn parse(line: &str) -> Command {
    match line.as_bytes().first() {
        Some(b'@') => Command::Sync,
        Some(b'$') => parse_structured(line),
        _ => Command::Unknown(line.to_string()),
    }
}

fn parse_structured(line: &str) -> Command {
    let Some(keyword) = field(line, KEYWORD_OFFSET, FIELD_WIDTH) else {
        return Command::Unknown(line.to_string());
    };
    let arg = field(line, ARG_OFFSET, FIELD_WIDTH).unwrap_or("");

    match keyword {
        "START" => Command::Start,
        "STOP" => Command::Stop,
        "ROOT" => Command::SetRoot,
        // Forgiving parse: a non-numeric argument degrades to 0 rather
        // than rejecting the command.
        "DURAT" => Command::SetDuration(arg.trim().parse().unwrap_or(0)),
        "IP" => Command::QueryIp,
        "PAREN" => Command::QueryParent,
        _ => Command::Unknown(line.to_string()),
    }
}
