//! Raw header line parsing and serialization.
//!
//! The transport hands us header bytes one line at a time. Each line is either
//! a status line (`HTTP/1.1 200 OK`), a field line (`Name: value`), or noise
//! (the blank terminator, continuation junk) that is ignored.

use crate::http::orderedheaders::HeaderList;

/// A parsed `PROTOCOL/VERSION CODE ...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Normalized as `major.minor`; a bare major gets `.0`.
    pub version: String,
    pub status: u16,
}

/// What a single raw header line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    Status(StatusLine),
    Field { name: &'a str, value: &'a str },
    Ignored,
}

/// Classify one raw header line.
///
/// Status lines are tried first, so a line that happens to look like both is
/// treated as a new response head.
pub fn parse_line(line: &str) -> HeaderLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return HeaderLine::Ignored;
    }
    if let Some(status) = parse_status_line(line) {
        return HeaderLine::Status(status);
    }
    match parse_field_line(line) {
        Some((name, value)) => HeaderLine::Field { name, value },
        None => HeaderLine::Ignored,
    }
}

/// Parse `PROTOCOL/VERSION <ws> CODE [reason]`.
///
/// The protocol token is ASCII letters of any case, the version is `D` or
/// `D.D`, and the code is exactly three digits.
pub fn parse_status_line(line: &str) -> Option<StatusLine> {
    let line = line.trim();
    let (protocol, rest) = line.split_once('/')?;
    if protocol.is_empty() || !protocol.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let version_end = rest
        .find(|c: char| c == ' ' || c == '\t')
        .unwrap_or(rest.len());
    let (version, tail) = rest.split_at(version_end);
    let version = normalize_version(version)?;

    let tail = tail.trim_start_matches([' ', '\t']);
    let code = tail.get(..3)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if tail[3..].chars().next().is_some_and(|c| !c.is_whitespace()) {
        return None;
    }

    Some(StatusLine {
        version,
        status: code.parse().ok()?,
    })
}

fn normalize_version(version: &str) -> Option<String> {
    let bytes = version.as_bytes();
    match bytes {
        [major] if major.is_ascii_digit() => Some(format!("{}.0", *major as char)),
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Some(version.to_string())
        }
        _ => None,
    }
}

/// Parse `Name: value`, returning the name and the trimmed value.
///
/// The name is everything before the first colon and must be a non-empty run
/// of non-whitespace characters. The colon must be followed by whitespace or
/// end the line, so `Name:value` is not a field line.
pub fn parse_field_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (name, value) = line.split_once(':')?;
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }
    if value.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return None;
    }
    Some((name, value.trim()))
}

/// Parse a raw `"Name: value\n..."` block into a header list.
///
/// Lines that are not field lines (status lines included) are skipped.
pub fn parse_header_text(text: &str) -> HeaderList {
    let mut headers = HeaderList::new();
    for line in text.lines() {
        if let Some((name, value)) = parse_field_line(line) {
            headers.append(name, value);
        }
    }
    headers
}

/// Serialize a header list as `Name: value` wire lines, one per value.
pub fn to_wire_lines(headers: &HeaderList) -> Vec<String> {
    headers
        .pairs()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect()
}
