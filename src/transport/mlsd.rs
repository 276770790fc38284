//! MLSD listing parser (RFC 3659 machine-readable listings)
//!
//! A line is `fact=value;fact=value; name`. Only `type`, `size` and `modify`
//! are used. Entries with an unknown or missing type are reported as files.

use crate::tree::node::{EntryKind, ListedEntry};
use chrono::NaiveDateTime;
use std::time::SystemTime;

/// Parse one MLSD line. Returns `None` for `cdir`/`pdir` entries and
/// unparseable lines.
pub fn parse_line(line: &str) -> Option<ListedEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (facts, name) = line.split_once(' ')?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    let mut kind = EntryKind::File;
    let mut size = 0;
    let mut modified = None;

    for fact in facts.split(';').filter(|f| !f.is_empty()) {
        let Some((key, value)) = fact.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "type" => match value.to_ascii_lowercase().as_str() {
                "dir" => kind = EntryKind::Directory,
                "cdir" | "pdir" => return None,
                _ => kind = EntryKind::File,
            },
            "size" => size = value.parse().unwrap_or(0),
            "modify" => modified = parse_modify(value),
            _ => {}
        }
    }

    Some(ListedEntry {
        name: name.to_string(),
        kind,
        size,
        modified,
    })
}

/// Parse an MLSD `modify` fact (`YYYYMMDDHHMMSS[.sss]`, always UTC).
/// Fractional seconds are dropped.
pub fn parse_modify(value: &str) -> Option<SystemTime> {
    let whole = value.split('.').next()?;
    NaiveDateTime::parse_from_str(whole, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| SystemTime::from(naive.and_utc()))
}
