//! Packet body field extraction
//!
//! Turns one packet body's text into a [`FieldRecord`]. Total function:
//! malformed input degrades to a partial record, it never fails. The passes
//! run in a fixed order:
//!
//! 1. Sanitize: non-printable bytes become spaces, line endings normalize
//! 2. Header pass over the whole text (sequence no., date/time, SID, PID, ID)
//! 3. Line pass: footer directives, token lines, free-text noise
//! 4. ID repair via the resolver when the ID is missing or all zeros
//! 5. Footer directive mapping (packet type, instrument, version, checksum)

use crate::core::identifiers;
use crate::core::record::FieldRecord;
use crate::core::resolver;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").unwrap());
static RE_TOKEN_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\S)\s+(.+)$").unwrap());
static RE_SEQ_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)NO\.[:.\s]*([0-9/]+)").unwrap());
static RE_DATETIME_A: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2}/\d{2}/\d{2,4})\s+(\d{2}h\d{2}mn\d{2}s|\d{2}:\d{2}:\d{2})").unwrap()
});
static RE_DATETIME_B: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}/\d{2}/\d{2})\s+([0-2]?\d:[0-5]\d)").unwrap());
static RE_SID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSID[:.\s]*([0-9A-Za-z-]+)").unwrap());
static RE_PID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPID[:.\s]*([0-9A-Za-z-]+)").unwrap());
static RE_HEADER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:User\s*ID|ID)[:.\s]*([A-Za-z0-9][A-Za-z0-9_-]{1,20})").unwrap()
});
static RE_NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9_-]{1,20}").unwrap());

/// Footer directive keys and the field names they map to
const FOOTER_FIELDS: &[(&str, &str)] = &[
    ("$FF", "PacketType"),
    ("$FB", "InstrumentName"),
    ("$FE", "FormatVersion"),
    ("$FD", "Checksum"),
];

/// Replace everything outside printable ASCII (newline excepted) with a
/// space and normalize line endings
pub fn sanitize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .map(|ch| {
            if ch == '\n' || (' '..='~').contains(&ch) {
                ch
            } else {
                ' '
            }
        })
        .collect()
}

fn is_all_zeros(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'0')
}

/// First numeric literal in the payload, else the first whitespace-delimited
/// word, else empty
fn numeric_or_first_word(payload: &str) -> String {
    if let Some(m) = RE_NUMBER.find(payload) {
        return m.as_str().to_string();
    }
    payload
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Header fields may not align with token lines, so this pass scans the whole
/// normalized text
fn header_pass(text: &str, record: &mut FieldRecord) {
    if let Some(caps) = RE_SEQ_NO.captures(text) {
        record.insert_first("NO.", caps[1].trim());
    }
    if let Some(caps) = RE_DATETIME_A.captures(text) {
        record.insert_first("DATE", caps[1].trim());
        // 10h30mn15s form becomes 10:30:15
        let time = caps[2].replace("mn", ":").replace('h', ":").replace('s', "");
        record.insert_first("TIME", time);
    } else if let Some(caps) = RE_DATETIME_B.captures(text) {
        record.insert_first("DATE", caps[1].trim());
        record.insert_first("TIME", caps[2].trim());
    }
    if let Some(caps) = RE_SID.captures(text) {
        record.insert_first("SID", caps[1].trim());
    }
    if let Some(caps) = RE_PID.captures(text) {
        record.insert_first("PID", caps[1].trim());
    }
    match RE_HEADER_ID.captures(text) {
        Some(caps) if !is_all_zeros(caps[1].trim()) => {
            record.insert_first("ID", caps[1].trim());
        }
        _ => {
            if let Some(id) = resolver::resolve_id(text) {
                record.insert_first("ID", id);
            }
        }
    }
}

/// Parse one packet body into a [`FieldRecord`]
///
/// Pure function of the input text and the identifier map; identical input
/// always yields an identical set of fields.
pub fn extract(text: &str) -> FieldRecord {
    let mut record = FieldRecord::new();
    let cleaned = sanitize(text);
    let mut footer: HashMap<String, String> = HashMap::new();

    header_pass(&cleaned, &mut record);

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('$') {
            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default().trim();
            footer.insert(key.to_string(), value.to_string());
            continue;
        }
        let Some(caps) = RE_TOKEN_LINE.captures(line) else {
            record.push_misc(line);
            continue;
        };
        let token = caps[1].chars().next().unwrap_or(' ');
        let payload = caps[2].trim();

        match identifiers::lookup(token) {
            Some(ident) if ident.label == "ID" => {
                // Prefer an embedded name token over a bare number
                if let Some(m) = RE_NAME_TOKEN.find(payload) {
                    record.set("ID", m.as_str());
                } else {
                    record.set("ID", numeric_or_first_word(payload));
                }
            }
            Some(ident) => {
                let value = numeric_or_first_word(payload);
                let display = match ident.unit {
                    Some(unit) => format!("{value} {unit}"),
                    None => value,
                };
                record.insert_first(ident.label, display);
            }
            None => {
                // Unknown tokens are preserved, never dropped
                record.set(&format!("TOK:{token}"), payload);
            }
        }
    }

    let needs_repair = match record.value("ID") {
        Some(id) => is_all_zeros(id.trim()),
        None => true,
    };
    if needs_repair {
        if let Some(id) = resolver::resolve_id(&cleaned) {
            record.set("ID", id);
        }
    }

    for (key, field) in FOOTER_FIELDS {
        if let Some(value) = footer.get(*key) {
            record.set(field, value.as_str());
        }
    }

    record
}
