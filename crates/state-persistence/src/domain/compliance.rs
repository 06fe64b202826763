//! # Data Classification & Compliance
//!
//! Default policy for children's educational data: free-text fields must not
//! carry personal identifiers and the session id must be anonymous.
//!
//! ## Detected Patterns
//!
//! | Kind | Rule |
//! |------|------|
//! | Email | `local@domain.tld` token |
//! | IP address | four dot-separated octets |
//! | National id | digit group with exactly 9 digits |
//! | Phone | digit group with 10-11 digits |
//! | Payment card | digit group with 13-19 digits |
//! | Student id | `student` followed by at least 4 digits |
//!
//! A digit group is a run of digits joined by `-`, space, `.`, `(`, `)` or `+`.

use crate::ports::outbound::CompliancePolicy;
use serde_json::Value;
use shared_types::ApplicationState;
use std::fmt;

/// Replacement for redacted matches.
pub const REDACTED: &str = "[REDACTED]";

const SESSION_ID_FIELD: &str = "sessionId";
const IDENTIFYING_MARKERS: [&str; 3] = ["user", "student", "name"];

/// Kind of personal data detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    Email,
    IpAddress,
    NationalId,
    Phone,
    PaymentCard,
    StudentId,
}

impl PiiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiKind::Email => "email",
            PiiKind::IpAddress => "ip_address",
            PiiKind::NationalId => "national_id",
            PiiKind::Phone => "phone",
            PiiKind::PaymentCard => "payment_card",
            PiiKind::StudentId => "student_id",
        }
    }
}

/// A single compliance violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Personal data found at a field path.
    PersonalData { kind: PiiKind, path: String },
    /// Session id shorter than the anonymity minimum.
    SessionIdTooShort { len: usize, min: usize },
    /// Session id contains an identifying marker.
    IdentifyingSessionId,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::PersonalData { kind, path } => {
                write!(f, "{} detected at {}", kind.as_str(), path)
            }
            Violation::SessionIdTooShort { len, min } => {
                write!(f, "session id of {} chars is shorter than {}", len, min)
            }
            Violation::IdentifyingSessionId => write!(f, "session id contains identifying data"),
        }
    }
}

/// Outcome of assessing a candidate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceReport {
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations rendered for warnings and errors.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Default policy for children's data.
#[derive(Debug, Clone)]
pub struct ChildDataPolicy {
    min_session_id_len: usize,
}

impl ChildDataPolicy {
    pub fn new(min_session_id_len: usize) -> Self {
        Self { min_session_id_len }
    }

    /// Full assessment of a candidate state.
    pub fn assess(&self, state: &ApplicationState) -> ComplianceReport {
        let mut report = ComplianceReport::default();

        let session_id = &state.session_info.session_id;
        if session_id.chars().count() < self.min_session_id_len {
            report.violations.push(Violation::SessionIdTooShort {
                len: session_id.chars().count(),
                min: self.min_session_id_len,
            });
        }
        if is_identifying_session_id(session_id) {
            report.violations.push(Violation::IdentifyingSessionId);
        }

        if let Ok(value) = serde_json::to_value(state) {
            scan_value(&value, "", &mut |path, text| {
                for kind in detect(text) {
                    report.violations.push(Violation::PersonalData {
                        kind,
                        path: path.to_string(),
                    });
                }
            });
        }

        report
    }
}

impl Default for ChildDataPolicy {
    fn default() -> Self {
        Self::new(crate::domain::config::DEFAULT_MIN_SESSION_ID_LEN)
    }
}

impl CompliancePolicy for ChildDataPolicy {
    fn is_compliant(&self, state: &ApplicationState) -> bool {
        self.assess(state).is_compliant()
    }

    fn violations(&self, state: &ApplicationState) -> Vec<String> {
        self.assess(state).messages()
    }

    fn sanitize(&self, state: ApplicationState) -> ApplicationState {
        let Ok(mut value) = serde_json::to_value(&state) else {
            return state;
        };
        redact_value(&mut value, None);
        serde_json::from_value(value).unwrap_or(state)
    }
}

fn is_identifying_session_id(session_id: &str) -> bool {
    let lower = session_id.to_ascii_lowercase();
    if IDENTIFYING_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    // `id` followed by 1-6 trailing digits, e.g. "id42".
    let digits = lower.bytes().rev().take_while(u8::is_ascii_digit).count();
    (1..=6).contains(&digits) && lower[..lower.len() - digits].ends_with("id")
}

fn scan_value(value: &Value, path: &str, visit: &mut dyn FnMut(&str, &str)) {
    match value {
        Value::String(text) => visit(path, text),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                scan_value(item, &format!("{path}[{i}]"), visit);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if key == SESSION_ID_FIELD {
                    continue;
                }
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                scan_value(item, &child, visit);
            }
        }
        _ => {}
    }
}

fn redact_value(value: &mut Value, key: Option<&str>) {
    match value {
        Value::String(text) if key != Some(SESSION_ID_FIELD) => {
            if let Some(redacted) = redact(text) {
                *text = redacted;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| redact_value(item, None)),
        Value::Object(map) => {
            for (k, item) in map.iter_mut() {
                redact_value(item, Some(k.as_str()));
            }
        }
        _ => {}
    }
}

// =============================================================================
// PATTERN DETECTION
// =============================================================================

/// Byte span of a match within a string.
type Span = (usize, usize, PiiKind);

/// All personal-data kinds found in a text.
pub fn detect(text: &str) -> Vec<PiiKind> {
    let mut kinds: Vec<PiiKind> = find_spans(text).into_iter().map(|(_, _, k)| k).collect();
    kinds.dedup();
    kinds
}

/// Redact every match; `None` if nothing matched.
pub fn redact(text: &str) -> Option<String> {
    let mut spans = find_spans(text);
    if spans.is_empty() {
        return None;
    }
    spans.sort_by_key(|(start, _, _)| *start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, _) in spans {
        if start < cursor {
            cursor = cursor.max(end);
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(REDACTED);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

fn find_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    spans.extend(email_spans(text));
    spans.extend(student_id_spans(text));
    spans.extend(digit_group_spans(text));
    spans
}

fn email_spans(text: &str) -> Vec<Span> {
    let is_local = |c: char| c.is_ascii_alphanumeric() || "._%+-".contains(c);
    let is_domain = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-';

    let mut spans = Vec::new();
    for (at, _) in text.match_indices('@') {
        let start = text[..at]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_local(*c))
            .last()
            .map(|(i, _)| i);
        let end = at
            + 1
            + text[at + 1..]
                .char_indices()
                .take_while(|(_, c)| is_domain(*c))
                .map(|(i, c)| i + c.len_utf8())
                .last()
                .unwrap_or(0);

        let Some(start) = start else { continue };
        let domain = text[at + 1..end].trim_end_matches('.');
        let tld_ok = domain
            .rsplit_once('.')
            .map(|(host, tld)| !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or(false);
        if tld_ok {
            spans.push((start, at + 1 + domain.len(), PiiKind::Email));
        }
    }
    spans
}

fn student_id_spans(text: &str) -> Vec<Span> {
    let lower = text.to_ascii_lowercase();
    let mut spans = Vec::new();
    for (start, marker) in lower.match_indices("student") {
        let rest = &lower[start + marker.len()..];
        let skipped = rest
            .bytes()
            .take_while(|b| matches!(b, b' ' | b'_' | b'-' | b':' | b'#' | b'i' | b'd'))
            .count();
        let digits = rest[skipped..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits >= 4 {
            spans.push((start, start + marker.len() + skipped + digits, PiiKind::StudentId));
        }
    }
    spans
}

fn digit_group_spans(text: &str) -> Vec<Span> {
    let bytes = text.as_bytes();
    let joiner = |b: u8| matches!(b, b'-' | b' ' | b'.' | b'(' | b')' | b'+');

    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        // Calendar dates ("2025-07-16") are not identifiers.
        if is_iso_date(&bytes[i..]) {
            i += 10;
            continue;
        }
        // Opening "+" or "(" belongs to the group.
        let mut start = i;
        while start > 0 && matches!(bytes[start - 1], b'+' | b'(') {
            start -= 1;
        }
        let mut end = i;
        let mut last_digit = i;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || joiner(bytes[end])) {
            if bytes[end].is_ascii_digit() {
                last_digit = end;
            }
            end += 1;
        }
        let group = &text[start..=last_digit];
        let digit_count = group.bytes().filter(u8::is_ascii_digit).count();

        let kind = if is_ipv4(group) {
            Some(PiiKind::IpAddress)
        } else {
            match digit_count {
                9 => Some(PiiKind::NationalId),
                10 | 11 => Some(PiiKind::Phone),
                13..=19 => Some(PiiKind::PaymentCard),
                _ => None,
            }
        };
        if let Some(kind) = kind {
            spans.push((start, last_digit + 1, kind));
        }
        i = last_digit + 1;
    }
    spans
}

fn is_iso_date(bytes: &[u8]) -> bool {
    bytes.len() >= 10
        && bytes[..10].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
        && !bytes.get(10).is_some_and(u8::is_ascii_digit)
}

fn is_ipv4(group: &str) -> bool {
    let octets: Vec<&str> = group.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            !o.is_empty()
                && o.len() <= 3
                && o.bytes().all(|b| b.is_ascii_digit())
                && o.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
        })
}
