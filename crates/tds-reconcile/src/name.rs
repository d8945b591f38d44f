use std::sync::OnceLock;

use regex::Regex;

use crate::ParsedName;

// `[0-9]` rather than `\d`: the regex crate's `\d` is Unicode-aware.
const NAME_PATTERN: &str = r"^([0-9]{14})(?:\.([0-9A-Fa-f]{32}))?$";

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern is a valid regex"))
}

/// Classify a base name as full `<tds>.<md5>`, legacy `<tds>`, or neither.
pub fn parse_name(base: &str) -> Option<ParsedName> {
    let caps = name_regex().captures(base)?;
    let timestamp = caps.get(1)?.as_str().to_string();
    match caps.get(2) {
        Some(digest) => Some(ParsedName::Full {
            timestamp,
            digest: digest.as_str().to_string(),
        }),
        None => Some(ParsedName::Legacy { timestamp }),
    }
}

/// The name a file with this TDS and content digest must carry.
pub fn canonical_name(timestamp_code: &str, digest: &str) -> String {
    format!("{}.{}", timestamp_code, digest.to_ascii_lowercase())
}
