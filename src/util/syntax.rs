use std::sync::OnceLock;

use regex::Regex;

/// Matches `atomMediaType` from RFC 4287: `.+/.+`.
pub fn is_media_type(value: &str) -> bool {
    static MEDIA_TYPE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = MEDIA_TYPE_REGEX.get_or_init(|| Regex::new(r"^.+/.+$").unwrap());
    re.is_match(value)
}

/// Matches `atomLanguageTag` from RFC 4287: `[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*`.
pub fn is_language_tag(value: &str) -> bool {
    static LANGUAGE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = LANGUAGE_TAG_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").unwrap());
    re.is_match(value)
}

/// Matches a non-colonized XML name (ASCII subset), used for link relations.
pub fn is_ncname(value: &str) -> bool {
    static NCNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = NCNAME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9._-]*$").unwrap());
    re.is_match(value)
}

/// The XML 1.0 `Char` production.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// First character of `value` outside the XML 1.0 `Char` production.
pub fn find_invalid_xml_char(value: &str) -> Option<char> {
    value.chars().find(|&c| !is_xml_char(c))
}
