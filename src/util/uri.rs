use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::ValidationError;

/// Prefix of the tag URI scheme (RFC 4151), accepted for ids without further checks.
const TAG_PREFIX: &str = "tag:";

/// Schemes that require a `//host` authority component.
const NETWORK_SCHEMES: [&str; 5] = ["http", "https", "ftp", "ws", "wss"];

/// Validates that a string is an absolute URI.
///
/// `Url::parse` silently trims surrounding whitespace and percent-encodes
/// inner spaces, so any whitespace or control character is rejected up front
/// to keep the stored value identical to what ends up in the document.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUri`] carrying the offending value if:
/// - The value contains whitespace or control characters
/// - The value is relative or otherwise not parseable as a URL
/// - A hierarchical scheme (`http`, `ftp`, ...) has no host
///
/// # Examples
///
/// ```
/// use atomgen::util::validate_uri;
///
/// let url = validate_uri("ftp://scheme.org").unwrap();
/// assert_eq!(url.scheme(), "ftp");
///
/// assert!(validate_uri("xxx").is_err());
/// assert!(validate_uri("http://").is_err());
/// ```
pub fn validate_uri(value: &str) -> Result<Url, ValidationError> {
    let invalid = || ValidationError::InvalidUri(value.to_owned());

    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid());
    }

    let url = Url::parse(value).map_err(|_| invalid())?;

    // Network schemes always carry an authority; reject `http:foo` style input
    // that the parser would otherwise normalise into `http://foo/`.
    if NETWORK_SCHEMES.contains(&url.scheme()) {
        let after_scheme = &value[url.scheme().len() + 1..];
        if !after_scheme.starts_with("//") || url.host_str().map_or(true, str::is_empty) {
            return Err(invalid());
        }
    }

    Ok(url)
}

/// Validates an Atom id: either a tag URI or an absolute URI.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidId`] when neither form matches.
pub fn validate_id(value: &str) -> Result<(), ValidationError> {
    if value.starts_with(TAG_PREFIX) || validate_uri(value).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::InvalidId(value.to_owned()))
    }
}

/// Validates the syntax of an e-mail address (`local@domain.tld`).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] carrying the offending value.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_REGEX.get_or_init(|| {
        // Dot-atom local part, dotted domain of LDH labels
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .unwrap()
    });

    let local = value.split('@').next().unwrap_or_default();
    if re.is_match(value) && !local.starts_with('.') && !local.ends_with('.') && !local.contains("..") {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.to_owned()))
    }
}
