//! Syntax checks shared by the builder and the schema checker.
//!
//! - **URIs**: absolute URI, tag URI and e-mail address checks used by setters
//! - **Tokens**: media type, language tag and NCName patterns from RFC 4287,
//!   and the XML 1.0 character range
//!
//! # Examples
//!
//! ```
//! use atomgen::util::{validate_id, validate_uri};
//!
//! assert!(validate_uri("http://example.com/feed?a=b&c=d").is_ok());
//! assert!(validate_id("tag:example.com,2019:feed").is_ok());
//! assert!(validate_uri("not a uri").is_err());
//! ```

mod syntax;
mod uri;

pub use syntax::{find_invalid_xml_char, is_language_tag, is_media_type, is_ncname, is_xml_char};
pub use uri::{validate_email, validate_id, validate_uri};
