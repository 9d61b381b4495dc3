//! Build Atom 1.0 feeds from structured data and check them against the
//! Atom schema.
//!
//! ```
//! use atomgen::{Entry, Feed, TextType};
//!
//! let mut entry = Entry::new();
//! entry.set_title("Post", Some(TextType::Text));
//! entry.set_id("tag:id").unwrap();
//! entry.set_content(Some("Lorem ipsum dolor sit amet."), Some(TextType::Text), None).unwrap();
//!
//! let mut feed = Feed::new();
//! feed.set_title("Blog", None);
//! feed.add_entry(entry);
//!
//! let xml = feed.serialize().unwrap();
//! let report = Feed::validate(&xml);
//! assert!(report.is_valid(), "{report}");
//! ```

pub mod atom;
pub mod config;
pub mod error;
pub mod schema;
pub mod util;
pub mod xml;

pub use atom::{Entry, Feed, Link, LinkRelPolicy, TextType};
pub use config::BuilderConfig;
pub use error::{FeedError, ValidationError};
pub use schema::{SchemaDiagnostic, SchemaReport};
