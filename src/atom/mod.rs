//! The validating Atom 1.0 builder.
//!
//! - [`CommonFields`] - id, title, updated, rights, people, categories, links
//! - [`Entry`] - one item: summary, content, published, source snapshot
//! - [`Feed`] - the document root: metadata, extension elements, entries
//!
//! Setters validate eagerly and return [`ValidationError`](crate::ValidationError).
//! [`Feed::materialize`] builds the markup tree, [`Feed::serialize`] turns it
//! into text and [`Feed::validate`] checks the text against the Atom schema.

mod category;
mod common;
mod entry;
mod feed;
mod link;
mod person;
mod text;

pub use category::Category;
pub use common::{CommonFields, DEFAULT_ID, DEFAULT_TITLE};
pub use entry::{Content, Entry};
pub use feed::{CustomElement, Feed, Generator};
pub use link::{Link, LinkRelPolicy, REGISTERED_RELATIONS};
pub use person::Person;
pub use text::{TextType, TypedText};

/// The Atom namespace (RFC 4287).
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// The XHTML namespace, required for the `div` of xhtml text constructs.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
