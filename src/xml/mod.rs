//! Minimal markup tree and its serializer.
//!
//! The Atom builder renders into an [`Element`] tree, which [`write_document`]
//! turns into text with `quick-xml`'s [`Writer`](quick_xml::Writer), either
//! indented or compact.

mod node;
mod writer;

pub use node::{Element, Node};
pub use writer::{write_document, WriteOptions};
