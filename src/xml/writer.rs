use std::io::{Cursor, Write};

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::node::{Element, Node};
use crate::error::FeedError;
use crate::util::find_invalid_xml_char;

/// Output formatting for [`write_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Indent nested elements on their own lines.
    pub prettify: bool,
    /// Spaces per nesting level when `prettify` is set.
    pub indent_width: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            prettify: true,
            indent_width: 2,
        }
    }
}

/// Serializes a tree as a UTF-8 XML document.
///
/// The output always starts with `<?xml version="1.0" encoding="utf-8"?>`
/// followed by a newline and ends with a newline. When `prettify` is false no
/// whitespace is injected inside the root element.
///
/// # Errors
///
/// Returns [`FeedError::InvalidCharacter`] if a text, CDATA or attribute
/// value holds a character outside the XML 1.0 `Char` range, or
/// [`FeedError::Io`] if the underlying writer fails.
pub fn write_document(root: &Element, options: WriteOptions) -> Result<String, FeedError> {
    let mut writer = if options.prettify {
        Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent_width)
    } else {
        Writer::new(Cursor::new(Vec::new()))
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    if !options.prettify {
        // The indenting writer breaks the line itself
        writer.get_mut().write_all(b"\n")?;
    }

    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), FeedError> {
    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        ensure_xml_chars(value, element)?;
        start.push_attribute((name, value));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        if let Node::Text(text) | Node::CData(text) | Node::Raw(text) = child {
            ensure_xml_chars(text, element)?;
        }
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::CData(text) => write_cdata(writer, text)?,
            Node::Raw(markup) => {
                writer.write_event(Event::Text(BytesText::from_escaped(markup.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

fn ensure_xml_chars(value: &str, element: &Element) -> Result<(), FeedError> {
    match find_invalid_xml_char(value) {
        Some(c) => Err(FeedError::InvalidCharacter {
            code: u32::from(c),
            element: element.name().to_owned(),
        }),
        None => Ok(()),
    }
}

/// Writes `text` as one or more CDATA sections. A literal `]]>` cannot occur
/// inside a section, so the text is split between `]]` and `>`.
fn write_cdata<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<(), FeedError> {
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        writer.write_event(Event::CData(BytesCData::new(&rest[..pos + 2])))?;
        rest = &rest[pos + 2..];
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;
    Ok(())
}
