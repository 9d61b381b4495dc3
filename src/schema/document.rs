use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::SchemaDiagnostic;
use crate::util::find_invalid_xml_char;

/// Namespace bound to the reserved `xml` prefix.
pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An attribute with its namespace resolved. Namespace declarations are not
/// kept as attributes.
#[derive(Debug, Clone)]
pub(crate) struct ParsedAttribute {
    pub namespace: Option<String>,
    pub local: String,
    pub value: String,
}

/// An element of a parsed document, with the position of its start tag.
#[derive(Debug, Clone)]
pub(crate) struct ParsedElement {
    pub namespace: Option<String>,
    pub local: String,
    pub attributes: Vec<ParsedAttribute>,
    pub children: Vec<ParsedElement>,
    /// All character data of this element (text and CDATA), concatenated.
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl ParsedElement {
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Value of an unqualified attribute.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local == local)
            .map(|a| a.value.as_str())
    }
}

/// A namespace binding and the depth of the element that declared it.
struct Binding {
    prefix: Option<String>,
    uri: String,
    depth: usize,
}

struct Scope {
    bindings: Vec<Binding>,
}

impl Scope {
    fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix.as_deref() == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    fn leave(&mut self, depth: usize) {
        self.bindings.retain(|b| b.depth < depth);
    }
}

/// 1-based line and byte column of `offset` in `document`.
pub(crate) fn line_and_column(document: &str, offset: usize) -> (usize, usize) {
    let before = &document.as_bytes()[..offset.min(document.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
    (line, before.len() - line_start + 1)
}

/// Rejects characters outside the XML 1.0 `Char` production, which the
/// reader passes through.
fn check_chars(value: &str, context: &str) -> Result<(), String> {
    match find_invalid_xml_char(value) {
        Some(c) => Err(format!(
            "Document is not well-formed: character U+{:04X} is not allowed in {context}",
            u32::from(c)
        )),
        None => Ok(()),
    }
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Parses `document` into a tree with resolved namespaces.
///
/// # Errors
///
/// Returns a single diagnostic for the first well-formedness or namespace
/// error, positioned where the reader stopped.
pub(crate) fn parse(document: &str) -> Result<ParsedElement, SchemaDiagnostic> {
    let mut reader = Reader::from_str(document);
    let mut scope = Scope::new();
    let mut stack: Vec<ParsedElement> = Vec::new();
    let mut root: Option<ParsedElement> = None;

    let fail = |offset: usize, message: String| {
        let (line, column) = line_and_column(document, offset);
        SchemaDiagnostic {
            line,
            column,
            message,
        }
    };

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            fail(
                reader.buffer_position() as usize,
                format!("Document is not well-formed: {e}"),
            )
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(fail(offset, "Extra content at the end of the document".into()));
                }
                let depth = stack.len() + 1;
                let element = open_element(e, &reader, &mut scope, depth)
                    .map_err(|message| fail(offset, message))?;
                let (line, column) = line_and_column(document, offset);
                let element = ParsedElement {
                    line,
                    column,
                    ..element
                };

                if matches!(event, Event::Start(_)) {
                    stack.push(element);
                } else {
                    scope.leave(depth);
                    attach(element, &mut stack, &mut root);
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                scope.leave(depth);
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root);
                }
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| fail(offset, format!("Document is not well-formed: {err}")))?;
                check_chars(&text, "character data").map_err(|message| fail(offset, message))?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None if !text.trim().is_empty() => {
                        return Err(fail(offset, "Text is not allowed outside the root element".into()))
                    }
                    None => {}
                }
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e);
                check_chars(&text, "a CDATA section").map_err(|message| fail(offset, message))?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None => {
                        return Err(fail(offset, "CDATA is not allowed outside the root element".into()))
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(fail(document.len(), "Premature end of data: unclosed elements".into()));
    }
    root.ok_or_else(|| fail(0, "Document is empty".into()))
}

fn attach(element: ParsedElement, stack: &mut [ParsedElement], root: &mut Option<ParsedElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Reads a start tag: records its namespace declarations in `scope`, then
/// resolves the element and attribute names against it.
fn open_element(
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    scope: &mut Scope,
    depth: usize,
) -> Result<ParsedElement, String> {
    let mut raw_attributes = Vec::new();
    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| format!("Malformed attribute: {e}"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| format!("Malformed attribute value for {key}: {e}"))?
            .into_owned();
        check_chars(&value, &format!("attribute {key}"))?;

        if key == "xmlns" {
            scope.bindings.push(Binding {
                prefix: None,
                uri: value,
                depth,
            });
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.bindings.push(Binding {
                prefix: Some(prefix.to_owned()),
                uri: value,
                depth,
            });
        } else {
            raw_attributes.push((key, value));
        }
    }

    let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let (prefix, local) = split_name(&qname);
    let namespace = match prefix {
        Some(p) => Some(
            scope
                .resolve(Some(p))
                .ok_or_else(|| format!("Namespace prefix {p} on {local} is not defined"))?
                .to_owned(),
        ),
        None => scope.resolve(None).map(str::to_owned),
    };

    let mut attributes = Vec::with_capacity(raw_attributes.len());
    for (key, value) in raw_attributes {
        let (prefix, attr_local) = split_name(&key);
        // Unprefixed attributes are never in a namespace
        let attr_namespace = match prefix {
            Some(p) => Some(
                scope
                    .resolve(Some(p))
                    .ok_or_else(|| format!("Namespace prefix {p} for {attr_local} on {local} is not defined"))?
                    .to_owned(),
            ),
            None => None,
        };
        attributes.push(ParsedAttribute {
            namespace: attr_namespace,
            local: attr_local.to_owned(),
            value,
        });
    }

    Ok(ParsedElement {
        namespace,
        local: local.to_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
        line: 0,
        column: 0,
    })
}
