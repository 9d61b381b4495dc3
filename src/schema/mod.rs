//! Validation of serialized documents against the Atom schema (RFC 4287).
//!
//! The document is parsed with quick-xml into a namespace-resolved tree
//! (see `document`), then walked by the grammar checker in `rules`.
//! Validation never fails: malformed input is reported as a diagnostic.
//!
//! # Example
//!
//! ```
//! let report = atomgen::schema::validate("<feed xmlns=\"http://www.w3.org/2005/Atom\"/>");
//! assert!(!report.is_valid());
//! assert_eq!(report.diagnostics()[0].line, 1);
//! ```

mod document;
mod rules;

use std::fmt;

use serde::Serialize;

/// One schema violation, positioned at the start tag of the offending
/// element (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SchemaDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Outcome of [`validate`]: validity plus diagnostics in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub diagnostics: Vec<SchemaDiagnostic>,
}

impl SchemaReport {
    fn from_diagnostics(mut diagnostics: Vec<SchemaDiagnostic>) -> Self {
        diagnostics.sort_by_key(|d| (d.line, d.column));
        Self {
            valid: diagnostics.is_empty(),
            diagnostics,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn diagnostics(&self) -> &[SchemaDiagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "valid");
        }
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// Checks `document` against the Atom grammar.
pub fn validate(document: &str) -> SchemaReport {
    let root = match document::parse(document) {
        Ok(root) => root,
        Err(diagnostic) => {
            tracing::debug!(message = %diagnostic.message, "Document could not be parsed");
            return SchemaReport::from_diagnostics(vec![diagnostic]);
        }
    };

    let mut checker = rules::Checker::default();
    checker.check_document(&root);
    let report = SchemaReport::from_diagnostics(checker.into_diagnostics());

    tracing::debug!(
        valid = report.valid,
        diagnostics = report.diagnostics.len(),
        "Schema validation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:sy="http://purl.org/rss/1.0/modules/syndication">
  <id>http://example.com/</id>
  <title type="text">Example, Inc.</title>
  <updated>2019-05-04T20:00:40+00:00</updated>
  <link href="http://example.com/feed" rel="self"/>
  <author>
    <name>John Doe</name>
    <email>john@example.com</email>
  </author>
  <sy:updatePeriod>hourly</sy:updatePeriod>
  <entry>
    <id>tag:entry-1</id>
    <title>Post</title>
    <updated>2019-05-04T20:00:40Z</updated>
    <content type="html"><![CDATA[<p>Hi</p>]]></content>
  </entry>
</feed>
"#;

    fn messages(document: &str) -> Vec<String> {
        validate(document)
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_valid_document() {
        let report = validate(VALID);
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.to_string(), "valid");
    }

    #[test]
    fn test_xhtml_title_as_cdata_rejected() {
        let doc = VALID.replace(
            r#"<title type="text">Example, Inc.</title>"#,
            r#"<title type="xhtml"><![CDATA[<div>Example</div>]]></title>"#,
        );
        let report = validate(&doc);
        assert!(!report.is_valid());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 4);
        assert!(report.diagnostics[0].message.contains("xhtml:div"));
    }

    #[test]
    fn test_xhtml_title_with_div_accepted() {
        let doc = VALID.replace(
            r#"<title type="text">Example, Inc.</title>"#,
            r#"<title type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Example</div></title>"#,
        );
        assert!(validate(&doc).is_valid());
    }

    #[test]
    fn test_missing_id() {
        let doc = VALID.replace("  <id>http://example.com/</id>\n", "");
        assert_eq!(messages(&doc), vec!["Expecting element id in feed, got nothing"]);
    }

    #[test]
    fn test_duplicate_title() {
        let doc = VALID.replace("<title>Post</title>", "<title>Post</title><title>Again</title>");
        assert_eq!(messages(&doc), vec!["Element entry has more than one title"]);
    }

    #[test]
    fn test_metadata_after_entries() {
        let doc = VALID.replace(
            "</entry>\n</feed>",
            "</entry>\n<sy:updateFrequency>1</sy:updateFrequency>\n</feed>",
        );
        let report = validate(&doc);
        assert!(!report.is_valid());
        assert!(report.diagnostics[0].message.contains("after entries"));
    }

    #[test]
    fn test_bad_date() {
        let doc = VALID.replace("2019-05-04T20:00:40Z", "May 4th");
        assert_eq!(messages(&doc), vec!["Invalid date-time May 4th in element updated"]);
    }

    #[test]
    fn test_unknown_atom_element() {
        let doc = VALID.replace("<title>Post</title>", "<title>Post</title><mood>happy</mood>");
        assert_eq!(messages(&doc), vec!["Element mood is not allowed in entry"]);
    }

    #[test]
    fn test_unknown_attribute() {
        let doc = VALID.replace("<title>Post</title>", r#"<title lang="en">Post</title>"#);
        assert_eq!(messages(&doc), vec!["Invalid attribute lang for element title"]);
    }

    #[test]
    fn test_person_requires_name() {
        let doc = VALID.replace("    <name>John Doe</name>\n", "");
        assert_eq!(messages(&doc), vec!["Expecting element name in author, got nothing"]);
    }

    #[test]
    fn test_content_with_src_must_be_empty() {
        let doc = VALID.replace(
            r#"<content type="html"><![CDATA[<p>Hi</p>]]></content>"#,
            r#"<content src="http://example.com/a" type="html">x</content>"#,
        );
        let found = messages(&doc);
        assert_eq!(found.len(), 2);
        assert!(found[0].contains("must be empty"));
        assert!(found[1].contains("Invalid value html"));
    }

    #[test]
    fn test_wrong_root() {
        let report = validate("<rss version=\"2.0\"/>");
        assert!(!report.is_valid());
        assert!(report.diagnostics[0].message.starts_with("Expecting element feed"));
    }

    #[test]
    fn test_malformed_document() {
        let report = validate("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n<id>x</feed>");
        assert!(!report.is_valid());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].message.contains("not well-formed"));
    }

    #[test]
    fn test_diagnostics_in_document_order() {
        let doc = VALID
            .replace("  <id>http://example.com/</id>\n", "")
            .replace("2019-05-04T20:00:40Z", "soon");
        let report = validate(&doc);
        let lines: Vec<usize> = report.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 14]);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = validate("<rss/>");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["diagnostics"][0]["line"], 1);
    }
}
