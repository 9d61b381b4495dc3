use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// A builder call was given a value (or combination of values) that cannot
/// appear in a valid Atom document.
///
/// Raised eagerly by setters, except for [`ValidationError::MissingContent`]
/// which can only be detected when an entry is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The id is neither a tag URI nor an absolute URI.
    #[error("Expected a value to be a valid URI/tag. Got {0}")]
    InvalidId(String),

    /// A field that must hold an absolute URI does not.
    #[error("Expected a value to be a valid URI. Got {0}")]
    InvalidUri(String),

    /// A person's email address is not syntactically valid.
    #[error("Expected a value to be a valid e-mail address. Got {0}")]
    InvalidEmail(String),

    /// A text construct type other than text, html or xhtml.
    #[error("Expected one of: text, html, xhtml. Got {0}")]
    InvalidTextType(String),

    /// A link relation rejected by the active relation policy.
    #[error("Link relation is not allowed: {0}")]
    InvalidLinkRel(String),

    /// A namespace prefix, element or attribute name that is not a valid XML name.
    #[error("Expected a value to be a valid XML name. Got {0}")]
    InvalidName(String),

    /// An attribute prefix with no namespace declaration in scope.
    #[error("Namespace prefix {prefix} of attribute {name} is not declared")]
    UndeclaredPrefix { prefix: String, name: String },

    /// A language that is not an RFC 3066 language tag.
    #[error("Expected a value to be a valid language tag. Got {0}")]
    InvalidLanguage(String),

    /// A namespace prefix already bound to a different namespace URI.
    #[error("Namespace prefix {prefix} is already bound to {existing}")]
    NamespaceConflict { prefix: String, existing: String },

    /// A `type` was supplied for a text construct that has no value.
    #[error("{0} type cannot be set without a {0} value")]
    TypeWithoutValue(&'static str),

    /// `set_content` was called with an illegal (content, type, src) shape.
    #[error("content must be either inline text or a src reference; got {0}")]
    ContentShape(&'static str),

    /// A source feed snapshot carries entries of its own.
    #[error("Source feed must not contain entries. Got {0}")]
    SourceHasEntries(usize),

    /// Generator uri or version given without a generator name.
    #[error("generator uri and version require a generator name")]
    GeneratorWithoutName,

    /// An entry has neither content nor an alternate link.
    #[error("content must be provided if there is no alternate link.")]
    MissingContent,
}

/// Failure to produce a feed document.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed graph violates a render-time constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A text, CDATA or attribute value holds a character XML 1.0 cannot represent.
    #[error("Cannot serialize character U+{code:04X} in element {element}")]
    InvalidCharacter { code: u32, element: String },

    /// The output buffer rejected a write.
    #[error("Failed to write feed: {0}")]
    Io(#[from] std::io::Error),

    /// The writer produced bytes that are not UTF-8.
    #[error("Serialized feed contains invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
