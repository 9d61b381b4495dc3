use serde::Deserialize;

use crate::error::ValidationError;
use crate::util::{is_ncname, validate_uri};
use crate::xml::Element;

/// Relation names accepted under [`LinkRelPolicy::Strict`].
pub const REGISTERED_RELATIONS: [&str; 6] =
    ["alternate", "enclosure", "related", "self", "via", "payment"];

/// Which `rel` values a link may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkRelPolicy {
    /// Only the [`REGISTERED_RELATIONS`].
    #[default]
    Strict,
    /// Any NCName-like token or absolute URI, as the Atom grammar allows.
    Open,
}

impl LinkRelPolicy {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLinkRel`] if the policy rejects `rel`.
    pub fn check(self, rel: &str) -> Result<(), ValidationError> {
        let allowed = match self {
            LinkRelPolicy::Strict => REGISTERED_RELATIONS.contains(&rel),
            LinkRelPolicy::Open => is_ncname(rel) || validate_uri(rel).is_ok(),
        };
        if allowed {
            Ok(())
        } else {
            Err(ValidationError::InvalidLinkRel(rel.to_owned()))
        }
    }
}

/// An Atom `link`, built fluently and validated by `add_link`.
///
/// ```
/// use atomgen::atom::Link;
///
/// let link = Link::new("http://test.com/alternate_entry")
///     .with_rel("alternate")
///     .with_type("text/html")
///     .with_hreflang("en")
///     .with_length(300);
/// assert!(link.is_alternate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    pub length: Option<u64>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// True only for an explicit `rel="alternate"`.
    pub fn is_alternate(&self) -> bool {
        self.rel.as_deref() == Some("alternate")
    }

    pub(crate) fn validate(&self, policy: LinkRelPolicy) -> Result<(), ValidationError> {
        validate_uri(&self.href)?;
        if let Some(ref rel) = self.rel {
            policy.check(rel)?;
        }
        Ok(())
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = Element::new("link");
        element.set_attribute("href", self.href.as_str());
        let optional = [
            ("rel", self.rel.clone()),
            ("type", self.media_type.clone()),
            ("hreflang", self.hreflang.clone()),
            ("title", self.title.clone()),
            ("length", self.length.map(|l| l.to_string())),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                element.set_attribute(name, value);
            }
        }
        element
    }
}
