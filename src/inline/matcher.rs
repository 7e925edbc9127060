//! Candidate predicate.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, Element, NodeId};

/// Default marker attribute name.
pub const DEFAULT_MARKER: &str = "inline";

static SVG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.svg$").unwrap());
static PNG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.png$").unwrap());

/// Which elements are inlining candidates
///
/// An element qualifies when its tag equals `tag`, it carries the `marker`
/// attribute (value ignored) and its `src` value matches `src`.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub tag: String,
    pub marker: String,
    pub src: Regex,
}

impl Descriptor {
    /// Descriptor with a user supplied `src` pattern.
    pub fn new(
        tag: impl Into<String>,
        marker: impl Into<String>,
        src_pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            tag: tag.into(),
            marker: marker.into(),
            src: Regex::new(src_pattern)?,
        })
    }

    /// `<img marker src="*.svg">` and `<img marker src="*.png">`, in that order.
    pub fn defaults(marker: &str) -> Vec<Self> {
        [&SVG_SUFFIX, &PNG_SUFFIX]
            .into_iter()
            .map(|pattern| Self {
                tag: "img".into(),
                marker: marker.into(),
                src: Regex::clone(pattern),
            })
            .collect()
    }

    /// Element-level predicate.
    pub fn matches_element(&self, elem: &Element) -> bool {
        elem.is_tag(&self.tag)
            && elem.has_attr(&self.marker)
            && elem.get_attr("src").is_some_and(|src| self.src.is_match(src))
    }
}

/// Whether `node` qualifies for `descriptor`. Non-element nodes never do.
pub fn matches(doc: &Document, node: NodeId, descriptor: &Descriptor) -> bool {
    doc.element(node)
        .is_some_and(|elem| descriptor.matches_element(elem))
}

/// First descriptor `node` qualifies for.
pub fn first_match<'d>(
    doc: &Document,
    node: NodeId,
    descriptors: &'d [Descriptor],
) -> Option<&'d Descriptor> {
    let elem = doc.element(node)?;
    descriptors.iter().find(|d| d.matches_element(elem))
}
