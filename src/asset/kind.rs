//! Asset kind definitions.

use std::path::Path;

/// Kind of asset referenced by a candidate's `src`.
///
/// Derived from the file extension only (ASCII case-insensitive);
/// file contents are never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// `.svg`: optimized and spliced into the document.
    Svg,
    /// `.png`: rewritten to a base64 data URI.
    Png,
    /// Anything else: left alone.
    Unsupported,
}

impl AssetKind {
    /// Classify a `src` attribute value.
    pub fn from_src(src: &str) -> Self {
        let ext = Path::new(src)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if ext.eq_ignore_ascii_case("svg") {
            Self::Svg
        } else if ext.eq_ignore_ascii_case("png") {
            Self::Png
        } else {
            Self::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Unsupported => "unsupported",
        }
    }
}
