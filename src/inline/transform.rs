//! Node transformer.
//!
//! Resolution (file reads, optimization) is async and touches no tree;
//! it produces an [`Edit`] that the traversal engine applies afterwards to
//! the node it was resolved for.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::asset::{AssetKind, png_data_uri, read_bytes, read_text, resolve_path};
use crate::dom::{Attr, Document, NodeId, parse_fragment};
use crate::error::InlineError;
use crate::svg::{OptimizerConfig, SvgOptimizer};

/// Everything a resolution needs, passed explicitly to every call
#[derive(Clone)]
pub struct TransformContext {
    /// Base directory for relative `src` values.
    pub root: PathBuf,
    pub optimizer: Arc<dyn SvgOptimizer>,
    /// Merged plugin set (defaults + overrides).
    pub plugins: Arc<OptimizerConfig>,
    /// Upper bound per asset; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum number of assets resolved at once.
    pub concurrency: usize,
    /// Carry the `<img>` attributes onto the inlined SVG root.
    pub preserve_attributes: bool,
}

impl std::fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("root", &self.root)
            .field("plugins", &self.plugins)
            .field("timeout", &self.timeout)
            .field("concurrency", &self.concurrency)
            .field("preserve_attributes", &self.preserve_attributes)
            .finish_non_exhaustive()
    }
}

/// Tree mutation for one candidate
#[derive(Debug)]
pub enum Edit {
    /// Rewrite the `src` attribute value in place.
    ReplaceSrc(String),
    /// Insert the fragment's top-level nodes before the candidate, then
    /// detach the candidate.
    Splice(Document),
}

/// Resolve the edit for a candidate with the given `src`
pub async fn resolve(src: Option<&str>, ctx: &TransformContext) -> Result<Edit, InlineError> {
    let src = src.ok_or(InlineError::MissingSrc)?;
    let path = resolve_path(&ctx.root, src);

    match AssetKind::from_src(src) {
        AssetKind::Png => {
            let bytes = read_bytes(&path).await?;
            Ok(Edit::ReplaceSrc(png_data_uri(&bytes)))
        }
        AssetKind::Svg => {
            let text = read_text(&path).await?;
            let optimizer = Arc::clone(&ctx.optimizer);
            let plugins = Arc::clone(&ctx.plugins);

            let markup = tokio::task::spawn_blocking(move || optimizer.optimize(&text, &plugins))
                .await
                .map_err(|e| InlineError::Task(e.to_string()))?
                .map_err(|e| InlineError::Optimize {
                    path,
                    message: format!("{e:#}"),
                })?;

            Ok(Edit::Splice(parse_fragment(&markup)))
        }
        AssetKind::Unsupported => Err(InlineError::UnsupportedAssetType(src.to_string())),
    }
}

/// [`resolve`] under the context's timeout
pub async fn resolve_bounded(
    src: Option<&str>,
    ctx: &TransformContext,
) -> Result<Edit, InlineError> {
    let Some(limit) = ctx.timeout else {
        return resolve(src, ctx).await;
    };

    match tokio::time::timeout(limit, resolve(src, ctx)).await {
        Ok(result) => result,
        Err(_) => Err(InlineError::Timeout {
            src: src.unwrap_or_default().to_string(),
            timeout: limit,
        }),
    }
}

/// Apply an edit to `node`
///
/// `carry` names the marker attribute when the candidate's attributes should
/// be merged onto the first element of a spliced fragment.
pub fn apply(doc: &mut Document, node: NodeId, edit: Edit, carry: Option<&str>) {
    match edit {
        Edit::ReplaceSrc(value) => {
            if let Some(elem) = doc.element_mut(node) {
                elem.set_attr("src", value);
            }
        }
        Edit::Splice(fragment) => {
            let carried = carry.and_then(|marker| carried_attrs(doc, node, marker));
            let inserted = doc.adopt(fragment);

            if let Some(attrs) = carried
                && let Some(target) = inserted.iter().copied().find(|&id| doc.element(id).is_some())
                && let Some(elem) = doc.element_mut(target)
            {
                for attr in attrs {
                    if attr.is_named("class") {
                        elem.add_classes(attr.value.as_deref().into_iter());
                    } else {
                        elem.add_attr(attr);
                    }
                }
            }

            for id in inserted {
                doc.insert_before(node, id);
            }
            doc.detach(node);
        }
    }
}

/// Candidate attributes worth keeping on the replacement
fn carried_attrs(doc: &Document, node: NodeId, marker: &str) -> Option<Vec<Attr>> {
    let elem = doc.element(node)?;
    Some(
        elem.attrs()
            .iter()
            .filter(|a| !a.is_named("src") && !a.is_named(marker))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::svg::UsvgOptimizer;
    use tempfile::TempDir;

    fn context(root: PathBuf) -> TransformContext {
        TransformContext {
            root,
            optimizer: Arc::new(UsvgOptimizer),
            plugins: Arc::new(OptimizerConfig::defaults()),
            timeout: None,
            concurrency: 4,
            preserve_attributes: false,
        }
    }

    fn find_tag(doc: &Document, tag: &str) -> Option<NodeId> {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&id| doc.element(id).is_some_and(|e| e.is_tag(tag)))
    }

    #[tokio::test]
    async fn test_resolve_png() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("photo.PNG"), [0u8, 1, 2, 3]).unwrap();
        let ctx = context(dir.path().to_path_buf());

        let edit = resolve(Some("photo.PNG"), &ctx).await.unwrap();
        assert!(matches!(edit, Edit::ReplaceSrc(ref v) if v == "data:image/png;base64,AAECAw=="));
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path().to_path_buf());

        let err = resolve(None, &ctx).await.unwrap_err();
        assert!(matches!(err, InlineError::MissingSrc));

        let err = resolve(Some("photo.jpg"), &ctx).await.unwrap_err();
        assert!(matches!(err, InlineError::UnsupportedAssetType(ref s) if s == "photo.jpg"));

        let err = resolve(Some("missing.svg"), &ctx).await.unwrap_err();
        assert!(matches!(err, InlineError::Io { .. }));

        std::fs::write(dir.path().join("broken.svg"), "<svg").unwrap();
        let err = resolve(Some("broken.svg"), &ctx).await.unwrap_err();
        assert!(matches!(err, InlineError::Optimize { .. }));
    }

    #[tokio::test]
    async fn test_resolve_svg_splices_fragment() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("icon.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 2 2"><rect width="2" height="2"/></svg>"#,
        )
        .unwrap();
        let ctx = context(dir.path().to_path_buf());

        let Edit::Splice(fragment) = resolve(Some("icon.svg"), &ctx).await.unwrap() else {
            panic!("expected splice");
        };
        assert!(find_tag(&fragment, "svg").is_some());
        assert!(find_tag(&fragment, "path").is_some());
    }

    #[test]
    fn test_apply_replace_src_keeps_other_attrs() {
        let mut doc = parse_document(r#"<img inline src="a.png" alt="A">"#).unwrap();
        let img = find_tag(&doc, "img").unwrap();
        apply(&mut doc, img, Edit::ReplaceSrc("data:x".into()), None);
        assert_eq!(doc.to_html(), r#"<img inline src="data:x" alt="A">"#);
    }

    #[test]
    fn test_apply_splice_in_place() {
        let mut doc = parse_document(r#"<p>a<img inline src="i.svg" class="x">b</p>"#).unwrap();
        let img = find_tag(&doc, "img").unwrap();
        let fragment = parse_fragment("<svg><g/></svg><!-- two -->");
        apply(&mut doc, img, Edit::Splice(fragment), None);
        assert_eq!(doc.to_html(), "<p>a<svg><g/></svg><!-- two -->b</p>");
        assert!(!doc.is_attached(img));
    }

    #[test]
    fn test_apply_empty_splice_removes_node() {
        let mut doc = parse_document(r#"<p>a<img inline src="i.svg">b</p>"#).unwrap();
        let img = find_tag(&doc, "img").unwrap();
        apply(&mut doc, img, Edit::Splice(Document::new()), None);
        assert_eq!(doc.to_html(), "<p>ab</p>");
    }

    #[test]
    fn test_apply_splice_carries_attributes() {
        let mut doc =
            parse_document(r#"<img inline src="i.svg" class="x" id="logo" width="9">"#).unwrap();
        let img = find_tag(&doc, "img").unwrap();
        let fragment = parse_fragment(r#"<svg class="icon" width="2"></svg>"#);
        apply(&mut doc, img, Edit::Splice(fragment), Some("inline"));

        let svg = doc.element(find_tag(&doc, "svg").unwrap()).unwrap();
        assert_eq!(svg.get_attr("class"), Some("icon x"));
        assert_eq!(svg.get_attr("id"), Some("logo"));
        assert_eq!(svg.get_attr("width"), Some("2"));
        assert!(!svg.has_attr("src"));
        assert!(!svg.has_attr("inline"));
    }
}
