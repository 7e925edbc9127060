//! Traversal engine.
//!
//! Three phases over one document:
//!
//! 1. **Snapshot**: pre-order walk, one matcher call per element, candidates
//!    recorded by [`NodeId`].
//! 2. **Resolve**: every candidate resolved concurrently on the runtime,
//!    bounded by a semaphore. No task touches the tree.
//! 3. **Apply**: edits applied in document order against the live tree.
//!
//! Replacement nodes are created in phase 3, after the snapshot, so they
//! are never visited in the same pass.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::asset::AssetKind;
use crate::dom::{Document, NodeId};
use crate::error::InlineError;

use super::matcher::{Descriptor, first_match};
use super::report::{InlineReport, Outcome};
use super::transform::{Edit, TransformContext, apply, resolve_bounded};

/// A node that qualified for inlining
#[derive(Debug, Clone)]
struct Candidate {
    node: NodeId,
    src: Option<String>,
    /// Marker of the descriptor that matched.
    marker: String,
}

fn collect_candidates(doc: &Document, descriptors: &[Descriptor]) -> Vec<Candidate> {
    doc.descendants(doc.root())
        .into_iter()
        .filter_map(|node| {
            let descriptor = first_match(doc, node, descriptors)?;
            let src = doc
                .element(node)
                .and_then(|e| e.get_attr("src"))
                .map(str::to_string);
            Some(Candidate {
                node,
                src,
                marker: descriptor.marker.clone(),
            })
        })
        .collect()
}

/// Inline every candidate of `doc` in place
///
/// Never fails: a candidate that cannot be resolved keeps its original
/// markup and shows up in the report as skipped.
pub async fn transform_tree(
    doc: &mut Document,
    descriptors: &[Descriptor],
    ctx: &Arc<TransformContext>,
) -> InlineReport {
    let candidates = collect_candidates(doc, descriptors);
    let mut report = InlineReport::default();
    if candidates.is_empty() {
        return report;
    }
    crate::debug!("inline"; "{} candidate(s)", candidates.len());

    let outcomes = resolve_all(&candidates, ctx).await;

    for (candidate, outcome) in candidates.into_iter().zip(outcomes) {
        let src = candidate.src.unwrap_or_default();
        match outcome {
            Ok(_) if !doc.is_attached(candidate.node) => {
                crate::debug!("inline"; "`{}` is inside a replaced node", src);
                report.push(src, Outcome::Superseded);
            }
            Ok(edit) => {
                let carry = ctx.preserve_attributes.then_some(candidate.marker.as_str());
                apply(doc, candidate.node, edit, carry);
                crate::debug!("inline"; "{} ({})", src, AssetKind::from_src(&src).as_str());
                report.push(src, Outcome::Inlined);
            }
            Err(err) => {
                crate::debug!("inline"; "skipped `{}` ({}): {}", src, err.kind(), err);
                report.push(src, Outcome::Skipped(err));
            }
        }
    }

    report
}

/// Resolve all candidates, results in candidate order
async fn resolve_all(
    candidates: &[Candidate],
    ctx: &Arc<TransformContext>,
) -> Vec<Result<Edit, InlineError>> {
    let permits = Arc::new(Semaphore::new(ctx.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let ctx = Arc::clone(ctx);
        let permits = Arc::clone(&permits);
        let src = candidate.src.clone();

        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => resolve_bounded(src.as_deref(), &ctx).await,
                Err(e) => Err(InlineError::Task(e.to_string())),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<Edit, InlineError>>> =
        std::iter::repeat_with(|| None).take(candidates.len()).collect();
    let mut aborted = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => aborted = Some(e.to_string()),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(InlineError::Task(
                    aborted.clone().unwrap_or_else(|| "task lost".to_string()),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::inline::matcher::DEFAULT_MARKER;

    #[test]
    fn test_collect_candidates_preorder() {
        let doc = parse_document(
            r#"<div><img inline src="a.svg"><p><img inline src="b.png"></p></div><img src="c.svg"><img inline src="d.jpg">"#,
        )
        .unwrap();
        let found = collect_candidates(&doc, &Descriptor::defaults(DEFAULT_MARKER));
        let srcs: Vec<_> = found.iter().filter_map(|c| c.src.as_deref()).collect();
        assert_eq!(srcs, ["a.svg", "b.png"]);
        assert!(found.iter().all(|c| c.marker == DEFAULT_MARKER));
    }

    #[test]
    fn test_collect_candidates_none() {
        let doc = parse_document("<p>plain <b>text</b></p>").unwrap();
        assert!(collect_candidates(&doc, &Descriptor::defaults(DEFAULT_MARKER)).is_empty());
    }
}
