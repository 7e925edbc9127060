//! SVG bounding box calculation.
//!
//! Computes the visual bounds of SVG content including stroke width, used by
//! the `expandViewBox` plugin so strokes at the edges are not clipped once the
//! markup is inlined.

use usvg::{Node, Rect, Tree};

/// Stroke-inclusive bounding box of every node in the tree
///
/// `None` when the tree has no visible nodes.
pub fn calculate_stroke_bounds(tree: &Tree) -> Option<Rect> {
    let mut groups = vec![tree.root()];
    let mut bounds: Option<Rect> = None;

    while let Some(group) = groups.pop() {
        for node in group.children() {
            let rect = node.stroke_bounding_box();
            bounds = match bounds {
                Some(acc) => union(acc, rect),
                None => Some(rect),
            };
            if let Node::Group(nested) = node {
                groups.push(nested);
            }
        }
    }
    bounds
}

fn union(a: Rect, b: Rect) -> Option<Rect> {
    let left = a.left().min(b.left());
    let top = a.top().min(b.top());
    let right = a.right().max(b.right());
    let bottom = a.bottom().max(b.bottom());
    Rect::from_ltrb(left, top, right, bottom)
}

/// Format bounds as a `viewBox` attribute value
pub fn viewbox_value(bounds: Rect) -> String {
    format!(
        "{} {} {} {}",
        bounds.x(),
        bounds.y(),
        bounds.width(),
        bounds.height()
    )
}
