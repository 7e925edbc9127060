//! HTML serialization.
//!
//! Pristine elements are written from their verbatim start tag, so a document
//! that was not edited serializes back to its input.

use super::{Document, Element, EndTag, NodeData, NodeId};

impl Document {
    /// Serialize the whole document, prolog first.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.slots.len() * 32 + self.prolog.len());
        out.push_str(&self.prolog);
        self.write_children(self.root(), &mut out);
        out
    }

    /// Serialize a single node and its subtree.
    pub fn node_to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Root => self.write_children(id, out),
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(comment) => {
                if comment.starts_with("<!--") {
                    out.push_str(comment);
                } else {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
            }
            NodeData::Element(elem) => {
                write_start_tag(elem, out);
                self.write_children(id, out);
                if let EndTag::Explicit(end) = &elem.end {
                    out.push_str(end);
                }
            }
        }
    }
}

fn write_start_tag(elem: &Element, out: &mut String) {
    if let Some(source) = &elem.source {
        out.push_str(source);
        return;
    }
    out.push('<');
    out.push_str(&elem.tag);
    for attr in &elem.attrs {
        out.push(' ');
        attr.write_to(out);
    }
    out.push_str(elem.close);
}
