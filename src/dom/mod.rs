//! Owned, mutable HTML tree.
//!
//! # Layout
//!
//! ```text
//! Document
//! ├── prolog            "<!DOCTYPE html>" (verbatim, optional)
//! └── slots: Vec<Slot>  arena, NodeId = index
//!     [0] Root ──► children: [1, 4]
//!     [1] Element <body> ──► parent: 0, children: [2, 3]
//!     ...
//! ```
//!
//! Nodes are addressed by [`NodeId`] and never move, so edits made after a
//! traversal snapshot still land on the right node. Parent links are only
//! used for splicing and detaching.
//!
//! Elements keep their verbatim start tag until an attribute is changed; the
//! serializer writes unmodified markup back exactly as it was read.

mod attrs;
mod parse;
mod serialize;

pub use attrs::{Attr, Quote, StartTag, scan_start_tag};
pub use parse::{parse_document, parse_fragment};

/// Stable node handle within one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// How an element ended in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndTag {
    /// Explicit end tag, kept verbatim (`</div >`).
    Explicit(String),
    /// `<path ... />`
    SelfClosing,
    /// Void element or an element the source never closed.
    Omitted,
}

/// Element node data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source.
    pub tag: String,
    attrs: Vec<Attr>,
    /// Verbatim start tag, dropped once attributes change.
    source: Option<String>,
    close: &'static str,
    pub end: EndTag,
}

impl Element {
    pub fn new(tag: impl Into<String>, attrs: Vec<Attr>) -> Self {
        let tag = tag.into();
        let end = EndTag::Explicit(format!("</{tag}>"));
        Self {
            tag,
            attrs,
            source: None,
            close: ">",
            end,
        }
    }

    /// Element built from a lexed start tag and its verbatim text.
    pub(crate) fn from_start_tag(start: StartTag, source: String, end: EndTag) -> Self {
        Self {
            tag: start.name,
            attrs: start.attrs,
            source: Some(source),
            close: start.close,
            end,
        }
    }

    /// Case-insensitive tag comparison.
    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    #[inline]
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Attribute value; `Some("")` for attributes written without a value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.is_named(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.is_named(name))
    }

    /// Set an attribute value in place, or append it when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.is_named(name)) {
            Some(attr) => {
                if attr.quote == Quote::Unquoted {
                    attr.quote = Quote::Double;
                }
                attr.value = Some(value);
            }
            None => self.attrs.push(Attr::new(name, value)),
        }
        self.source = None;
    }

    /// Append an attribute if no attribute of that name exists.
    pub fn add_attr(&mut self, attr: Attr) -> bool {
        if self.has_attr(&attr.name) {
            return false;
        }
        self.attrs.push(attr);
        self.source = None;
        true
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| !a.is_named(name));
        let removed = self.attrs.len() != before;
        if removed {
            self.source = None;
        }
        removed
    }

    /// Append class names missing from the `class` attribute.
    pub fn add_classes<'a>(&mut self, classes: impl IntoIterator<Item = &'a str>) {
        let mut current: Vec<String> = self
            .get_attr("class")
            .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let before = current.len();
        for class in classes.into_iter().flat_map(str::split_ascii_whitespace) {
            if !current.iter().any(|c| c == class) {
                current.push(class.to_string());
            }
        }
        if current.len() != before {
            self.set_attr("class", current.join(" "));
        }
    }

    /// Whether the element still carries its source start tag unchanged.
    #[inline]
    pub fn is_pristine(&self) -> bool {
        self.source.is_some()
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Element(Element),
    /// Raw text, entities untouched.
    Text(String),
    /// Comment as written, delimiters included.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed HTML tree
#[derive(Debug, Clone)]
pub struct Document {
    prolog: String,
    slots: Vec<Slot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeId = NodeId(0);

    /// Empty document holding only the root.
    pub fn new() -> Self {
        Self {
            prolog: String::new(),
            slots: vec![Slot {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Leading doctype (and the whitespace before it), verbatim.
    #[inline]
    pub fn prolog(&self) -> &str {
        &self.prolog
    }

    pub(crate) fn set_prolog(&mut self, prolog: impl Into<String>) {
        self.prolog = prolog.into();
    }

    /// Whether the root has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots[0].children.is_empty()
    }

    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slots[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.slots[id.0].data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.slots[id.0].data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == Self::ROOT
    }

    /// Element ids of all top-level nodes that are elements.
    pub fn top_elements(&self) -> Vec<NodeId> {
        self.children(Self::ROOT)
            .iter()
            .copied()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// Pre-order snapshot of every node below `id` (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Create a detached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.push(child);
    }

    /// Insert `child` right before `reference` in the reference's parent.
    ///
    /// Returns `false` (and does nothing) when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> bool {
        if child == reference {
            return false;
        }
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        self.detach(child);
        let siblings = &mut self.slots[parent.0].children;
        let Some(index) = siblings.iter().position(|&c| c == reference) else {
            return false;
        };
        siblings.insert(index, child);
        self.slots[child.0].parent = Some(parent);
        true
    }

    /// Remove `id` from its parent. The subtree below it stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Move all nodes of `other` into this arena.
    ///
    /// Returns the ids of `other`'s top-level nodes, detached and in order.
    /// The other document's prolog is discarded.
    pub fn adopt(&mut self, other: Document) -> Vec<NodeId> {
        // other's slot i (i >= 1) becomes offset + i - 1
        let offset = self.slots.len();
        let remap = |id: NodeId| NodeId(offset + id.0 - 1);

        let mut slots = other.slots.into_iter();
        let top: Vec<NodeId> = slots
            .next()
            .map(|root| root.children.into_iter().map(remap).collect())
            .unwrap_or_default();

        for slot in slots {
            self.slots.push(Slot {
                data: slot.data,
                parent: slot.parent.filter(|p| *p != Self::ROOT).map(remap),
                children: slot.children.into_iter().map(remap).collect(),
            });
        }
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(doc: &mut Document, s: &str) -> NodeId {
        doc.create(NodeData::Text(s.to_string()))
    }

    #[test]
    fn test_insert_before_and_detach() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = text(&mut doc, "a");
        let c = text(&mut doc, "c");
        doc.append(root, a);
        doc.append(root, c);

        let b = text(&mut doc, "b");
        assert!(doc.insert_before(c, b));
        assert_eq!(doc.children(root), &[a, b, c]);

        doc.detach(b);
        assert_eq!(doc.children(root), &[a, c]);
        assert_eq!(doc.parent(b), None);
        assert!(!doc.is_attached(b));
        assert!(doc.is_attached(c));
    }

    #[test]
    fn test_insert_before_detached_reference() {
        let mut doc = Document::new();
        let lonely = text(&mut doc, "x");
        let other = text(&mut doc, "y");
        assert!(!doc.insert_before(lonely, other));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.create(NodeData::Element(Element::new("div", vec![])));
        let span = doc.create(NodeData::Element(Element::new("span", vec![])));
        let t1 = text(&mut doc, "1");
        let t2 = text(&mut doc, "2");
        doc.append(root, div);
        doc.append(div, span);
        doc.append(span, t1);
        doc.append(root, t2);

        assert_eq!(doc.descendants(root), vec![div, span, t1, t2]);
        assert_eq!(doc.descendants(span), vec![t1]);
    }

    #[test]
    fn test_adopt_remaps_ids() {
        let mut frag = Document::new();
        let froot = frag.root();
        let svg = frag.create(NodeData::Element(Element::new("svg", vec![])));
        let path = frag.create(NodeData::Element(Element::new("path", vec![])));
        frag.append(froot, svg);
        frag.append(svg, path);

        let mut doc = Document::new();
        let root = doc.root();
        let body = doc.create(NodeData::Element(Element::new("body", vec![])));
        doc.append(root, body);

        let top = doc.adopt(frag);
        assert_eq!(top.len(), 1);
        let new_svg = top[0];
        assert!(doc.element(new_svg).unwrap().is_tag("svg"));
        assert_eq!(doc.parent(new_svg), None);

        let kids = doc.children(new_svg).to_vec();
        assert_eq!(kids.len(), 1);
        assert!(doc.element(kids[0]).unwrap().is_tag("path"));
        assert_eq!(doc.parent(kids[0]), Some(new_svg));
    }

    #[test]
    fn test_set_attr_drops_source() {
        let start = scan_start_tag(r#"<img inline src=a.png>"#).unwrap();
        let mut elem = Element::from_start_tag(
            start,
            r#"<img inline src=a.png>"#.to_string(),
            EndTag::Omitted,
        );
        assert!(elem.is_pristine());
        elem.set_attr("SRC", "data:x");
        assert!(!elem.is_pristine());
        assert_eq!(elem.get_attr("src"), Some("data:x"));
        assert_eq!(elem.attrs()[1].quote, Quote::Double);
        assert_eq!(elem.get_attr("inline"), Some(""));
    }

    #[test]
    fn test_add_classes() {
        let mut elem = Element::new("svg", vec![Attr::new("class", "icon")]);
        elem.add_classes(["icon", "big wide"]);
        assert_eq!(elem.get_attr("class"), Some("icon big wide"));

        let mut bare = Element::new("svg", vec![]);
        bare.add_classes(Vec::<&str>::new());
        assert!(!bare.has_attr("class"));
    }
}
