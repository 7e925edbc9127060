//! Build a [`Document`] from HTML text using `tl`.
//!
//! `tl` supplies the tree shape. Every node it returns borrows from the
//! input, so the builder walks it with a cursor that only moves forward.
//! Text `tl` skips between siblings (stray end tags, for instance) is kept
//! as a text node, and an element's end tag is whatever follows its last
//! child. Serializing an unedited document therefore reproduces the input
//! exactly.
//!
//! Raw-text elements (`<script>`, `<textarea>`, ...) keep their content as
//! one text node. A bare `<` in text stays text, and the markup after it is
//! parsed again.

use crate::error::InlineError;

use super::{Document, Element, EndTag, NodeData, NodeId, scan_start_tag};

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Nesting limit for re-parsing text that hides markup.
const MAX_RESCAN_DEPTH: usize = 64;

/// Parse a complete HTML document
///
/// A leading `<!DOCTYPE ...>` is split off into the document prolog, since
/// `tl` does not keep it as a node.
pub fn parse_document(html: &str) -> Result<Document, InlineError> {
    let (prolog, body) = split_prolog(html);
    let mut doc = build(body).map_err(|e| InlineError::Parse(format!("{e:?}")))?;
    doc.set_prolog(prolog);
    Ok(doc)
}

/// Parse a standalone markup fragment (e.g. optimized SVG)
///
/// Never fails: markup `tl` rejects becomes a single text node.
pub fn parse_fragment(markup: &str) -> Document {
    build(markup).unwrap_or_else(|_| {
        let mut doc = Document::new();
        let root = doc.root();
        let text = doc.create(NodeData::Text(markup.to_string()));
        doc.append(root, text);
        doc
    })
}

fn build(input: &str) -> Result<Document, tl::ParseError> {
    let dom = tl::parse(input, tl::ParserOptions::default())?;
    let builder = Builder { input };

    let mut doc = Document::new();
    let root = doc.root();
    builder.convert_dom(&mut doc, root, &dom, 0, input.len(), 0);
    Ok(doc)
}

struct Builder<'a> {
    input: &'a str,
}

impl Builder<'_> {
    /// Byte range of `bytes` within the input, if it borrows from it.
    fn span(&self, bytes: &[u8]) -> Option<(usize, usize)> {
        let base = self.input.as_ptr() as usize;
        let start = (bytes.as_ptr() as usize).checked_sub(base)?;
        let end = start + bytes.len();
        (end <= self.input.len()).then_some((start, end))
    }

    /// Convert a parsed `[from, to)` slice of the input under `parent`.
    fn convert_dom(
        &self,
        doc: &mut Document,
        parent: NodeId,
        dom: &tl::VDom<'_>,
        from: usize,
        to: usize,
        depth: usize,
    ) {
        let mut cursor = from;
        self.convert_children(
            doc,
            parent,
            dom.children().iter(),
            dom.parser(),
            &mut cursor,
            to,
            depth,
        );
        self.convert_text(doc, parent, cursor, to, 0, depth);
    }

    /// Parse `[from, to)` again on its own, after `tl` read it as text.
    fn rescan(&self, doc: &mut Document, parent: NodeId, from: usize, to: usize, depth: usize) {
        let Some(slice) = self.input.get(from..to) else {
            return;
        };
        // nodes still borrow from `self.input`, so spans stay absolute
        match tl::parse(slice, tl::ParserOptions::default()) {
            Ok(dom) => self.convert_dom(doc, parent, &dom, from, to, depth),
            Err(_) => self.push_text(doc, parent, from, to),
        }
    }

    /// Append input text `[from, to)` under `parent` as a text node.
    fn push_text(&self, doc: &mut Document, parent: NodeId, from: usize, to: usize) {
        if from >= to {
            return;
        }
        if let Some(text) = self.input.get(from..to) {
            let id = doc.create(NodeData::Text(text.to_string()));
            doc.append(parent, id);
        }
    }

    /// Text `[from, to)`, re-parsing from the first `<` + letter at or
    /// after offset `skip`.
    fn convert_text(
        &self,
        doc: &mut Document,
        parent: NodeId,
        from: usize,
        to: usize,
        skip: usize,
        depth: usize,
    ) {
        let Some(text) = self.input.get(from..to) else {
            return;
        };
        match find_tag_open(text, skip) {
            Some(at) if depth < MAX_RESCAN_DEPTH => {
                self.push_text(doc, parent, from, from + at);
                self.rescan(doc, parent, from + at, to, depth + 1);
            }
            _ => self.push_text(doc, parent, from, to),
        }
    }

    /// Convert sibling nodes, advancing `cursor` past everything placed.
    #[allow(clippy::too_many_arguments)]
    fn convert_children<'h>(
        &self,
        doc: &mut Document,
        parent: NodeId,
        handles: impl Iterator<Item = &'h tl::NodeHandle>,
        parser: &tl::Parser<'_>,
        cursor: &mut usize,
        to: usize,
        depth: usize,
    ) {
        for handle in handles {
            let Some(node) = handle.get(parser) else {
                continue;
            };
            let Some((start, end)) = self.node_span(node) else {
                continue;
            };
            let end = end.min(to);
            if start >= to || end <= *cursor {
                continue;
            }
            if start < *cursor {
                self.convert_text(doc, parent, *cursor, end, 0, depth);
                *cursor = end;
                continue;
            }
            self.convert_text(doc, parent, *cursor, start, 0, depth);
            let consumed = self.convert_node(doc, parent, node, parser, (start, end), to, depth);
            *cursor = (*cursor).max(consumed);
        }
    }

    fn node_span(&self, node: &tl::Node<'_>) -> Option<(usize, usize)> {
        match node {
            tl::Node::Tag(tag) => self.span(tag.raw().as_bytes()),
            tl::Node::Raw(bytes) => self.span(bytes.as_bytes()),
            tl::Node::Comment(bytes) => {
                let (start, end) = self.span(bytes.as_bytes())?;
                // widen to the delimiters when tl reports only the body
                let before = self.input.get(..start)?;
                let after = self.input.get(end..)?;
                if before.ends_with("<!--") && after.starts_with("-->") {
                    Some((start - 4, end + 3))
                } else {
                    Some((start, end))
                }
            }
        }
    }

    /// Convert a tl node (and its subtree) under `parent`.
    ///
    /// Returns the input offset up to which bytes have been placed.
    #[allow(clippy::too_many_arguments)]
    fn convert_node(
        &self,
        doc: &mut Document,
        parent: NodeId,
        node: &tl::Node<'_>,
        parser: &tl::Parser<'_>,
        (start, end): (usize, usize),
        to: usize,
        depth: usize,
    ) -> usize {
        match node {
            tl::Node::Tag(tag) => {
                self.convert_tag(doc, parent, tag, parser, (start, end), to, depth)
            }
            tl::Node::Raw(_) => {
                self.convert_text(doc, parent, start, end, 1, depth);
                end
            }
            tl::Node::Comment(_) => {
                if let Some(text) = self.input.get(start..end) {
                    let id = doc.create(NodeData::Comment(text.to_string()));
                    doc.append(parent, id);
                }
                end
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_tag(
        &self,
        doc: &mut Document,
        parent: NodeId,
        tag: &tl::HTMLTag<'_>,
        parser: &tl::Parser<'_>,
        (start, end): (usize, usize),
        to: usize,
        depth: usize,
    ) -> usize {
        let head = self
            .input
            .get(start..end)
            .and_then(scan_start_tag)
            .filter(|head| head.name.starts_with(|c: char| c.is_ascii_alphabetic()));
        let Some(head) = head else {
            // a bare `<` in text: keep it, look for markup after it
            self.convert_text(doc, parent, start, end, 1, depth);
            return end;
        };

        let content_start = start + head.len;
        let name = head.name.to_ascii_lowercase();
        let self_closing = head.is_self_closing();
        let source = self.input[start..content_start].to_string();
        let id = doc.create(NodeData::Element(Element::from_start_tag(
            head,
            source,
            EndTag::Omitted,
        )));
        doc.append(parent, id);

        if self_closing {
            set_end(doc, id, EndTag::SelfClosing);
            return content_start;
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let (content_end, close_end) = self.raw_text_end(&name, content_start, to);
            self.push_text(doc, id, content_start, content_end);
            if content_end < close_end {
                let close = self.input[content_end..close_end].to_string();
                set_end(doc, id, EndTag::Explicit(close));
            }
            return close_end;
        }

        let mut cursor = content_start;
        let children = tag.children();
        self.convert_children(
            doc,
            id,
            children.top().iter(),
            parser,
            &mut cursor,
            to,
            depth,
        );
        if cursor >= end {
            return cursor;
        }

        // what follows the last child: leftover content, then the end tag
        let rest = &self.input[cursor..end];
        match rest.rfind("</").filter(|_| rest.ends_with('>')) {
            Some(at) => {
                self.convert_text(doc, id, cursor, cursor + at, 0, depth);
                set_end(doc, id, EndTag::Explicit(rest[at..].to_string()));
            }
            None => self.convert_text(doc, id, cursor, end, 0, depth),
        }
        end
    }

    /// Content end and end tag end of a raw-text element whose content
    /// starts at `from`, searching no further than `to`.
    fn raw_text_end(&self, name: &str, from: usize, to: usize) -> (usize, usize) {
        let Some(content) = self.input.get(from..to) else {
            return (to, to);
        };
        let lower = content.to_ascii_lowercase();
        let needle = format!("</{name}");
        let mut pos = 0;
        while let Some(found) = lower[pos..].find(&needle) {
            let at = pos + found;
            let after = at + needle.len();
            match lower.as_bytes().get(after) {
                None => return (from + at, to),
                Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0C') => {
                    let close = lower[after..].find('>').map_or(to, |p| from + after + p + 1);
                    return (from + at, close);
                }
                Some(_) => pos = after,
            }
        }
        (to, to)
    }
}

fn set_end(doc: &mut Document, id: NodeId, end: EndTag) {
    if let Some(elem) = doc.element_mut(id) {
        elem.end = end;
    }
}

/// Offset of the first `<` followed by a letter, at or after `from`.
fn find_tag_open(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    (from..bytes.len().saturating_sub(1))
        .find(|&i| bytes[i] == b'<' && bytes[i + 1].is_ascii_alphabetic())
}

/// Split a leading doctype (with preceding whitespace) off the input
fn split_prolog(html: &str) -> (&str, &str) {
    let start = html.len() - html.trim_start().len();
    let rest = &html[start..];
    let is_doctype = rest
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));
    if !is_doctype {
        return ("", html);
    }
    match rest.find('>') {
        Some(end) => html.split_at(start + end + 1),
        None => ("", html),
    }
}
