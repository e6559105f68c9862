//! In-memory document tree backing the [`Dom`] trait.
//!
//! Parses an HTML string with `tl` into an owned element/text arena,
//! then serves queries and attribute rewrites from the arena.
//! Registered observers receive mutation records synchronously, as the
//! mutations land. Arena slots are never reused: detaching a node only
//! makes it unreachable, so every handed-out [`NodeId`] stays valid.

use thiserror::Error;
use tokio::sync::mpsc;

use super::{Dom, MutationKind, MutationRecord, NodeId, ObserveOptions, Selector};
use crate::utils::html::{escape_attr, is_void_element};

/// The synthetic document element at arena slot 0.
const ROOT: NodeId = NodeId(0);

/// Errors from building a document or fragment.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to parse markup: {0}")]
    Parse(String),
}

/// One arena slot.
enum Node {
    Element(ElementData),
    Text(String),
}

struct ElementData {
    tag: String,
    /// Document order preserved for serialization.
    attrs: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl ElementData {
    fn document() -> Self {
        Self {
            tag: "#document".into(),
            attrs: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// A registered mutation observer.
struct Observer {
    root: NodeId,
    options: ObserveOptions,
    tx: mpsc::UnboundedSender<MutationRecord>,
}

impl Observer {
    fn accepts(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.options.child_list,
            MutationKind::Attribute { name } => {
                self.options.attributes
                    && (self.options.attribute_filter.is_empty()
                        || self.options.attribute_filter.iter().any(|f| f == name))
            }
        }
    }
}

/// Owned, observable document tree.
pub struct MemoryDom {
    nodes: Vec<Node>,
    observers: Vec<Observer>,
}

impl MemoryDom {
    /// Parse an HTML document into an owned tree.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let mut dom = Self {
            nodes: vec![Node::Element(ElementData::document())],
            observers: Vec::new(),
        };
        dom.parse_into(html, ROOT)?;
        Ok(dom)
    }

    /// Parse `html` as a fragment and append its top-level nodes to
    /// `parent`. Observers watching child-list changes see one record.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        let added = self.parse_into(html, parent)?;
        if !added.is_empty() {
            self.notify(parent, MutationKind::ChildList);
        }
        Ok(added)
    }

    /// Detach `node` from `parent`. The arena slot stays allocated; the
    /// node just becomes unreachable from the root.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) {
        let Some(elem) = self.element_mut(parent) else {
            return;
        };

        let before = elem.children.len();
        elem.children.retain(|&child| child != node);
        if elem.children.len() == before {
            return;
        }

        if let Some(child) = self.element_mut(node) {
            child.parent = None;
        }
        self.notify(parent, MutationKind::ChildList);
    }

    /// Serialize the current tree back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Node::Element(root) = &self.nodes[ROOT.0] {
            for &child in &root.children {
                self.write_node(child, &mut out);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Tree construction
    // ------------------------------------------------------------------

    /// Parse markup and attach its top-level nodes under `parent`.
    fn parse_into(&mut self, html: &str, parent: NodeId) -> Result<Vec<NodeId>, DomError> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|e| DomError::Parse(e.to_string()))?;

        let mut added = Vec::new();
        for handle in dom.children() {
            if let Some(id) = self.build_node(*handle, dom.parser(), parent) {
                added.push(id);
            }
        }
        Ok(added)
    }

    /// Convert one parsed node (and its subtree) into arena slots.
    fn build_node(
        &mut self,
        handle: tl::NodeHandle,
        parser: &tl::Parser,
        parent: NodeId,
    ) -> Option<NodeId> {
        let node = handle.get(parser)?;

        match node {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str().to_ascii_lowercase();
                let attrs: Vec<(String, String)> = tag
                    .attributes()
                    .iter()
                    .map(|(key, value)| {
                        (key.to_string(), value.map(|v| v.to_string()).unwrap_or_default())
                    })
                    .collect();

                let id = self.push(Node::Element(ElementData {
                    tag: name,
                    attrs,
                    children: Vec::new(),
                    parent: Some(parent),
                }));
                self.attach(parent, id);

                let children: Vec<tl::NodeHandle> = tag.children().top().iter().copied().collect();
                for child in children {
                    self.build_node(child, parser, id);
                }
                Some(id)
            }
            tl::Node::Raw(bytes) => {
                let text = bytes.as_utf8_str();
                if text.trim().is_empty() {
                    return None;
                }
                let id = self.push(Node::Text(text.into_owned()));
                self.attach(parent, id);
                Some(id)
            }
            tl::Node::Comment(_) => None,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(elem) = self.element_mut(parent) {
            elem.children.push(child);
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id.0) {
            Some(Node::Element(elem)) => Some(elem),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Element(elem)) => Some(elem),
            _ => None,
        }
    }

    /// Whether `node` is `root` or a descendant of it.
    fn is_within(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.element(id).and_then(|elem| elem.parent);
        }
        false
    }

    // ------------------------------------------------------------------
    // Observer delivery
    // ------------------------------------------------------------------

    /// Deliver a mutation record to every observer whose options and
    /// scope accept it. Observers whose receiver is gone are pruned.
    fn notify(&mut self, target: NodeId, kind: MutationKind) {
        let mut closed = false;

        for obs in &self.observers {
            if !obs.accepts(&kind) {
                continue;
            }
            let in_scope = if obs.options.subtree {
                self.is_within(obs.root, target)
            } else {
                obs.root == target
            };
            if !in_scope {
                continue;
            }

            let record = MutationRecord {
                target,
                kind: kind.clone(),
            };
            if obs.tx.send(record).is_err() {
                closed = true;
            }
        }

        if closed {
            self.observers.retain(|obs| !obs.tx.is_closed());
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0] {
            Node::Text(text) => out.push_str(text),
            Node::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for (key, value) in &elem.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(&elem.tag) {
                    return;
                }

                for &child in &elem.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

impl Dom for MemoryDom {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();

        // Depth-first in document order, excluding the synthetic root.
        let mut stack: Vec<NodeId> = match &self.nodes[ROOT.0] {
            Node::Element(root) => root.children.iter().rev().copied().collect(),
            _ => Vec::new(),
        };
        while let Some(id) = stack.pop() {
            if let Node::Element(elem) = &self.nodes[id.0] {
                if selector.matches(&elem.tag, &elem.attrs) {
                    out.push(id);
                }
                stack.extend(elem.children.iter().rev().copied());
            }
        }
        out
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(elem) = self.element_mut(node) else {
            return;
        };

        match elem.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => elem.attrs.push((name.to_string(), value.to_string())),
        }
        self.notify(node, MutationKind::Attribute { name: name.to_string() });
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        let Some(elem) = self.element_mut(node) else {
            return;
        };

        let before = elem.attrs.len();
        elem.attrs.retain(|(key, _)| key != name);
        if elem.attrs.len() != before {
            self.notify(node, MutationKind::Attribute { name: name.to_string() });
        }
    }

    fn body(&self) -> NodeId {
        let mut stack: Vec<NodeId> = match &self.nodes[ROOT.0] {
            Node::Element(root) => root.children.iter().rev().copied().collect(),
            _ => Vec::new(),
        };
        while let Some(id) = stack.pop() {
            if let Node::Element(elem) = &self.nodes[id.0] {
                if elem.tag == "body" {
                    return id;
                }
                stack.extend(elem.children.iter().rev().copied());
            }
        }
        ROOT
    }

    fn observe(
        &mut self,
        root: NodeId,
        options: ObserveOptions,
        tx: mpsc::UnboundedSender<MutationRecord>,
    ) {
        self.observers.push(Observer { root, options, tx });
    }
}
