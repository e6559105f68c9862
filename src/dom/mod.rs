//! Document tree abstraction.
//!
//! The transformer and watcher never touch a concrete tree type. They
//! go through the [`Dom`] capability trait: selector queries, attribute
//! rewrites, and mutation observation. Hosts with a real page tree can
//! back the trait themselves; tests and headless embeds use
//! [`MemoryDom`].

mod memory;
mod selector;


pub use memory::{DomError, MemoryDom};
pub use selector::{Selector, SelectorError};

use tokio::sync::mpsc;

/// Opaque handle to one element in a document tree.
///
/// Handles stay valid for the life of the document; detaching a node
/// does not invalidate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// What changed in an observed subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from an element.
    ChildList,
    /// An attribute was set or removed.
    Attribute { name: String },
}

/// One delivered mutation notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// For child-list changes, the parent whose children changed;
    /// for attribute changes, the element carrying the attribute.
    pub target: NodeId,
    pub kind: MutationKind,
}

/// Observation scope and filters, mirroring mutation-observer init
/// options.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    /// Watch the whole subtree under the root, not just the root itself.
    pub subtree: bool,
    /// Report child additions and removals.
    pub child_list: bool,
    /// Report attribute changes.
    pub attributes: bool,
    /// When non-empty, only these attribute names are reported.
    pub attribute_filter: Vec<String>,
}

/// Narrow capability interface over a live document tree.
///
/// Everything the transformer and watcher need, and nothing else:
/// query, attribute read/write, and mutation observation.
pub trait Dom {
    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Current value of an attribute, if present.
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute, notifying observers watching `name`.
    ///
    /// Notifies even when the new value equals the old one.
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute, notifying observers watching `name`.
    ///
    /// Removing an absent attribute is a silent no-op.
    fn remove_attr(&mut self, node: NodeId, name: &str);

    /// The element observation falls back to when the page has no
    /// main-content landmark.
    fn body(&self) -> NodeId;

    /// Register a mutation observer rooted at `root`.
    ///
    /// Records matching `options` are delivered on `tx`, synchronously
    /// with the mutation, until the receiving end is dropped.
    fn observe(
        &mut self,
        root: NodeId,
        options: ObserveOptions,
        tx: mpsc::UnboundedSender<MutationRecord>,
    );
}
