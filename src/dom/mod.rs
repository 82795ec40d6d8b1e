//! Document access capability.
//!
//! The controller never touches a live document directly. Everything it reads
//! or writes goes through [`DocumentAccess`], so the same transition logic runs
//! against a browser binding or against the in-memory [`MemoryDocument`].

pub mod memory;
pub mod selector;

pub use memory::{MediaState, MemoryDocument, NodeSpec};
pub use selector::{Selector, SelectorError};

use crate::model::{ContentId, InstanceId, Notification};

/// Handle to a node owned by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Document-level event listeners a controller registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Click events bubbling to the document.
    Click,
    /// Location fragment changes.
    Navigation,
    /// Focus moving onto an element.
    Focus,
}

/// Query and mutation primitives over a document.
///
/// Operations are infallible: a missing node or attribute is `None` or an
/// empty result, and mutations on nodes that do not exist are ignored.
pub trait DocumentAccess {
    /// Whether the document offers everything the controller relies on.
    fn supports_required_features(&self) -> bool {
        true
    }

    /// The root element (`<html>`).
    fn document_element(&self) -> NodeId;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// First element matching `selector`.
    fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Descendants of `root` (excluding `root`) matching `selector`.
    fn query_selector_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId>;

    fn element_by_id(&self, id: &ContentId) -> Option<NodeId>;

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.tag_name(current).is_some() && self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Lowercase tag name, `None` for text nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;
    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Insert `node` into `parent` before `reference`, or at the end.
    /// A node that is already attached elsewhere is moved.
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);

    fn append_child(&mut self, parent: NodeId, node: NodeId) {
        self.insert_before(parent, node, None);
    }

    /// Detach `node` from its parent.
    fn remove_node(&mut self, node: NodeId);

    /// Replace all children of `node` with a single text node. On a text
    /// node, replace its data.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    fn focus(&mut self, node: NodeId);

    /// Pause a media element (`<video>`, `<audio>`).
    fn pause_media(&mut self, node: NodeId);

    /// Current location fragment including the leading `#`, if any.
    fn location_fragment(&self) -> Option<String>;

    /// Set the location fragment, with or without its leading `#`. An empty
    /// fragment clears it. Hosts announce the change to navigation listeners.
    fn set_location_fragment(&mut self, fragment: &str);

    fn add_event_listener(&mut self, kind: ListenerKind, owner: InstanceId);
    fn remove_event_listener(&mut self, kind: ListenerKind, owner: InstanceId);

    /// Deliver a notification synchronously to listeners on `target`
    /// (bubbling to the document), or on the document when `target` is `None`.
    fn dispatch(&mut self, target: Option<NodeId>, notification: Notification);
}
