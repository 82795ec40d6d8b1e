//! Arena-backed in-memory document.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`] index; detached
//! nodes stay in the arena until the document is dropped. Classes are stored
//! in the `class` attribute so the rendered markup always shows exactly what
//! a browser would serialize.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::{DocumentAccess, ListenerKind, NodeId, Selector};
use crate::model::{ContentId, InstanceId, Notification};

/// Playback state tracked for media and frame elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaState {
    /// Whether a `<video>`/`<audio>` is currently playing.
    pub playing: bool,
    /// How many times the element's `src` was assigned (frame reloads).
    pub source_loads: u32,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    media: MediaState,
}

/// A notification as it was dispatched, with its dispatch target.
#[derive(Debug, Clone)]
pub struct DispatchedNotification {
    /// Node the notification was dispatched on; `None` for the document.
    pub target: Option<NodeId>,
    pub notification: Notification,
}

type NotificationListener = Box<dyn FnMut(&MemoryDocument, &Notification)>;

/// In-memory document implementing [`DocumentAccess`].
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    location_fragment: Option<String>,
    active_element: Option<NodeId>,
    listeners: Vec<(ListenerKind, InstanceId)>,
    notifications: Vec<DispatchedNotification>,
    notification_listeners: Vec<(Option<NodeId>, NotificationListener)>,
    supported: bool,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.nodes.len())
            .field("location_fragment", &self.location_fragment)
            .field("listeners", &self.listeners)
            .field("notifications", &self.notifications.len())
            .finish()
    }
}

impl MemoryDocument {
    /// Empty document: `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            location_fragment: None,
            active_element: None,
            listeners: Vec::new(),
            notifications: Vec::new(),
            notification_listeners: Vec::new(),
            supported: true,
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.insert_before(root, body, None);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// Document whose body holds `specs`, in order.
    pub fn from_specs(specs: &[NodeSpec]) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        for spec in specs {
            doc.build(body, spec);
        }
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Append the tree described by `spec` under `parent`.
    pub fn build(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let node = self.create_element(&spec.tag);
        if let Some(id) = &spec.id {
            self.set_attribute(node, "id", id);
        }
        if let Some(class) = &spec.class {
            self.set_attribute(node, "class", class);
        }
        for (name, value) in &spec.attributes {
            self.set_attribute(node, name, value);
        }
        if let Some(text) = &spec.text {
            let text_node = self.create_text(text);
            self.append_child(node, text_node);
        }
        for child in &spec.children {
            self.build(node, child);
        }
        self.append_child(parent, node);
        node
    }

    /// Set the feature support reported to controllers.
    pub fn set_supports_required_features(&mut self, supported: bool) {
        self.supported = supported;
    }

    /// Nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Start playback of a media element.
    pub fn play_media(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.media.playing = true;
        }
    }

    pub fn media_state(&self, node: NodeId) -> MediaState {
        self.nodes
            .get(node.0)
            .map(|n| n.media)
            .unwrap_or_default()
    }

    /// Owners of listeners registered for `kind`.
    pub fn listeners(&self, kind: ListenerKind) -> Vec<InstanceId> {
        self.listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, owner)| *owner)
            .collect()
    }

    /// Every notification dispatched so far, oldest first.
    pub fn notifications(&self) -> &[DispatchedNotification] {
        &self.notifications
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    /// Listen for notifications on `scope` (bubbling from descendants), or
    /// on the document when `scope` is `None`.
    pub fn add_notification_listener(
        &mut self,
        scope: Option<NodeId>,
        listener: impl FnMut(&MemoryDocument, &Notification) + 'static,
    ) {
        self.notification_listeners
            .push((scope, Box::new(listener)));
    }

    /// Attributes of `node` in insertion order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.kind(node) {
            Some(NodeKind::Element { attributes, .. }) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Whether `node` is attached to the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Deterministic indented markup of the whole document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    // ===== Internals =====

    fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    fn attributes_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element { attributes, .. }) => Some(attributes),
            _ => None,
        }
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
            media: MediaState::default(),
        });
        id
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|child| *child != node);
        }
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.parent = None;
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if let Some(n) = self.nodes.get(node.0) {
            for child in &n.children {
                out.push(*child);
                self.descendants(*child, out);
            }
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element { .. }) => {
                for child in self.children(node) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    fn render_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match self.kind(node) {
            Some(NodeKind::Text(text)) => {
                out.push_str(&indent);
                out.push_str(&escape_text(text));
                out.push('\n');
            }
            Some(NodeKind::Element { tag, attributes }) => {
                out.push_str(&indent);
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
                }
                out.push('>');

                let children = self.children(node);
                match children.as_slice() {
                    [] => {}
                    [only] if matches!(self.kind(*only), Some(NodeKind::Text(_))) => {
                        out.push_str(&escape_text(&self.text_content(*only)));
                    }
                    _ => {
                        out.push('\n');
                        for child in children {
                            self.render_node(child, depth + 1, out);
                        }
                        out.push_str(&indent);
                    }
                }
                out.push_str(&format!("</{}>\n", tag));
            }
            None => {}
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn class_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

impl DocumentAccess for MemoryDocument {
    fn supports_required_features(&self) -> bool {
        self.supported
    }

    fn document_element(&self) -> NodeId {
        self.root
    }

    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut candidates = vec![self.root];
        self.descendants(self.root, &mut candidates);
        candidates
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    fn query_selector_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut candidates = Vec::new();
        self.descendants(root, &mut candidates);
        candidates
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    fn element_by_id(&self, id: &ContentId) -> Option<NodeId> {
        // Same lookup a browser host makes with querySelector
        let selector = Selector::parse(&id.to_selector()).ok()?;
        self.query_selector(&selector)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes.get(parent.0)?.children;
        let index = siblings.iter().position(|child| *child == node)?;
        siblings.get(index + 1).copied()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match self.kind(node) {
            Some(NodeKind::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|value| class_tokens(&value).any(|token| token == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if class.is_empty() || self.tag_name(node).is_none() || self.has_class(node, class) {
            return;
        }
        let value = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim_end(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &value);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attribute(node, "class") else {
            return;
        };
        if !class_tokens(&existing).any(|token| token == class) {
            return;
        }
        let remaining: Vec<&str> = class_tokens(&existing)
            .filter(|token| *token != class)
            .collect();
        // An emptied class list drops the attribute
        if remaining.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &remaining.join(" "));
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match self.kind(node) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let is_frame_source = name == "src" && self.tag_name(node).as_deref() == Some("iframe");
        let Some(attributes) = self.attributes_mut(node) else {
            return;
        };
        match attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
        if is_frame_source {
            if let Some(n) = self.nodes.get_mut(node.0) {
                n.media.source_loads += 1;
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(attributes) = self.attributes_mut(node) {
            attributes.retain(|(n, _)| *n != name);
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if self.tag_name(parent).is_none()
            || node.0 >= self.nodes.len()
            || self.is_inclusive_ancestor(node, parent)
            || reference == Some(node)
        {
            return;
        }
        self.detach(node);

        let Some(p) = self.nodes.get_mut(parent.0) else {
            return;
        };
        let index = reference
            .and_then(|r| p.children.iter().position(|child| *child == r))
            .unwrap_or(p.children.len());
        p.children.insert(index, node);
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        self.detach(node);
        if let Some(active) = self.active_element {
            if self.is_inclusive_ancestor(node, active) {
                self.active_element = None;
            }
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Text(data)) => {
                *data = text.to_string();
                return;
            }
            Some(NodeKind::Element { .. }) => {}
            None => return,
        }

        // A lone text child is rewritten rather than replaced
        let children = self.children(node);
        if let ([only], false) = (children.as_slice(), text.is_empty()) {
            if let Some(NodeKind::Text(data)) = self.nodes.get_mut(only.0).map(|n| &mut n.kind) {
                *data = text.to_string();
                return;
            }
        }

        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node);
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.tag_name(node).is_some() {
            self.active_element = Some(node);
        }
    }

    fn pause_media(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.media.playing = false;
        }
    }

    fn location_fragment(&self) -> Option<String> {
        self.location_fragment.clone()
    }

    fn set_location_fragment(&mut self, fragment: &str) {
        let bare = fragment.strip_prefix('#').unwrap_or(fragment);
        self.location_fragment = if bare.is_empty() {
            None
        } else {
            Some(format!("#{}", bare))
        };
    }

    fn add_event_listener(&mut self, kind: ListenerKind, owner: InstanceId) {
        if !self.listeners.contains(&(kind, owner)) {
            self.listeners.push((kind, owner));
        }
    }

    fn remove_event_listener(&mut self, kind: ListenerKind, owner: InstanceId) {
        self.listeners.retain(|entry| *entry != (kind, owner));
    }

    fn dispatch(&mut self, target: Option<NodeId>, notification: Notification) {
        // Bubble path: target and its ancestors, then the document
        let mut path: Vec<Option<NodeId>> = Vec::new();
        let mut cursor = target;
        while let Some(node) = cursor {
            path.push(Some(node));
            cursor = self.parent(node);
        }
        path.push(None);

        let mut listeners = std::mem::take(&mut self.notification_listeners);
        for scope in &path {
            for (listening_on, listener) in listeners.iter_mut() {
                if listening_on == scope {
                    listener(&*self, &notification);
                }
            }
        }
        self.notification_listeners = listeners;

        self.notifications.push(DispatchedNotification {
            target,
            notification,
        });
    }
}

// ===== Document description =====

/// Serializable description of an element subtree.
///
/// Used by scenario files (`[[document]]` tables) and by tests to build
/// documents without a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list.
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
