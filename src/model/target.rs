//! Operation targets: an element handle or a selector.

use crate::dom::{DocumentAccess, NodeId, Selector, SelectorError};
use crate::model::ContentId;

/// What a public operation is pointed at.
///
/// Either side may name a Trigger or a Content panel; the controller resolves
/// it to the canonical pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A node handle already held by the caller.
    Element(NodeId),
    /// A selector resolved to its first match in document order.
    Selector(Selector),
    /// The element carrying this id.
    Id(ContentId),
}

impl Target {
    /// Parse `selector` into a target.
    pub fn selector(selector: &str) -> Result<Self, SelectorError> {
        Selector::parse(selector).map(Target::Selector)
    }

    /// Target the element carrying `id`.
    pub fn id(id: &ContentId) -> Self {
        Target::Id(id.clone())
    }

    /// Resolve to a node, `None` when nothing matches.
    pub fn resolve<D: DocumentAccess + ?Sized>(&self, doc: &D) -> Option<NodeId> {
        match self {
            Target::Element(node) => doc.tag_name(*node).map(|_| *node),
            Target::Selector(selector) => doc.query_selector(selector),
            Target::Id(id) => doc.element_by_id(id),
        }
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Element(node)
    }
}

impl From<Selector> for Target {
    fn from(selector: Selector) -> Self {
        Target::Selector(selector)
    }
}

impl From<&ContentId> for Target {
    fn from(id: &ContentId) -> Self {
        Target::id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeSpec};

    fn id(raw: &str) -> ContentId {
        ContentId::new(raw).expect("valid id")
    }

    #[test]
    fn id_target_resolves_ids_that_need_escaping() {
        let doc = MemoryDocument::from_specs(&[
            NodeSpec::new("div").id("plain"),
            NodeSpec::new("div").id("1st:panel"),
        ]);

        let node = Target::id(&id("1st:panel")).resolve(&doc);

        assert!(node.is_some());
        assert_eq!(
            node.and_then(|n| doc.attribute(n, "id")).as_deref(),
            Some("1st:panel")
        );
    }

    #[test]
    fn missing_id_resolves_to_nothing() {
        let doc = MemoryDocument::from_specs(&[NodeSpec::new("div").id("plain")]);

        assert_eq!(Target::id(&id("absent")).resolve(&doc), None);
    }

    #[test]
    fn element_target_ignores_text_nodes() {
        let doc = MemoryDocument::from_specs(&[NodeSpec::new("p").id("para").text("Words")]);
        let para = doc.element_by_id(&id("para")).expect("paragraph exists");
        let text = doc.children(para)[0];

        assert_eq!(Target::Element(para).resolve(&doc), Some(para));
        assert_eq!(Target::Element(text).resolve(&doc), None);
    }
}
