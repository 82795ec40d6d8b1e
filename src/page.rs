//! Event host for an in-memory document.
//!
//! A [`Page`] plays the browser's part: it owns the document, delivers
//! clicks and fragment changes to the controllers whose listeners are
//! registered, and performs the default action of fragment links when no
//! listener prevented it.

use tracing::trace;

use crate::controller::{ClickEvent, ClickOutcome, ToggleController};
use crate::dom::{DocumentAccess, ListenerKind, MemoryDocument, NodeId, Selector};
use crate::model::Target;

/// Index of a controller installed on a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerHandle(usize);

/// A document plus the controllers living on it.
#[derive(Debug)]
pub struct Page {
    document: MemoryDocument,
    controllers: Vec<ToggleController>,
}

impl Page {
    pub fn new(document: MemoryDocument) -> Self {
        Self {
            document,
            controllers: Vec::new(),
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    /// Set up `controller` against this page's document and keep it.
    pub fn install(&mut self, mut controller: ToggleController) -> ControllerHandle {
        controller.setup(&mut self.document);
        self.controllers.push(controller);
        ControllerHandle(self.controllers.len() - 1)
    }

    pub fn controller(&self, handle: ControllerHandle) -> Option<&ToggleController> {
        self.controllers.get(handle.0)
    }

    /// Run `f` with mutable access to one controller and the document.
    pub fn with_controller<R>(
        &mut self,
        handle: ControllerHandle,
        f: impl FnOnce(&mut ToggleController, &mut MemoryDocument) -> R,
    ) -> Option<R> {
        let controller = self.controllers.get_mut(handle.0)?;
        Some(f(controller, &mut self.document))
    }

    pub fn toggle(&mut self, handle: ControllerHandle, target: &Target) {
        self.with_controller(handle, |c, doc| c.toggle(doc, target));
    }

    pub fn expand(&mut self, handle: ControllerHandle, target: &Target) {
        self.with_controller(handle, |c, doc| c.expand(doc, target));
    }

    pub fn collapse(&mut self, handle: ControllerHandle, target: &Target) {
        self.with_controller(handle, |c, doc| c.collapse(doc, target));
    }

    pub fn setup(&mut self, handle: ControllerHandle) {
        self.with_controller(handle, |c, doc| c.setup(doc));
    }

    pub fn destroy(&mut self, handle: ControllerHandle) {
        self.with_controller(handle, |c, doc| c.destroy(doc));
    }

    /// Plain primary click on `target`.
    pub fn click(&mut self, target: NodeId) -> ClickOutcome {
        self.dispatch_click(ClickEvent::primary(target))
    }

    /// Deliver `event` to click listeners, then run the default action.
    pub fn dispatch_click(&mut self, event: ClickEvent) -> ClickOutcome {
        let listeners = self.document.listeners(ListenerKind::Click);
        let mut outcome = ClickOutcome::default();

        for controller in &mut self.controllers {
            if !listeners.contains(&controller.id()) {
                continue;
            }
            let result = controller.handle_click(&mut self.document, &event);
            outcome.handled |= result.handled;
            outcome.default_prevented |= result.default_prevented;
        }

        if !outcome.default_prevented && event.is_plain() {
            if let Some(fragment) = self.link_fragment(event.target) {
                self.navigate(&fragment);
            }
        }

        trace!(node = event.target.index(), ?outcome, "Click dispatched");
        outcome
    }

    /// Change the location fragment; navigation listeners run only when it
    /// actually changed.
    pub fn navigate(&mut self, fragment: &str) {
        let before = self.document.location_fragment();
        self.document.set_location_fragment(fragment);
        if self.document.location_fragment() != before {
            self.announce_navigation();
        }
    }

    /// Move focus to `node` and tell focus listeners. A listener that changed
    /// the location fragment triggers navigation listeners afterwards.
    pub fn dispatch_focus(&mut self, node: NodeId) {
        self.document.focus(node);

        let before = self.document.location_fragment();
        let listeners = self.document.listeners(ListenerKind::Focus);
        for controller in &mut self.controllers {
            if listeners.contains(&controller.id()) {
                controller.handle_focus(&mut self.document, node);
            }
        }

        trace!(node = node.index(), "Focus dispatched");
        if self.document.location_fragment() != before {
            self.announce_navigation();
        }
    }

    fn announce_navigation(&mut self) {
        let listeners = self.document.listeners(ListenerKind::Navigation);
        for controller in &mut self.controllers {
            if listeners.contains(&controller.id()) {
                controller.handle_navigation(&mut self.document);
            }
        }
    }

    /// `href` of the nearest enclosing same-page link.
    fn link_fragment(&self, node: NodeId) -> Option<String> {
        let link = self.document.closest(node, &Selector::tag("a"))?;
        self.document
            .attribute(link, "href")
            .filter(|href| href.starts_with('#'))
    }

    pub fn into_document(self) -> MemoryDocument {
        self.document
    }
}
