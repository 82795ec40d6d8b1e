//! Click and navigation handling.

use tracing::debug;

use super::{is_trigger_expanded, ToggleController, TransitionKind};
use crate::config::ToggleConfig;
use crate::dom::{DocumentAccess, NodeId, Selector};
use crate::model::ContentId;

/// Mouse button that produced a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// A click delivered to document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Innermost element under the pointer.
    pub target: NodeId,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl ClickEvent {
    /// Unmodified primary-button click.
    pub fn primary(target: NodeId) -> Self {
        Self {
            target,
            button: MouseButton::Primary,
            modifiers: Modifiers::default(),
        }
    }

    /// Unmodified primary-button click, the only kind that activates links
    /// and Triggers.
    pub fn is_plain(&self) -> bool {
        self.button == MouseButton::Primary && !self.modifiers.any()
    }
}

/// What a listener did with a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// The click hit one of the listener's Triggers.
    pub handled: bool,
    /// The browser's default action (following a link) must not run.
    pub default_prevented: bool,
}

impl ClickOutcome {
    const IGNORED: Self = Self {
        handled: false,
        default_prevented: false,
    };

    const CONSUMED: Self = Self {
        handled: true,
        default_prevented: true,
    };
}

/// Content id a trigger-like element points at.
///
/// Checked in order: the toggle attribute, `aria-controls`, then an `href`
/// fragment. Values that are not valid ids are ignored.
pub(crate) fn target_id<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    config: &ToggleConfig,
) -> Option<ContentId> {
    [config.btn_attribute.as_str(), "aria-controls"]
        .into_iter()
        .filter_map(|name| doc.attribute(node, name))
        .find_map(|raw| ContentId::from_fragment(&raw).ok())
        .or_else(|| href_fragment(doc, node))
}

fn href_fragment<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Option<ContentId> {
    let href = doc.attribute(node, "href")?;
    let fragment = href.strip_prefix('#')?;
    ContentId::new(fragment).ok()
}

impl ToggleController {
    /// Handle a document click.
    ///
    /// Only unmodified primary clicks count. A click anywhere inside a
    /// Trigger (its icon, say) resolves to that Trigger.
    pub fn handle_click<D: DocumentAccess + ?Sized>(
        &mut self,
        doc: &mut D,
        event: &ClickEvent,
    ) -> ClickOutcome {
        if !self.is_active() || !event.is_plain() {
            return ClickOutcome::IGNORED;
        }
        let Some(index) = self.trigger_at(doc, event.target) else {
            return ClickOutcome::IGNORED;
        };
        let Some(index) = self.in_scope(doc, index) else {
            return ClickOutcome::IGNORED;
        };

        if self.config.fragment_routing {
            if let Some(outcome) = self.route_fragment_click(doc, index) {
                return outcome;
            }
        }

        self.toggle_index(doc, index);
        ClickOutcome::CONSUMED
    }

    /// Expand the panel named by the current location fragment.
    pub fn handle_navigation<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D) {
        if !self.is_active() || !self.config.fragment_routing {
            return;
        }
        let Some(fragment) = doc.location_fragment() else {
            return;
        };
        let Ok(id) = ContentId::from_fragment(&fragment) else {
            debug!(instance = %self.id, %fragment, "Fragment is not a valid content id");
            return;
        };
        let Some(index) = self.panels().iter().position(|p| p.id == id) else {
            debug!(instance = %self.id, content = %id, "Fragment names no managed panel");
            return;
        };
        if let Some(index) = self.in_scope(doc, index) {
            self.expand_index(doc, index);
        }
    }

    /// Reveal a collapsed panel that focus moved into, so tabbing into
    /// hidden content opens it.
    ///
    /// Routed like a fragment link: the location changes to the panel's id,
    /// or navigation is handled by hand when it already names the panel.
    /// Focus stays where it landed.
    pub fn handle_focus<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, node: NodeId) {
        if !self.is_active() || !self.config.fragment_routing {
            return;
        }
        let Some(content) = doc.closest(node, &self.scope) else {
            return;
        };
        let Some(index) = self.panels().iter().position(|p| p.content == content) else {
            return;
        };
        let Some((trigger, id)) = self.panel(index).map(|p| (p.trigger, p.id.clone())) else {
            return;
        };
        if is_trigger_expanded(doc, trigger) {
            return;
        }

        debug!(instance = %self.id, content = %id, "Focus entered collapsed panel");
        self.focus_kept = Some(content);
        let current = doc
            .location_fragment()
            .and_then(|f| ContentId::from_fragment(&f).ok());
        if current.as_ref() == Some(&id) {
            self.handle_navigation(doc);
        } else {
            doc.set_location_fragment(&id.to_fragment());
        }
    }

    /// Fragment-link Triggers: collapse when open, otherwise let navigation
    /// expand the panel, firing it by hand when the fragment is unchanged.
    fn route_fragment_click<D: DocumentAccess + ?Sized>(
        &mut self,
        doc: &mut D,
        index: usize,
    ) -> Option<ClickOutcome> {
        let trigger = self.panel(index)?.trigger;
        let fragment = href_fragment(doc, trigger)?;

        if is_trigger_expanded(doc, trigger) {
            self.transition(doc, index, TransitionKind::Collapse);
            return Some(ClickOutcome::CONSUMED);
        }

        let current = doc
            .location_fragment()
            .and_then(|f| ContentId::from_fragment(&f).ok());
        if current.as_ref() == Some(&fragment) {
            // No navigation event will follow
            self.handle_navigation(doc);
            return Some(ClickOutcome::CONSUMED);
        }

        Some(ClickOutcome {
            handled: true,
            default_prevented: false,
        })
    }

    /// Panel whose Trigger contains `node`.
    fn trigger_at<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> Option<usize> {
        let panels = self.panels();

        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(index) = panels.iter().position(|p| p.trigger == current) {
                return Some(index);
            }
            cursor = doc.parent(current);
        }

        // Unmanaged element carrying the toggle attribute
        let marker = Selector::attribute(&self.config.btn_attribute);
        let element = doc.closest(node, &marker)?;
        let id = target_id(doc, element, &self.config)?;
        panels.iter().position(|p| p.id == id)
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
