//! Toggle controller: the Trigger/Content state machine.
//!
//! A [`ToggleController`] owns the bookkeeping for every panel matched by its
//! scope selector. The observable state lives in the document itself: a
//! Trigger's `aria-expanded` attribute is the source of truth, and the
//! Content's expanded class, the Trigger's active class, labels and icons
//! are kept in step with it by every transition.

mod hooks;
mod markup;
mod routing;

pub use hooks::{Transition, TransitionHooks, TransitionKind};
pub use routing::{ClickEvent, ClickOutcome, Modifiers, MouseButton};

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::config::ToggleConfig;
use crate::dom::{DocumentAccess, ListenerKind, NodeId, Selector};
use crate::model::{ContentId, GroupName, InstanceId, Notification, NotificationKind, Target};
use markup::{LabelStyle, TriggerOrigin};

/// Group membership of a panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    /// Triggers carrying the same group attribute value.
    Named(GroupName),
    /// Triggers without a group attribute share one group per instance.
    Scope,
}

/// Bookkeeping for one Trigger/Content pair.
#[derive(Debug)]
struct Panel {
    content: NodeId,
    id: ContentId,
    trigger: NodeId,
    origin: TriggerOrigin,
    /// State recorded at setup, restored on destroy.
    initially_expanded: bool,
    added_tabindex: bool,
    group: GroupKey,
}

/// Attribute on the document element counting live instances that share
/// the init class. The class goes once the count reaches zero.
const INSTANCE_COUNT_ATTRIBUTE: &str = "data-houdini-instances";

/// Live state between setup and destroy.
#[derive(Debug, Default)]
struct Instance {
    panels: Vec<Panel>,
    /// Counted in [`INSTANCE_COUNT_ATTRIBUTE`]; false when the class was
    /// authored or disabled.
    shares_init_class: bool,
}

/// Controller for the panels matched by one scope selector.
pub struct ToggleController {
    id: InstanceId,
    scope: Selector,
    config: Rc<ToggleConfig>,
    hooks: TransitionHooks,
    instance: Option<Instance>,
    /// Content that received focus itself; its next expand leaves focus alone.
    focus_kept: Option<NodeId>,
}

impl std::fmt::Debug for ToggleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleController")
            .field("id", &self.id)
            .field("scope", &self.scope.as_str())
            .field("hooks", &self.hooks)
            .field("panels", &self.panel_count())
            .finish()
    }
}

impl ToggleController {
    /// Controller for Content panels matching `scope`. Nothing happens to the
    /// document until [`setup`](Self::setup).
    pub fn new(scope: Selector, config: ToggleConfig) -> Self {
        Self {
            id: InstanceId::next(),
            scope,
            config: Rc::new(config),
            hooks: TransitionHooks::default(),
            instance: None,
            focus_kept: None,
        }
    }

    pub fn with_hooks(mut self, hooks: TransitionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn scope(&self) -> &Selector {
        &self.scope
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    /// Whether the instance is set up and listening.
    pub fn is_active(&self) -> bool {
        self.instance.is_some()
    }

    pub fn panel_count(&self) -> usize {
        self.instance.as_ref().map_or(0, |i| i.panels.len())
    }

    // ===== Lifecycle =====

    /// Prepare every matching panel and start listening for clicks.
    ///
    /// Refuses to run when the document lacks required features. Calling it
    /// on a live instance only picks up new panels.
    pub fn setup<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D) {
        if self.instance.is_some() {
            self.setup_panels(doc);
            return;
        }
        if !doc.supports_required_features() {
            info!(instance = %self.id, "Document lacks required features; controller stays inert");
            return;
        }

        let shares_init_class = claim_init_class(doc, &self.config.init_class);
        self.instance = Some(Instance {
            panels: Vec::new(),
            shares_init_class,
        });

        let added = self.setup_panels(doc);

        doc.add_event_listener(ListenerKind::Click, self.id);
        if self.config.fragment_routing {
            doc.add_event_listener(ListenerKind::Navigation, self.id);
            doc.add_event_listener(ListenerKind::Focus, self.id);
            self.handle_navigation(doc);
        }

        info!(
            instance = %self.id,
            scope = %self.scope,
            panels = added,
            accordion = self.config.is_accordion,
            "Controller set up"
        );
        self.emit_lifecycle(doc, NotificationKind::Initialize);
    }

    /// Scan the scope for panels that are not initialized yet.
    ///
    /// Returns how many panels were added. Panels already carrying the
    /// content class are skipped, so repeated calls are harmless.
    pub fn setup_panels<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D) -> usize {
        let config = Rc::clone(&self.config);
        let Some(instance) = self.instance.as_mut() else {
            return 0;
        };

        let mut added = 0;
        for content in doc.query_selector_all(&self.scope) {
            let known = instance.panels.iter().any(|p| p.content == content);
            if known || doc.has_class(content, &config.content_class) {
                continue;
            }
            if let Some(panel) = prepare_panel(doc, &config, content) {
                instance.panels.push(panel);
                added += 1;
            }
        }

        if config.group_collapse_enabled() {
            normalize_groups(doc, &config, &instance.panels);
        }

        debug!(instance = %self.id, added, "Scanned scope for panels");
        self.emit_lifecycle(doc, NotificationKind::Setup);
        added
    }

    /// Remove listeners and markup, restoring every panel to its setup-time
    /// state. A no-op when not set up.
    pub fn destroy<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D) {
        let Some(instance) = self.instance.take() else {
            return;
        };

        doc.remove_event_listener(ListenerKind::Click, self.id);
        doc.remove_event_listener(ListenerKind::Navigation, self.id);
        doc.remove_event_listener(ListenerKind::Focus, self.id);
        self.focus_kept = None;

        let config = &self.config;
        for panel in &instance.panels {
            markup::detach_trigger(doc, config, panel.trigger, &panel.origin, &panel.id);
            doc.remove_class(panel.content, &config.content_class);
            if panel.initially_expanded {
                doc.add_class(panel.content, &config.expanded_class);
            } else {
                doc.remove_class(panel.content, &config.expanded_class);
            }
            if panel.added_tabindex {
                doc.remove_attribute(panel.content, "tabindex");
            }
        }

        if instance.shares_init_class {
            release_init_class(doc, &config.init_class);
        }

        info!(instance = %self.id, panels = instance.panels.len(), "Controller destroyed");
        self.emit_lifecycle(doc, NotificationKind::Destroy);
    }

    // ===== Operations =====

    /// Flip the resolved pair: collapse it when expanded, otherwise expand
    /// it after collapsing the rest of its group.
    pub fn toggle<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, target: &Target) {
        if let Some(index) = self.resolve(doc, target) {
            self.toggle_index(doc, index);
        }
    }

    /// Expand the resolved pair, collapsing the rest of its group first.
    pub fn expand<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, target: &Target) {
        if let Some(index) = self.resolve(doc, target) {
            self.expand_index(doc, index);
        }
    }

    /// Collapse the resolved pair. Other group members are left alone.
    pub fn collapse<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, target: &Target) {
        if let Some(index) = self.resolve(doc, target) {
            self.transition(doc, index, TransitionKind::Collapse);
        }
    }

    /// Collapse every expanded member of the target's group except the
    /// target itself. Only applies to accordions with `collapseOthers`.
    pub fn collapse_group<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, target: &Target) {
        if !self.config.group_collapse_enabled() {
            return;
        }
        if let Some(index) = self.resolve(doc, target) {
            self.collapse_group_index(doc, index);
        }
    }

    /// Current state of the resolved pair, `None` when it does not resolve.
    pub fn is_expanded<D: DocumentAccess + ?Sized>(&self, doc: &D, target: &Target) -> Option<bool> {
        let index = self.resolve(doc, target)?;
        let panel = self.panel(index)?;
        Some(is_trigger_expanded(doc, panel.trigger))
    }

    /// The `(trigger, content)` pair a target resolves to.
    pub fn pair<D: DocumentAccess + ?Sized>(
        &self,
        doc: &D,
        target: &Target,
    ) -> Option<(NodeId, NodeId)> {
        let index = self.resolve(doc, target)?;
        self.panel(index).map(|p| (p.trigger, p.content))
    }

    // ===== Internals =====

    fn panel(&self, index: usize) -> Option<&Panel> {
        self.instance.as_ref()?.panels.get(index)
    }

    fn panels(&self) -> &[Panel] {
        self.instance
            .as_ref()
            .map(|i| i.panels.as_slice())
            .unwrap_or_default()
    }

    /// Resolve a target to a panel index, checking the Content still
    /// matches the scope.
    fn resolve<D: DocumentAccess + ?Sized>(&self, doc: &D, target: &Target) -> Option<usize> {
        if self.instance.is_none() {
            return None;
        }
        let Some(node) = target.resolve(doc) else {
            debug!(instance = %self.id, ?target, "Target matches nothing");
            return None;
        };

        let panels = self.panels();
        let index = panels
            .iter()
            .position(|p| p.content == node || p.trigger == node)
            .or_else(|| {
                let id = routing::target_id(doc, node, &self.config)?;
                panels.iter().position(|p| p.id == id)
            });
        let Some(index) = index else {
            debug!(instance = %self.id, ?target, "Target is not a managed trigger or content");
            return None;
        };

        self.in_scope(doc, index)
    }

    fn in_scope<D: DocumentAccess + ?Sized>(&self, doc: &D, index: usize) -> Option<usize> {
        let panel = self.panel(index)?;
        if doc.matches(panel.content, &self.scope) {
            Some(index)
        } else {
            debug!(instance = %self.id, content = %panel.id, "Content no longer matches scope");
            None
        }
    }

    fn toggle_index<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, index: usize) {
        let Some(panel) = self.panel(index) else {
            return;
        };
        if is_trigger_expanded(doc, panel.trigger) {
            self.transition(doc, index, TransitionKind::Collapse);
        } else {
            self.expand_index(doc, index);
        }
    }

    fn expand_index<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, index: usize) {
        if self.config.group_collapse_enabled() {
            self.collapse_group_index(doc, index);
        }
        self.transition(doc, index, TransitionKind::Expand);
    }

    fn collapse_group_index<D: DocumentAccess + ?Sized>(&mut self, doc: &mut D, index: usize) {
        let panels = self.panels();
        let Some(group) = panels.get(index).map(|p| p.group.clone()) else {
            return;
        };
        let others: Vec<usize> = panels
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                *i != index && p.group == group && is_trigger_expanded(doc, p.trigger)
            })
            .map(|(i, _)| i)
            .collect();

        for other in others {
            self.transition(doc, other, TransitionKind::Collapse);
        }
    }

    /// Apply one complete transition: hooks, media, attributes, focus and
    /// notification.
    fn transition<D: DocumentAccess + ?Sized>(
        &mut self,
        doc: &mut D,
        index: usize,
        kind: TransitionKind,
    ) {
        let Some(panel) = self.panel(index) else {
            return;
        };
        let transition = Transition {
            kind,
            trigger: panel.trigger,
            content: panel.content,
        };
        let style = panel.origin.label_style();
        let was_expanded = is_trigger_expanded(doc, panel.trigger);
        let config = Rc::clone(&self.config);

        self.hooks.run_before(&transition);

        let expanded = kind == TransitionKind::Expand;
        if !expanded && was_expanded && config.stop_media {
            let stopped = markup::stop_media(doc, transition.content);
            if stopped > 0 {
                debug!(instance = %self.id, stopped, "Stopped media in collapsing panel");
            }
        }
        apply_state(doc, &config, transition.trigger, transition.content, style, expanded);
        let keep_focus = expanded && self.focus_kept == Some(transition.content);
        if keep_focus {
            self.focus_kept = None;
        }
        if expanded && config.focuses_content() && !keep_focus {
            doc.focus(transition.content);
        }

        if config.emit_events {
            doc.dispatch(
                Some(transition.content),
                Notification::transition(
                    kind.into(),
                    Rc::clone(&config),
                    transition.trigger,
                    transition.content,
                ),
            );
        }

        self.hooks.run_after(&transition);
        trace!(instance = %self.id, ?kind, content = transition.content.index(), "Transition applied");
    }

    fn emit_lifecycle<D: DocumentAccess + ?Sized>(&self, doc: &mut D, kind: NotificationKind) {
        if self.config.emit_events {
            doc.dispatch(None, Notification::lifecycle(kind, Rc::clone(&self.config)));
        }
    }
}

fn live_instances<D: DocumentAccess + ?Sized>(doc: &D) -> usize {
    doc.attribute(doc.document_element(), INSTANCE_COUNT_ATTRIBUTE)
        .and_then(|count| count.parse().ok())
        .unwrap_or(0)
}

/// Join the instances holding the init class, adding it for the first one.
/// An authored class is left to the author.
fn claim_init_class<D: DocumentAccess + ?Sized>(doc: &mut D, class: &str) -> bool {
    if class.is_empty() {
        return false;
    }
    let root = doc.document_element();
    let live = live_instances(doc);
    if live == 0 && doc.has_class(root, class) {
        return false;
    }
    doc.add_class(root, class);
    doc.set_attribute(root, INSTANCE_COUNT_ATTRIBUTE, &(live + 1).to_string());
    true
}

/// Leave the instances holding the init class; the last one removes it.
fn release_init_class<D: DocumentAccess + ?Sized>(doc: &mut D, class: &str) {
    let root = doc.document_element();
    match live_instances(doc) {
        0 | 1 => {
            doc.remove_attribute(root, INSTANCE_COUNT_ATTRIBUTE);
            doc.remove_class(root, class);
        }
        live => doc.set_attribute(root, INSTANCE_COUNT_ATTRIBUTE, &(live - 1).to_string()),
    }
}

/// Read a Trigger's state from `aria-expanded`.
fn is_trigger_expanded<D: DocumentAccess + ?Sized>(doc: &D, trigger: NodeId) -> bool {
    doc.attribute(trigger, "aria-expanded").as_deref() == Some("true")
}

/// Write every attribute and class that mirrors a pair's state.
fn apply_state<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    trigger: NodeId,
    content: NodeId,
    style: LabelStyle,
    expanded: bool,
) {
    doc.set_attribute(trigger, "aria-expanded", markup::bool_attr(expanded));
    if let Some(id) = doc.attribute(content, "id") {
        doc.set_attribute(trigger, "aria-controls", &id);
    }
    if expanded {
        doc.add_class(trigger, &config.trigger_active_class);
        doc.add_class(content, &config.expanded_class);
    } else {
        doc.remove_class(trigger, &config.trigger_active_class);
        doc.remove_class(content, &config.expanded_class);
    }
    markup::sync_label(doc, config, trigger, style, expanded);
}

/// Build the bookkeeping for one Content element, synthesizing or adopting
/// its Trigger. `None` leaves the element untouched.
fn prepare_panel<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    content: NodeId,
) -> Option<Panel> {
    let Some(id) = doc
        .attribute(content, "id")
        .and_then(|raw| ContentId::new(raw).ok())
    else {
        debug!(content = content.index(), "Content has no usable id; skipped");
        return None;
    };

    let initially_expanded = doc.has_class(content, &config.expanded_class) || config.expanded;
    let (trigger, origin) = markup::attach_trigger(doc, config, content, &id, initially_expanded)?;

    doc.add_class(content, &config.content_class);
    let added_tabindex = config.btn_after && doc.attribute(content, "tabindex").is_none();
    if added_tabindex {
        doc.set_attribute(content, "tabindex", "-1");
    }
    apply_state(
        doc,
        config,
        trigger,
        content,
        origin.label_style(),
        initially_expanded,
    );

    let group = doc
        .attribute(trigger, &config.group_attribute)
        .and_then(|raw| GroupName::new(raw).ok())
        .map_or(GroupKey::Scope, GroupKey::Named);

    trace!(content = %id, expanded = initially_expanded, ?group, "Panel prepared");
    Some(Panel {
        content,
        id,
        trigger,
        origin,
        initially_expanded,
        added_tabindex,
        group,
    })
}

/// Keep at most one expanded panel per group, first in order wins.
fn normalize_groups<D: DocumentAccess + ?Sized>(doc: &mut D, config: &ToggleConfig, panels: &[Panel]) {
    let mut open_groups: HashSet<&GroupKey> = HashSet::new();
    for panel in panels {
        if !is_trigger_expanded(doc, panel.trigger) {
            continue;
        }
        if !open_groups.insert(&panel.group) {
            debug!(content = %panel.id, "Collapsing extra expanded panel in group");
            apply_state(
                doc,
                config,
                panel.trigger,
                panel.content,
                panel.origin.label_style(),
                false,
            );
        }
    }
}

impl From<TransitionKind> for NotificationKind {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Expand => NotificationKind::Expand,
            TransitionKind::Collapse => NotificationKind::Collapse,
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
