//! Trigger markup: synthesis, adoption, label updates, media and teardown.

use tracing::debug;

use crate::config::ToggleConfig;
use crate::dom::{DocumentAccess, NodeId, Selector};
use crate::model::ContentId;

/// Attributes of an adopted trigger that the controller writes to.
const TOUCHED_ATTRIBUTES: [&str; 3] = ["aria-expanded", "aria-controls", "class"];

/// Pre-setup values of [`TOUCHED_ATTRIBUTES`], `None` where absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeSnapshot {
    values: Vec<(&'static str, Option<String>)>,
}

impl AttributeSnapshot {
    pub(crate) fn capture<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Self {
        Self {
            values: TOUCHED_ATTRIBUTES
                .iter()
                .map(|name| (*name, doc.attribute(node, name)))
                .collect(),
        }
    }

    pub(crate) fn restore<D: DocumentAccess + ?Sized>(&self, doc: &mut D, node: NodeId) {
        for (name, value) in &self.values {
            match value {
                Some(value) => doc.set_attribute(node, name, value),
                None => doc.remove_attribute(node, name),
            }
        }
    }
}

/// Where a panel's Trigger came from, and therefore how to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TriggerOrigin {
    /// Disclosure button inserted next to the Content.
    Created,
    /// Button wrapped around the children of an accordion heading.
    WrappedHeading { heading: NodeId },
    /// Trigger already present in the markup.
    Adopted { snapshot: AttributeSnapshot },
}

/// How a Trigger's visible label follows its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelStyle {
    /// Text swapped between `btnShow`/`btnHide`, icon appended.
    Button,
    /// Only the icon span changes.
    Icon,
    /// Author-owned markup, left alone.
    Untouched,
}

impl TriggerOrigin {
    pub(crate) fn label_style(&self) -> LabelStyle {
        match self {
            TriggerOrigin::Created => LabelStyle::Button,
            TriggerOrigin::WrappedHeading { .. } => LabelStyle::Icon,
            TriggerOrigin::Adopted { .. } => LabelStyle::Untouched,
        }
    }
}

/// Find or build the Trigger for `content`, according to the mode.
pub(crate) fn attach_trigger<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    content: NodeId,
    id: &ContentId,
    expanded: bool,
) -> Option<(NodeId, TriggerOrigin)> {
    if !config.synthesize_triggers {
        adopt_trigger(doc, config, content, id)
    } else if config.is_accordion {
        wrap_heading(doc, config, content, id, expanded)
    } else {
        insert_button(doc, config, content, id, expanded)
    }
}

fn new_button<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    id: &ContentId,
    expanded: bool,
    group: Option<String>,
) -> NodeId {
    let button = doc.create_element("button");
    doc.set_attribute(button, &config.btn_attribute, id.as_str());
    doc.add_class(button, &config.btn_class);
    doc.set_attribute(button, "aria-expanded", bool_attr(expanded));
    doc.set_attribute(button, "aria-controls", id.as_str());
    if let Some(group) = group {
        doc.set_attribute(button, &config.group_attribute, &group);
    }
    button
}

fn insert_button<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    content: NodeId,
    id: &ContentId,
    expanded: bool,
) -> Option<(NodeId, TriggerOrigin)> {
    let Some(parent) = doc.parent(content) else {
        debug!(content = %id, "Content is detached; no place for a toggle button");
        return None;
    };
    let group = doc.attribute(content, &config.group_attribute);
    let button = new_button(doc, config, id, expanded, group);

    let reference = if config.btn_after {
        doc.next_sibling(content)
    } else {
        Some(content)
    };
    doc.insert_before(parent, button, reference);

    Some((button, TriggerOrigin::Created))
}

fn wrap_heading<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    content: NodeId,
    id: &ContentId,
    expanded: bool,
) -> Option<(NodeId, TriggerOrigin)> {
    let selector = Selector::attribute_value(&config.btn_attribute, id.as_str());
    let Some(heading) = doc
        .query_selector_all(&selector)
        .into_iter()
        .find(|node| *node != content)
    else {
        debug!(content = %id, attribute = %config.btn_attribute, "No accordion heading for content");
        return None;
    };

    let group = doc
        .attribute(heading, &config.group_attribute)
        .or_else(|| doc.attribute(content, &config.group_attribute));

    doc.add_class(heading, &config.heading_class);
    doc.remove_attribute(heading, &config.btn_attribute);

    let button = new_button(doc, config, id, expanded, group);
    for child in doc.children(heading) {
        doc.append_child(button, child);
    }
    if config.shows_icons() {
        let icon = new_icon(doc, config, expanded);
        doc.append_child(button, icon);
    }
    doc.append_child(heading, button);

    Some((button, TriggerOrigin::WrappedHeading { heading }))
}

fn adopt_trigger<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    content: NodeId,
    id: &ContentId,
) -> Option<(NodeId, TriggerOrigin)> {
    let candidates = [
        Selector::attribute_value(&config.btn_attribute, id.as_str()),
        Selector::attribute_value("aria-controls", id.as_str()),
        Selector::attribute_value("href", &id.to_fragment()),
    ];
    let Some(trigger) = candidates.iter().find_map(|selector| {
        doc.query_selector_all(selector)
            .into_iter()
            .find(|node| *node != content)
    }) else {
        debug!(content = %id, "No existing trigger to adopt");
        return None;
    };

    let snapshot = AttributeSnapshot::capture(&*doc, trigger);
    doc.set_attribute(trigger, "aria-controls", id.as_str());

    Some((trigger, TriggerOrigin::Adopted { snapshot }))
}

fn new_icon<D: DocumentAccess + ?Sized>(doc: &mut D, config: &ToggleConfig, expanded: bool) -> NodeId {
    let icon = doc.create_element("span");
    doc.add_class(icon, &config.icon_class);
    doc.set_attribute(icon, &config.icon_attribute, "");
    doc.set_text_content(icon, icon_text(config, expanded));
    icon
}

fn icon_text(config: &ToggleConfig, expanded: bool) -> &str {
    if expanded {
        &config.icon_hide
    } else {
        &config.icon_show
    }
}

pub(crate) fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Bring the Trigger's label and icon in line with `expanded`.
pub(crate) fn sync_label<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    trigger: NodeId,
    style: LabelStyle,
    expanded: bool,
) {
    match style {
        LabelStyle::Button => {
            let label = if expanded {
                &config.btn_hide
            } else {
                &config.btn_show
            };
            let children = doc.children(trigger);
            match children.first() {
                Some(first) if doc.tag_name(*first).is_none() => doc.set_text_content(*first, label),
                first => {
                    let text = doc.create_text(label);
                    doc.insert_before(trigger, text, first.copied());
                }
            }

            if config.shows_icons() {
                let selector = Selector::attribute(&config.icon_attribute);
                let icon = children
                    .into_iter()
                    .find(|child| doc.matches(*child, &selector));
                match icon {
                    Some(icon) => doc.set_text_content(icon, icon_text(config, expanded)),
                    None => {
                        let icon = new_icon(doc, config, expanded);
                        doc.append_child(trigger, icon);
                    }
                }
            }
        }
        LabelStyle::Icon => {
            let selector = Selector::attribute(&config.icon_attribute);
            for icon in doc.query_selector_within(trigger, &selector) {
                doc.set_text_content(icon, icon_text(config, expanded));
            }
        }
        LabelStyle::Untouched => {}
    }
}

/// Pause media and reload frames inside `content`. Returns how many
/// elements were stopped.
pub(crate) fn stop_media<D: DocumentAccess + ?Sized>(doc: &mut D, content: NodeId) -> usize {
    let mut stopped = 0;

    for tag in ["video", "audio"] {
        for media in doc.query_selector_within(content, &Selector::tag(tag)) {
            doc.pause_media(media);
            stopped += 1;
        }
    }

    // Frames have no pause API; reassigning the source reloads the player
    for frame in doc.query_selector_within(content, &Selector::tag("iframe")) {
        if let Some(src) = doc.attribute(frame, "src") {
            doc.set_attribute(frame, "src", &src);
            stopped += 1;
        }
    }

    stopped
}

/// Undo [`attach_trigger`].
pub(crate) fn detach_trigger<D: DocumentAccess + ?Sized>(
    doc: &mut D,
    config: &ToggleConfig,
    trigger: NodeId,
    origin: &TriggerOrigin,
    id: &ContentId,
) {
    match origin {
        TriggerOrigin::Created => doc.remove_node(trigger),
        TriggerOrigin::WrappedHeading { heading } => {
            let icon = Selector::attribute(&config.icon_attribute);
            for child in doc.children(trigger) {
                if doc.matches(child, &icon) {
                    continue;
                }
                doc.insert_before(*heading, child, Some(trigger));
            }
            doc.remove_node(trigger);
            doc.remove_class(*heading, &config.heading_class);
            doc.set_attribute(*heading, &config.btn_attribute, id.as_str());
        }
        TriggerOrigin::Adopted { snapshot } => snapshot.restore(doc, trigger),
    }
}

#[cfg(test)]
#[path = "markup_tests.rs"]
mod tests;
