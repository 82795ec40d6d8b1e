//! Tests for the controller state machine and panel bookkeeping.

use super::*;
use crate::dom::{MemoryDocument, NodeSpec};

fn find(doc: &MemoryDocument, raw: &str) -> NodeId {
    doc.element_by_id(&ContentId::new(raw).expect("valid id"))
        .expect("element exists")
}

fn panel_doc(specs: &[NodeSpec]) -> MemoryDocument {
    MemoryDocument::from_specs(specs)
}

fn controller(config: ToggleConfig) -> ToggleController {
    ToggleController::new(Selector::class("panel"), config)
}

// ===== Construction =====

#[test]
fn new_controller_is_inert_until_setup() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let before = doc.render();
    let mut controller = controller(ToggleConfig::default());
    let one = Target::Element(find(&doc, "one"));

    controller.toggle(&mut doc, &one);
    controller.expand(&mut doc, &one);

    assert!(!controller.is_active());
    assert_eq!(controller.panel_count(), 0);
    assert_eq!(controller.is_expanded(&doc, &one), None);
    assert_eq!(doc.render(), before);
}

#[test]
fn instance_ids_differ_between_controllers() {
    let a = controller(ToggleConfig::default());
    let b = controller(ToggleConfig::default());
    assert_ne!(a.id(), b.id());
}

#[test]
fn debug_shows_scope_and_panel_count() {
    let controller = controller(ToggleConfig::default());

    let debug = format!("{:?}", controller);

    assert!(debug.contains(".panel"), "got {}", debug);
    assert!(debug.contains("panels: 0"), "got {}", debug);
}

#[test]
fn transition_kinds_map_to_notifications() {
    assert_eq!(
        NotificationKind::from(TransitionKind::Expand),
        NotificationKind::Expand
    );
    assert_eq!(
        NotificationKind::from(TransitionKind::Collapse),
        NotificationKind::Collapse
    );
}

// ===== Panel Preparation =====

#[test]
fn prepare_panel_skips_content_without_id() {
    let mut doc = panel_doc(&[NodeSpec::new("div").class("panel")]);
    let content = doc
        .query_selector(&Selector::class("panel"))
        .expect("panel exists");

    assert!(prepare_panel(&mut doc, &ToggleConfig::default(), content).is_none());
    assert!(!doc.has_class(content, "houdini"));
}

#[test]
fn prepare_panel_records_marker_state_and_group() {
    let mut doc = panel_doc(&[NodeSpec::new("div")
        .id("one")
        .class("panel is-expanded")
        .attr("data-houdini-group", "faq")]);
    let content = find(&doc, "one");

    let panel =
        prepare_panel(&mut doc, &ToggleConfig::default(), content).expect("panel prepared");

    assert!(panel.initially_expanded);
    assert!(!panel.added_tabindex);
    assert_eq!(
        panel.group,
        GroupKey::Named(GroupName::new("faq").expect("valid group"))
    );
    assert!(is_trigger_expanded(&doc, panel.trigger));
    assert!(doc.has_class(panel.trigger, "active"));
}

#[test]
fn prepare_panel_without_group_uses_scope_group() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let content = find(&doc, "one");

    let panel =
        prepare_panel(&mut doc, &ToggleConfig::default(), content).expect("panel prepared");

    assert_eq!(panel.group, GroupKey::Scope);
    assert!(!panel.initially_expanded);
}

#[test]
fn apply_state_writes_every_mirror() {
    let mut doc = panel_doc(&[
        NodeSpec::new("button").id("t"),
        NodeSpec::new("div").id("c"),
    ]);
    let trigger = find(&doc, "t");
    let content = find(&doc, "c");
    let config = ToggleConfig::default();

    apply_state(&mut doc, &config, trigger, content, LabelStyle::Button, true);

    assert_eq!(doc.attribute(trigger, "aria-expanded").as_deref(), Some("true"));
    assert_eq!(doc.attribute(trigger, "aria-controls").as_deref(), Some("c"));
    assert!(doc.has_class(trigger, "active"));
    assert!(doc.has_class(content, "is-expanded"));
    assert_eq!(doc.text_content(trigger), "Show Less");

    apply_state(&mut doc, &config, trigger, content, LabelStyle::Button, false);

    assert!(!is_trigger_expanded(&doc, trigger));
    assert!(!doc.has_class(trigger, "active"));
    assert!(!doc.has_class(content, "is-expanded"));
    assert_eq!(doc.text_content(trigger), "Show More");
}

#[test]
fn trigger_state_reads_only_true() {
    let doc = panel_doc(&[
        NodeSpec::new("button").id("yes").attr("aria-expanded", "true"),
        NodeSpec::new("button").id("odd").attr("aria-expanded", "TRUE"),
        NodeSpec::new("button").id("none"),
    ]);

    assert!(is_trigger_expanded(&doc, find(&doc, "yes")));
    assert!(!is_trigger_expanded(&doc, find(&doc, "odd")));
    assert!(!is_trigger_expanded(&doc, find(&doc, "none")));
}

// ===== Operations =====

#[test]
fn expand_and_collapse_are_idempotent_on_state() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let mut controller = controller(ToggleConfig::default());
    controller.setup(&mut doc);
    let one = Target::Element(find(&doc, "one"));

    controller.expand(&mut doc, &one);
    controller.expand(&mut doc, &one);
    assert_eq!(controller.is_expanded(&doc, &one), Some(true));

    controller.collapse(&mut doc, &one);
    controller.collapse(&mut doc, &one);
    assert_eq!(controller.is_expanded(&doc, &one), Some(false));
}

#[test]
fn selector_target_resolves_through_trigger() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let mut controller = controller(ToggleConfig::default());
    controller.setup(&mut doc);
    let by_trigger = Target::selector("button[aria-controls=one]").expect("selector parses");

    controller.toggle(&mut doc, &by_trigger);

    let pair = controller.pair(&doc, &by_trigger).expect("pair resolves");
    assert_eq!(pair.1, find(&doc, "one"));
    assert_eq!(controller.is_expanded(&doc, &by_trigger), Some(true));
}

#[test]
fn collapse_group_needs_accordion_with_collapse_others() {
    let mut doc = panel_doc(&[
        NodeSpec::new("div").id("one").class("panel"),
        NodeSpec::new("div").id("two").class("panel"),
    ]);
    let mut controller = controller(ToggleConfig::default());
    controller.setup(&mut doc);
    let one = Target::Element(find(&doc, "one"));
    let two = Target::Element(find(&doc, "two"));
    controller.expand(&mut doc, &one);

    controller.collapse_group(&mut doc, &two);

    assert_eq!(controller.is_expanded(&doc, &one), Some(true));
}

#[test]
fn destroy_removes_added_tabindex_and_content_class() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let mut controller = controller(ToggleConfig {
        btn_after: true,
        ..ToggleConfig::default()
    });
    controller.setup(&mut doc);
    let content = find(&doc, "one");
    assert_eq!(doc.attribute(content, "tabindex").as_deref(), Some("-1"));

    controller.destroy(&mut doc);

    assert_eq!(doc.attribute(content, "tabindex"), None);
    assert_eq!(doc.attribute(content, "class").as_deref(), Some("panel"));
    assert!(!doc.has_class(doc.document_element(), "js-houdini"));
}

#[test]
fn empty_init_class_is_never_added() {
    let mut doc = panel_doc(&[NodeSpec::new("div").id("one").class("panel")]);
    let mut controller = controller(ToggleConfig {
        init_class: String::new(),
        ..ToggleConfig::default()
    });

    controller.setup(&mut doc);

    assert_eq!(doc.attribute(doc.document_element(), "class"), None);
}

#[test]
fn init_class_claims_are_counted_on_the_root() {
    let mut doc = panel_doc(&[]);
    let root = doc.document_element();

    assert!(claim_init_class(&mut doc, "js-houdini"));
    assert!(claim_init_class(&mut doc, "js-houdini"));
    assert_eq!(live_instances(&doc), 2);

    release_init_class(&mut doc, "js-houdini");
    assert!(doc.has_class(root, "js-houdini"));
    assert_eq!(live_instances(&doc), 1);

    release_init_class(&mut doc, "js-houdini");
    assert!(!doc.has_class(root, "js-houdini"));
    assert_eq!(doc.attribute(root, INSTANCE_COUNT_ATTRIBUTE), None);
}

#[test]
fn accordion_focus_stays_on_trigger() {
    let mut doc = panel_doc(&[
        NodeSpec::new("h2").attr("data-houdini-toggle", "one").text("One"),
        NodeSpec::new("div").id("one").class("panel"),
    ]);
    let mut controller = controller(ToggleConfig {
        is_accordion: true,
        btn_after: true,
        ..ToggleConfig::default()
    });
    controller.setup(&mut doc);

    let one = find(&doc, "one");
    controller.expand(&mut doc, &Target::Element(one));

    assert_eq!(doc.active_element(), None);
}
