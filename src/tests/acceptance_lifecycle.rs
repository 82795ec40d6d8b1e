//! Acceptance tests for setup, teardown, notifications and hooks

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::config::ToggleConfig;
use crate::controller::{ToggleController, TransitionHooks, TransitionKind};
use crate::dom::{DocumentAccess, ListenerKind, MemoryDocument, NodeSpec, Selector};
use crate::model::{NotificationKind, Target};
use crate::page::Page;
use crate::scenario::Scenario;
use crate::test_harness::AcceptanceTestHarness;

// ===== Test Fixtures =====

const DISCLOSURE_FIXTURE: &str = "tests/fixtures/disclosure.toml";

fn harness() -> AcceptanceTestHarness {
    AcceptanceTestHarness::from_fixture(DISCLOSURE_FIXTURE).expect("Should load disclosure fixture")
}

fn authored_markup() -> String {
    let scenario =
        Scenario::load(Path::new(DISCLOSURE_FIXTURE)).expect("Should load disclosure fixture");
    MemoryDocument::from_specs(&scenario.document).render()
}

fn disclosure(id: &str) -> NodeSpec {
    NodeSpec::new("div").id(id).class("disclosure").text("Body")
}

// ===== Teardown =====

#[test]
fn destroy_twice_is_a_no_op() {
    // GIVEN: a set-up instance
    let mut harness = harness();

    // WHEN: destroyed twice
    harness.destroy();
    let after_first = harness.render_to_string();
    let notifications_after_first = harness.notification_kinds().len();
    harness.destroy();

    // THEN: the second call changed nothing
    assert_eq!(harness.render_to_string(), after_first);
    assert_eq!(harness.notification_kinds().len(), notifications_after_first);
    assert!(!harness.controller().is_active());
}

#[test]
fn destroy_restores_authored_markup() {
    let mut harness = harness();
    harness.toggle("show-me");

    harness.destroy();

    assert_eq!(harness.render_to_string(), authored_markup());
    assert!(harness.document().listeners(ListenerKind::Click).is_empty());
}

#[test]
fn destroy_restores_state_recorded_at_setup() {
    // GIVEN: a panel opened by the `expanded` option
    let mut harness = AcceptanceTestHarness::from_fixture_with(DISCLOSURE_FIXTURE, |config| {
        ToggleConfig {
            expanded: true,
            ..config
        }
    })
    .expect("Should load disclosure fixture");

    // WHEN: it is toggled several times, ending closed, and destroyed
    harness.toggle("show-me");
    harness.toggle("show-me");
    harness.toggle("show-me");
    assert!(!harness.content_shows_expanded("show-me"));
    harness.destroy();

    // THEN: it is expanded again
    assert!(harness.content_shows_expanded("show-me"));
}

#[test]
fn setup_after_destroy_starts_over() {
    let mut harness = harness();
    harness.destroy();

    harness.setup();

    assert!(harness.controller().is_active());
    assert_eq!(harness.controller().panel_count(), 1);
    harness.click_trigger_for("show-me");
    assert!(harness.is_expanded("show-me"));
}

#[test]
fn preexisting_init_class_survives_destroy() {
    let mut document = MemoryDocument::from_specs(&[disclosure("show-me")]);
    let root = document.document_element();
    document.add_class(root, "js-houdini");
    let mut page = Page::new(document);
    let handle = page.install(ToggleController::new(
        Selector::class("disclosure"),
        ToggleConfig::default(),
    ));

    page.destroy(handle);

    assert!(page.document().has_class(root, "js-houdini"));
}

#[test]
fn init_class_stays_until_last_instance_is_destroyed() {
    // GIVEN: two controllers on one page, each with its own markers
    let mut page = Page::new(MemoryDocument::from_specs(&[
        NodeSpec::new("div").id("first").class("p").text("First"),
        NodeSpec::new("div").id("second").class("q").text("Second"),
    ]));
    let authored = page.document().render();
    let root = page.document().document_element();
    let first = page.install(ToggleController::new(
        Selector::class("p"),
        ToggleConfig {
            content_class: "houdini-p".to_string(),
            btn_attribute: "data-toggle-p".to_string(),
            ..ToggleConfig::default()
        },
    ));
    let second = page.install(ToggleController::new(
        Selector::class("q"),
        ToggleConfig {
            content_class: "houdini-q".to_string(),
            btn_attribute: "data-toggle-q".to_string(),
            ..ToggleConfig::default()
        },
    ));

    // WHEN: the controller that added the class goes first
    page.destroy(first);

    // THEN: the class stays for the live one
    assert!(
        page.document().has_class(root, "js-houdini"),
        "Init class must stay while another instance is set up"
    );

    // WHEN: the last instance is destroyed
    page.destroy(second);

    // THEN: the document is back to its authored markup
    assert!(!page.document().has_class(root, "js-houdini"));
    assert_eq!(page.document().render(), authored);
}

#[test]
fn authored_init_class_is_not_counted() {
    let mut document = MemoryDocument::from_specs(&[disclosure("show-me")]);
    let root = document.document_element();
    document.add_class(root, "js-houdini");
    let mut page = Page::new(document);

    page.install(ToggleController::new(
        Selector::class("disclosure"),
        ToggleConfig::default(),
    ));

    assert_eq!(page.document().attribute(root, "data-houdini-instances"), None);
}

// ===== Setup =====

#[test]
fn unsupported_document_stays_untouched() {
    let mut document = MemoryDocument::from_specs(&[disclosure("show-me")]);
    document.set_supports_required_features(false);
    let before = document.render();
    let mut page = Page::new(document);

    let handle = page.install(ToggleController::new(
        Selector::class("disclosure"),
        ToggleConfig::default(),
    ));

    let controller = page.controller(handle).expect("installed");
    assert!(!controller.is_active());
    assert_eq!(page.document().render(), before);
    assert!(page.document().listeners(ListenerKind::Click).is_empty());
    assert!(page.document().notifications().is_empty());
}

#[test]
fn setup_panels_picks_up_late_content_once() {
    let mut harness = harness();
    let body = harness.document().body();
    harness.document_mut().build(body, &disclosure("late"));

    assert_eq!(harness.setup_panels(), 1);
    assert_eq!(harness.setup_panels(), 0);

    harness.toggle("late");
    assert!(harness.is_expanded("late"));
    assert!(!harness.is_expanded("show-me"));
}

#[test]
fn repeated_setup_does_not_reinitialize() {
    let mut harness = harness();

    harness.setup();

    let initializations = harness
        .notification_kinds()
        .into_iter()
        .filter(|kind| *kind == NotificationKind::Initialize)
        .count();
    assert_eq!(initializations, 1);
    assert_eq!(harness.document().listeners(ListenerKind::Click).len(), 1);
}

#[test]
fn content_without_id_is_skipped() {
    let specs = [
        NodeSpec::new("div").class("disclosure").text("No id"),
        disclosure("show-me"),
    ];

    let harness = AcceptanceTestHarness::new(&specs, ".disclosure", ToggleConfig::default());

    assert_eq!(harness.controller().panel_count(), 1);
}

#[test]
fn content_leaving_scope_is_ignored() {
    let mut harness = harness();
    let content = harness.node("show-me");
    let trigger = harness.trigger_for("show-me");
    harness.document_mut().remove_class(content, "disclosure");

    harness.toggle_target(&Target::Element(content));
    harness.click(trigger);

    assert_eq!(harness.attribute(trigger, "aria-expanded").as_deref(), Some("false"));
}

// ===== Notifications =====

#[test]
fn notifications_follow_the_lifecycle() {
    let mut harness = harness();

    harness.toggle("show-me");
    harness.toggle("show-me");
    harness.destroy();

    assert_eq!(
        harness.notification_kinds(),
        vec![
            NotificationKind::Setup,
            NotificationKind::Initialize,
            NotificationKind::Expand,
            NotificationKind::Collapse,
            NotificationKind::Destroy,
        ]
    );
}

#[test]
fn emit_events_disabled_sends_nothing() {
    let mut harness = AcceptanceTestHarness::from_fixture_with(DISCLOSURE_FIXTURE, |config| {
        ToggleConfig {
            emit_events: false,
            ..config
        }
    })
    .expect("Should load disclosure fixture");

    harness.toggle("show-me");
    harness.destroy();

    assert!(harness.notification_kinds().is_empty());
}

#[test]
fn transition_notifications_bubble_from_content() {
    let mut harness = harness();
    let content = harness.node("show-me");
    let trigger = harness.trigger_for("show-me");
    let on_content = Rc::new(RefCell::new(Vec::new()));
    let on_document = Rc::new(RefCell::new(Vec::new()));

    let seen = Rc::clone(&on_content);
    harness
        .document_mut()
        .add_notification_listener(Some(content), move |_, n| {
            seen.borrow_mut().push((n.kind, n.trigger, n.content));
        });
    let seen = Rc::clone(&on_document);
    harness
        .document_mut()
        .add_notification_listener(None, move |_, n| seen.borrow_mut().push(n.kind));

    harness.toggle("show-me");
    harness.destroy();

    assert_eq!(
        *on_content.borrow(),
        vec![(NotificationKind::Expand, Some(trigger), Some(content))]
    );
    assert_eq!(
        *on_document.borrow(),
        vec![NotificationKind::Expand, NotificationKind::Destroy]
    );
}

#[test]
fn notification_carries_resolved_config() {
    let mut harness = AcceptanceTestHarness::from_fixture_with(DISCLOSURE_FIXTURE, |config| {
        ToggleConfig {
            btn_class: "custom-toggle".to_string(),
            ..config
        }
    })
    .expect("Should load disclosure fixture");

    harness.toggle("show-me");

    let last = harness
        .document()
        .notifications()
        .last()
        .expect("expand was dispatched");
    assert_eq!(last.notification.config.btn_class, "custom-toggle");
    assert_eq!(last.target, Some(harness.node("show-me")));
}

// ===== Hooks =====

#[test]
fn hooks_wrap_dom_changes_and_notification() {
    // GIVEN: before/after hooks and a notification listener, all logging
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let before_log = Rc::clone(&log);
    let after_log = Rc::clone(&log);
    let hooks = TransitionHooks::new()
        .before(move |t| before_log.borrow_mut().push(format!("before {:?}", t.kind)))
        .after(move |t| after_log.borrow_mut().push(format!("after {:?}", t.kind)));
    let mut harness = AcceptanceTestHarness::with_hooks(
        &[disclosure("show-me")],
        ".disclosure",
        ToggleConfig::default(),
        hooks,
    );
    let listener_log = Rc::clone(&log);
    harness
        .document_mut()
        .add_notification_listener(None, move |doc, n| {
            let content = n.content.expect("transition names its content");
            let open = doc.has_class(content, "is-expanded");
            listener_log
                .borrow_mut()
                .push(format!("notify {:?} open={}", n.kind, open));
        });

    // WHEN: toggled open then closed
    harness.toggle("show-me");
    harness.toggle("show-me");

    // THEN: each transition runs before, DOM, notification, after
    assert_eq!(
        *log.borrow(),
        vec![
            "before Expand",
            "notify Expand open=true",
            "after Expand",
            "before Collapse",
            "notify Collapse open=false",
            "after Collapse",
        ]
    );
}

#[test]
fn hooks_receive_the_pair() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let hooks = TransitionHooks::new().after(move |t| sink.borrow_mut().push(*t));
    let mut harness = AcceptanceTestHarness::with_hooks(
        &[disclosure("show-me")],
        ".disclosure",
        ToggleConfig::default(),
        hooks,
    );
    let trigger = harness.trigger_for("show-me");
    let content = harness.node("show-me");

    harness.click(trigger);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, TransitionKind::Expand);
    assert_eq!(seen[0].trigger, trigger);
    assert_eq!(seen[0].content, content);
}
