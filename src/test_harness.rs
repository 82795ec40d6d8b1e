//! Acceptance test harness for controller behavior
//!
//! Wraps a [`Page`] with one installed controller and offers element lookup
//! by id, so acceptance tests read like the user stories they check.

use std::path::Path;

use crate::config::ToggleConfig;
use crate::controller::{ClickEvent, ClickOutcome, ToggleController, TransitionHooks};
use crate::dom::{DocumentAccess, MemoryDocument, NodeId, NodeSpec, Selector};
use crate::model::{ContentId, NotificationKind, Target};
use crate::page::{ControllerHandle, Page};
use crate::scenario::{Scenario, ScenarioError};

/// Test harness for acceptance testing
pub struct AcceptanceTestHarness {
    page: Page,
    handle: ControllerHandle,
}

impl AcceptanceTestHarness {
    /// Load a scenario fixture and set up its controller.
    ///
    /// Only the document, location and options are used; scripted steps are
    /// left to the test.
    pub fn from_fixture(path: &str) -> Result<Self, ScenarioError> {
        Self::from_fixture_with(path, |config| config)
    }

    /// Like [`from_fixture`](Self::from_fixture), adjusting the resolved
    /// options before setup.
    pub fn from_fixture_with(
        path: &str,
        adjust: impl FnOnce(ToggleConfig) -> ToggleConfig,
    ) -> Result<Self, ScenarioError> {
        let scenario = Scenario::load(Path::new(path))?;
        let scope = Selector::parse(&scenario.scope).map_err(|source| {
            ScenarioError::InvalidSelector {
                selector: scenario.scope.clone(),
                source,
            }
        })?;

        let mut document = MemoryDocument::from_specs(&scenario.document);
        if let Some(location) = &scenario.location {
            document.set_location_fragment(location);
        }
        let config = adjust(scenario.resolve_config(ToggleConfig::default()));

        Ok(Self::with_document(document, scope, config, TransitionHooks::new()))
    }

    /// Build a document from `specs` and set up a controller on `scope`.
    pub fn new(specs: &[NodeSpec], scope: &str, config: ToggleConfig) -> Self {
        Self::with_hooks(specs, scope, config, TransitionHooks::new())
    }

    pub fn with_hooks(
        specs: &[NodeSpec],
        scope: &str,
        config: ToggleConfig,
        hooks: TransitionHooks,
    ) -> Self {
        let scope = Selector::parse(scope).expect("test scope selector should parse");
        Self::with_document(MemoryDocument::from_specs(specs), scope, config, hooks)
    }

    fn with_document(
        document: MemoryDocument,
        scope: Selector,
        config: ToggleConfig,
        hooks: TransitionHooks,
    ) -> Self {
        let mut page = Page::new(document);
        let handle = page.install(ToggleController::new(scope, config).with_hooks(hooks));
        Self { page, handle }
    }

    // ===== Lookup =====

    pub fn document(&self) -> &MemoryDocument {
        self.page.document()
    }

    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        self.page.document_mut()
    }

    pub fn controller(&self) -> &ToggleController {
        self.page
            .controller(self.handle)
            .expect("harness controller is installed")
    }

    /// Element carrying `id`.
    pub fn node(&self, id: &str) -> NodeId {
        let content_id = ContentId::new(id).expect("test id should be valid");
        self.document()
            .element_by_id(&content_id)
            .unwrap_or_else(|| panic!("no element with id {:?}", id))
    }

    /// First element matching `selector`.
    pub fn select(&self, selector: &str) -> NodeId {
        let parsed = Selector::parse(selector).expect("test selector should parse");
        self.document()
            .query_selector(&parsed)
            .unwrap_or_else(|| panic!("no element matches {:?}", selector))
    }

    /// Trigger paired with the Content carrying `id`.
    pub fn trigger_for(&self, id: &str) -> NodeId {
        let content = self.node(id);
        self.controller()
            .pair(self.document(), &Target::Element(content))
            .map(|(trigger, _)| trigger)
            .unwrap_or_else(|| panic!("content {:?} has no trigger", id))
    }

    // ===== Interaction =====

    pub fn click(&mut self, node: NodeId) -> ClickOutcome {
        self.page.click(node)
    }

    pub fn dispatch_click(&mut self, event: ClickEvent) -> ClickOutcome {
        self.page.dispatch_click(event)
    }

    /// Plain click on the Trigger of the Content carrying `id`.
    pub fn click_trigger_for(&mut self, id: &str) -> ClickOutcome {
        let trigger = self.trigger_for(id);
        self.click(trigger)
    }

    pub fn toggle_target(&mut self, target: &Target) {
        self.page.toggle(self.handle, target);
    }

    pub fn toggle(&mut self, id: &str) {
        let target = self.id_target(id);
        self.page.toggle(self.handle, &target);
    }

    pub fn expand(&mut self, id: &str) {
        let target = self.id_target(id);
        self.page.expand(self.handle, &target);
    }

    pub fn collapse(&mut self, id: &str) {
        let target = self.id_target(id);
        self.page.collapse(self.handle, &target);
    }

    pub fn collapse_group(&mut self, id: &str) {
        let target = self.id_target(id);
        self.page
            .with_controller(self.handle, |c, doc| c.collapse_group(doc, &target));
    }

    pub fn navigate(&mut self, fragment: &str) {
        self.page.navigate(fragment);
    }

    pub fn focus(&mut self, node: NodeId) {
        self.page.dispatch_focus(node);
    }

    pub fn setup(&mut self) {
        self.page.setup(self.handle);
    }

    pub fn setup_panels(&mut self) -> usize {
        self.page
            .with_controller(self.handle, |c, doc| c.setup_panels(doc))
            .unwrap_or_default()
    }

    pub fn destroy(&mut self) {
        self.page.destroy(self.handle);
    }

    // ===== Inspection =====

    /// Trigger state of the pair addressed by Content id.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.controller()
            .is_expanded(self.document(), &self.id_target(id))
            .unwrap_or_else(|| panic!("{:?} does not resolve to a managed pair", id))
    }

    /// Whether the Content itself carries the expanded class.
    pub fn content_shows_expanded(&self, id: &str) -> bool {
        let class = self.controller().config().expanded_class.clone();
        self.document().has_class(self.node(id), &class)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.document().attribute(node, name)
    }

    pub fn notification_kinds(&self) -> Vec<NotificationKind> {
        self.document()
            .notifications()
            .iter()
            .map(|n| n.notification.kind)
            .collect()
    }

    /// Render the current document to a string.
    pub fn render_to_string(&self) -> String {
        self.document().render()
    }

    fn id_target(&self, id: &str) -> Target {
        Target::id(&ContentId::new(id).expect("test id should be valid"))
    }
}
