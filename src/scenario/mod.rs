//! Scripted scenarios replayed against an in-memory page.
//!
//! A scenario file is TOML: a scope selector, optional location fragment,
//! `[options]` in the same camelCase keys as the config file, the document
//! as nested `[[document]]` tables, and a list of `[[steps]]`.
//!
//! Steps are `click`, `toggle`, `expand`, `collapse`, `navigate`, `focus`,
//! `play`, `setup` and `destroy`.
//!
//! ```toml
//! scope = ".houdini-panel"
//!
//! [options]
//! isAccordion = true
//!
//! [[document]]
//! tag = "h2"
//! text = "First"
//! attributes = { "data-houdini-toggle" = "content1" }
//!
//! [[steps]]
//! action = "click"
//! target = "[aria-controls=content1]"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigFile, ToggleConfig};
use crate::controller::ToggleController;
use crate::dom::{DocumentAccess, MemoryDocument, NodeId, NodeSpec, Selector, SelectorError};
use crate::model::{NotificationKind, Target};
use crate::page::{ControllerHandle, Page};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse scenario {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Step {step}: selector {selector:?} matches no element")]
    UnknownTarget { step: usize, selector: String },
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    /// Plain primary click on the first element matching `target`.
    Click { target: String },
    Toggle { target: String },
    Expand { target: String },
    Collapse { target: String },
    /// Change the location fragment.
    Navigate { fragment: String },
    /// Move focus to the first element matching `target`.
    Focus { target: String },
    /// Start playback of a media element.
    Play { target: String },
    Setup,
    Destroy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Selector matching the Content panels.
    pub scope: String,
    /// Location fragment in effect before setup.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub options: ConfigFile,
    #[serde(default)]
    pub document: Vec<NodeSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|e| ScenarioError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents).map_err(|e| ScenarioError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Layer this scenario's `[options]` over `base`.
    pub fn resolve_config(&self, base: ToggleConfig) -> ToggleConfig {
        self.options.apply_to(base)
    }
}

/// A notification as recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub kind: NotificationKind,
    /// Id of the Content involved, for transition notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Final state of one Content panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub id: String,
    pub expanded: bool,
}

/// Outcome of replaying a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub markup: String,
    pub location: Option<String>,
    pub panels: Vec<PanelState>,
    pub events: Vec<EventRecord>,
}

/// Build the page, set up a controller with `config`, and run every step.
pub fn run_scenario(
    scenario: &Scenario,
    config: ToggleConfig,
) -> Result<ScenarioReport, ScenarioError> {
    let scope = parse_selector(&scenario.scope)?;

    let mut document = MemoryDocument::from_specs(&scenario.document);
    if let Some(location) = &scenario.location {
        document.set_location_fragment(location);
    }

    let mut page = Page::new(document);
    let expanded_class = config.expanded_class.clone();
    let handle = page.install(ToggleController::new(scope.clone(), config));

    for (index, step) in scenario.steps.iter().enumerate() {
        let step_number = index + 1;
        debug!(step = step_number, ?step, "Replaying step");
        run_step(&mut page, handle, step_number, step)?;
    }

    info!(
        steps = scenario.steps.len(),
        notifications = page.document().notifications().len(),
        "Scenario replayed"
    );
    Ok(report(page.document(), &scope, &expanded_class))
}

fn run_step(
    page: &mut Page,
    handle: ControllerHandle,
    step_number: usize,
    step: &Step,
) -> Result<(), ScenarioError> {
    match step {
        Step::Click { target } => {
            let node = find(page, step_number, target)?;
            page.click(node);
        }
        Step::Toggle { target } => page.toggle(handle, &Target::Selector(parse_selector(target)?)),
        Step::Expand { target } => page.expand(handle, &Target::Selector(parse_selector(target)?)),
        Step::Collapse { target } => {
            page.collapse(handle, &Target::Selector(parse_selector(target)?))
        }
        Step::Navigate { fragment } => page.navigate(fragment),
        Step::Focus { target } => {
            let node = find(page, step_number, target)?;
            page.dispatch_focus(node);
        }
        Step::Play { target } => {
            let node = find(page, step_number, target)?;
            page.document_mut().play_media(node);
        }
        Step::Setup => page.setup(handle),
        Step::Destroy => page.destroy(handle),
    }
    Ok(())
}

fn parse_selector(raw: &str) -> Result<Selector, ScenarioError> {
    Selector::parse(raw).map_err(|source| ScenarioError::InvalidSelector {
        selector: raw.to_string(),
        source,
    })
}

fn find(page: &Page, step: usize, raw: &str) -> Result<NodeId, ScenarioError> {
    let selector = parse_selector(raw)?;
    page.document()
        .query_selector(&selector)
        .ok_or_else(|| ScenarioError::UnknownTarget {
            step,
            selector: raw.to_string(),
        })
}

fn report(doc: &MemoryDocument, scope: &Selector, expanded_class: &str) -> ScenarioReport {
    let panels = doc
        .query_selector_all(scope)
        .into_iter()
        .filter_map(|node| {
            let id = doc.attribute(node, "id")?;
            Some(PanelState {
                id,
                expanded: doc.has_class(node, expanded_class),
            })
        })
        .collect();

    let events = doc
        .notifications()
        .iter()
        .map(|dispatched| EventRecord {
            kind: dispatched.notification.kind,
            content: dispatched
                .notification
                .content
                .and_then(|content| doc.attribute(content, "id")),
        })
        .collect();

    ScenarioReport {
        markup: doc.render(),
        location: doc.location_fragment(),
        panels,
        events,
    }
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
