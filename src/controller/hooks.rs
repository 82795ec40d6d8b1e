//! User hooks around transitions.

use std::fmt;

use serde::Serialize;

use crate::dom::NodeId;

/// Direction of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionKind {
    Expand,
    Collapse,
}

/// A single Trigger/Content state change, as seen by hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub trigger: NodeId,
    pub content: NodeId,
}

type Hook = Box<dyn FnMut(&Transition)>;

/// Optional callbacks run immediately before and after every transition.
///
/// Order per transition: `before`, document mutations, notification,
/// `after`. Open/close-specific callbacks match on [`Transition::kind`].
#[derive(Default)]
pub struct TransitionHooks {
    before: Option<Hook>,
    after: Option<Hook>,
}

impl TransitionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, hook: impl FnMut(&Transition) + 'static) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after(mut self, hook: impl FnMut(&Transition) + 'static) -> Self {
        self.after = Some(Box::new(hook));
        self
    }

    pub(crate) fn run_before(&mut self, transition: &Transition) {
        if let Some(hook) = self.before.as_mut() {
            hook(transition);
        }
    }

    pub(crate) fn run_after(&mut self, transition: &Transition) {
        if let Some(hook) = self.after.as_mut() {
            hook(transition);
        }
    }
}

impl fmt::Debug for TransitionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
