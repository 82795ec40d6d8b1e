//! State-change notifications emitted by a controller.

use std::rc::Rc;

use serde::Serialize;

use crate::config::ToggleConfig;
use crate::dom::NodeId;

/// Kind of notification, one per lifecycle or transition point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// Markup was added to the panels in scope.
    Setup,
    /// The instance finished initializing and is listening for clicks.
    Initialize,
    Expand,
    Collapse,
    /// The instance was torn down.
    Destroy,
}

impl NotificationKind {
    /// DOM event type used when dispatching to a browser document.
    pub fn event_name(self) -> &'static str {
        match self {
            NotificationKind::Setup => "houdiniSetup",
            NotificationKind::Initialize => "houdiniInitialize",
            NotificationKind::Expand => "houdiniExpand",
            NotificationKind::Collapse => "houdiniCollapse",
            NotificationKind::Destroy => "houdiniDestroy",
        }
    }
}

/// Payload delivered to notification listeners.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Resolved configuration of the emitting instance.
    pub config: Rc<ToggleConfig>,
    pub trigger: Option<NodeId>,
    pub content: Option<NodeId>,
}

impl Notification {
    /// Lifecycle notification carrying only the configuration.
    pub fn lifecycle(kind: NotificationKind, config: Rc<ToggleConfig>) -> Self {
        Self {
            kind,
            config,
            trigger: None,
            content: None,
        }
    }

    /// Transition notification for a Trigger/Content pair.
    pub fn transition(
        kind: NotificationKind,
        config: Rc<ToggleConfig>,
        trigger: NodeId,
        content: NodeId,
    ) -> Self {
        Self {
            kind,
            config,
            trigger: Some(trigger),
            content: Some(content),
        }
    }
}
