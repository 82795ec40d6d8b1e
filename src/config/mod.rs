//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

use serde::{Deserialize, Serialize};

/// Whether accordion/disclosure triggers carry a show/hide icon.
///
/// `Auto` resolves to "icons on" for accordions and "icons off" for simple
/// disclosures; see [`ToggleConfig::shows_icons`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSetting {
    #[default]
    Auto,
    Always,
    Never,
}

/// Resolved options for one controller instance.
///
/// Built once at setup time by layering overrides onto [`Default`], then
/// shared immutably (notifications carry it by `Rc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleConfig {
    // Content
    /// Marker class applied to every managed Content panel.
    pub content_class: String,
    /// Default expanded state for panels without the expanded class.
    pub expanded: bool,
    /// Class toggled on Content to indicate the expanded state.
    pub expanded_class: String,

    // Toggle buttons
    /// Insert synthesized buttons after the Content instead of before it.
    pub btn_after: bool,
    pub btn_class: String,
    /// Attribute naming the Content a Trigger controls.
    pub btn_attribute: String,
    /// Disclosure button label while collapsed.
    pub btn_show: String,
    /// Disclosure button label while expanded.
    pub btn_hide: String,

    // Accordion
    /// Wrap existing headings in buttons and enable group semantics.
    pub is_accordion: bool,
    /// With `is_accordion`, at most one panel per group stays expanded.
    pub collapse_others: bool,
    pub heading_class: String,
    pub icon: IconSetting,
    pub icon_class: String,
    pub icon_attribute: String,
    pub icon_show: String,
    pub icon_hide: String,

    /// Dispatch notifications at all.
    pub emit_events: bool,
    /// Class placed on the document element while the instance is live.
    pub init_class: String,
    /// Pause video and reload frames inside panels that collapse.
    pub stop_media: bool,
    /// Class mirroring the active flag on Triggers; empty disables it.
    pub trigger_active_class: String,
    /// Attribute carrying a Trigger's group name.
    pub group_attribute: String,
    /// Create Triggers during setup; when false, existing ones are adopted.
    pub synthesize_triggers: bool,
    /// Expand panels named by the location fragment.
    pub fragment_routing: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            content_class: "houdini".to_string(),
            expanded: false,
            expanded_class: "is-expanded".to_string(),
            btn_after: false,
            btn_class: "houdini-toggle".to_string(),
            btn_attribute: "data-houdini-toggle".to_string(),
            btn_show: "Show More".to_string(),
            btn_hide: "Show Less".to_string(),
            is_accordion: false,
            collapse_others: false,
            heading_class: "houdini-heading".to_string(),
            icon: IconSetting::Auto,
            icon_class: "houdini-toggle-icon".to_string(),
            icon_attribute: "data-houdini-icon".to_string(),
            icon_show: "+".to_string(),
            icon_hide: "\u{2013}".to_string(),
            emit_events: true,
            init_class: "js-houdini".to_string(),
            stop_media: true,
            trigger_active_class: "active".to_string(),
            group_attribute: "data-houdini-group".to_string(),
            synthesize_triggers: true,
            fragment_routing: false,
        }
    }
}

impl ToggleConfig {
    /// Effective icon visibility.
    ///
    /// `Auto` follows `is_accordion`; `Always`/`Never` are taken literally.
    pub fn shows_icons(&self) -> bool {
        match self.icon {
            IconSetting::Auto => self.is_accordion,
            IconSetting::Always => true,
            IconSetting::Never => false,
        }
    }

    /// Whether expanding one panel collapses the rest of its group.
    pub fn group_collapse_enabled(&self) -> bool {
        self.is_accordion && self.collapse_others
    }

    /// Whether focus moves to Content when it expands.
    pub fn focuses_content(&self) -> bool {
        self.btn_after && !self.is_accordion
    }
}
