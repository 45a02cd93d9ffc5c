use crate::mouse_gestures::TargetNode;
use serde::{Deserialize, Serialize};

pub mod dispatch;
pub mod resolver;
pub mod scroll;

pub use dispatch::{run_on_host, ActionHost, ActionReply, RecordingHost};
pub use resolver::{
    ActionKey, ActionResolver, CustomUrl, PendingAction, ResolveError, ResolvedAction,
    CUSTOM_URL_PREFIX, SELECTION_PLACEHOLDER,
};
pub use scroll::{find_scroll_container, ScrollKind, ScrollMetrics};

/// Request forwarded to the single executor of tab- and window-level actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub prevent_context_menu: bool,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }
}

/// Target information captured when a stroke (or shortcut) begins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOption {
    #[serde(default)]
    pub target: Option<TargetNode>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub prevent_context_menu: bool,
    /// Scrollable ancestors of the target, nearest first.
    #[serde(default)]
    pub scroll_chain: Vec<ScrollMetrics>,
}

impl ActionOption {
    /// Build an option bundle from an event target chain ordered from the
    /// target itself outwards.
    pub fn from_target_chain(chain: &[TargetNode]) -> Self {
        Self {
            target: chain.first().cloned(),
            url: chain.iter().find_map(|node| node.href.clone()),
            src: chain.iter().find_map(|node| node.src.clone()),
            prevent_context_menu: false,
            scroll_chain: chain.iter().filter_map(|node| node.scroll).collect(),
        }
    }
}

/// Where an action has to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionSite {
    /// Self-contained, runs in the frame that observed the gesture.
    Frame,
    /// Scrolls the nearest scrollable container, bubbling up one frame
    /// boundary at a time.
    Scroll(ScrollKind),
    /// Tab or window level; runs exactly once at the top frame.
    Authority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAction {
    NewTab,
    CloseTab,
    ReopenClosedTab,
    DuplicateTab,
    ReloadTab,
    StopLoading,
    NextTab,
    PreviousTab,
    GotoPreviousTab,
    GotoPreviousTabLoop,
    GotoNextTab,
    GotoNextTabLoop,
    Back,
    Forward,
    NewWindow,
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
    FullscreenWindow,
    OpenLinkInNewTab,
    OpenLinkInBackgroundTab,
    OpenLinkInNewWindow,
    OpenImageInNewTab,
    UpsertBookmark,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ScrollUp,
    ScrollDown,
    ScrollTop,
    ScrollBottom,
    CopyUrl,
    CopyLinkUrl,
    CopyImageUrl,
    CopyText,
    DisableExtension,
    OpenUrl,
}

const BUILTIN_ACTIONS: &[(&str, BuiltinAction)] = &[
    ("newtab", BuiltinAction::NewTab),
    ("closetab", BuiltinAction::CloseTab),
    ("reopenclosedtab", BuiltinAction::ReopenClosedTab),
    ("duplicatetab", BuiltinAction::DuplicateTab),
    ("reloadtab", BuiltinAction::ReloadTab),
    ("stoploading", BuiltinAction::StopLoading),
    ("nexttab", BuiltinAction::NextTab),
    ("previoustab", BuiltinAction::PreviousTab),
    ("gotoprevioustab", BuiltinAction::GotoPreviousTab),
    ("gotoprevioustabloop", BuiltinAction::GotoPreviousTabLoop),
    ("gotonexttab", BuiltinAction::GotoNextTab),
    ("gotonexttabloop", BuiltinAction::GotoNextTabLoop),
    ("back", BuiltinAction::Back),
    ("forward", BuiltinAction::Forward),
    ("newwindow", BuiltinAction::NewWindow),
    ("closewindow", BuiltinAction::CloseWindow),
    ("minimizewindow", BuiltinAction::MinimizeWindow),
    ("maximizewindow", BuiltinAction::MaximizeWindow),
    ("fullscreenwindow", BuiltinAction::FullscreenWindow),
    ("openlinkinnewtab", BuiltinAction::OpenLinkInNewTab),
    ("openlinkinbackgroundtab", BuiltinAction::OpenLinkInBackgroundTab),
    ("openlinkinnewwindow", BuiltinAction::OpenLinkInNewWindow),
    ("openimageinnewtab", BuiltinAction::OpenImageInNewTab),
    ("upsertbookmark", BuiltinAction::UpsertBookmark),
    ("zoomin", BuiltinAction::ZoomIn),
    ("zoomout", BuiltinAction::ZoomOut),
    ("zoomreset", BuiltinAction::ZoomReset),
    ("scrollup", BuiltinAction::ScrollUp),
    ("scrolldown", BuiltinAction::ScrollDown),
    ("scrolltop", BuiltinAction::ScrollTop),
    ("scrollbottom", BuiltinAction::ScrollBottom),
    ("copyurl", BuiltinAction::CopyUrl),
    ("copylinkurl", BuiltinAction::CopyLinkUrl),
    ("copyimageurl", BuiltinAction::CopyImageUrl),
    ("copytext", BuiltinAction::CopyText),
    ("disableextension", BuiltinAction::DisableExtension),
    ("openurl", BuiltinAction::OpenUrl),
];

impl BuiltinAction {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN_ACTIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, action)| *action)
    }

    pub fn name(self) -> &'static str {
        BUILTIN_ACTIONS
            .iter()
            .find(|(_, action)| *action == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn all() -> impl Iterator<Item = BuiltinAction> {
        BUILTIN_ACTIONS.iter().map(|(_, action)| *action)
    }

    pub fn site(self) -> ExecutionSite {
        match self {
            BuiltinAction::ScrollUp => ExecutionSite::Scroll(ScrollKind::Up),
            BuiltinAction::ScrollDown => ExecutionSite::Scroll(ScrollKind::Down),
            BuiltinAction::ScrollTop => ExecutionSite::Scroll(ScrollKind::Top),
            BuiltinAction::ScrollBottom => ExecutionSite::Scroll(ScrollKind::Bottom),
            BuiltinAction::CopyUrl
            | BuiltinAction::CopyLinkUrl
            | BuiltinAction::CopyImageUrl
            | BuiltinAction::CopyText
            | BuiltinAction::DisableExtension => ExecutionSite::Frame,
            _ => ExecutionSite::Authority,
        }
    }
}
