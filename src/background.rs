//! Top-level executor for tab- and window-level actions.
//!
//! A [`Background`] owns the [`TabHistoryStore`], consumes the browser's tab
//! events and turns forwarded [`ActionRequest`]s into [`BrowserCommand`]s.

use crate::actions::{ActionHost, ActionReply, ActionRequest, BuiltinAction, ExecutionSite};
use crate::tab_history::{HistoryStep, Navigation, TabHistoryStore, TabId, WindowId};
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomChange {
    In,
    Out,
    Reset,
}

/// Host operation issued on behalf of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BrowserCommand {
    CreateTab { url: Option<String>, active: bool },
    CloseTab,
    RestoreClosedTab,
    DuplicateTab,
    Reload,
    StopLoading,
    /// Activate the tab `offset` positions away in tab-strip order.
    CycleTab { offset: i32 },
    HistoryBack,
    HistoryForward,
    CreateWindow { url: Option<String> },
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
    FullscreenWindow,
    UpsertBookmark,
    Zoom { change: ZoomChange },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TabEvent {
    Activated { window: WindowId, tab: TabId },
    Removed { window: WindowId, tab: TabId },
    Detached { window: WindowId, tab: TabId },
    WindowRemoved { window: WindowId },
}

/// Browser operations the executor needs.
pub trait BrowserHost: Send {
    fn active_tab(&self, window: WindowId) -> anyhow::Result<Option<TabId>>;
    fn tab_exists(&self, tab: TabId) -> bool;
    fn activate_tab(&mut self, window: WindowId, tab: TabId) -> anyhow::Result<()>;
    fn run(&mut self, window: WindowId, tab: TabId, command: BrowserCommand)
        -> anyhow::Result<()>;

    /// Tab events produced since the last call.
    fn take_events(&mut self) -> Vec<TabEvent> {
        Vec::new()
    }
}

pub struct Background<B> {
    browser: B,
    history: TabHistoryStore,
}

impl<B: BrowserHost> Background<B> {
    pub fn new(browser: B, history_size: usize) -> Self {
        Self {
            browser,
            history: TabHistoryStore::new(history_size),
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn history(&self) -> &TabHistoryStore {
        &self.history
    }

    pub fn set_history_size(&mut self, size: usize) {
        self.history.set_capacity(size);
    }

    pub fn handle_event(&mut self, event: TabEvent) {
        match event {
            TabEvent::Activated { window, tab } => self.history.on_activated(window, tab),
            TabEvent::Removed { window, tab } => self.history.on_removed(window, tab),
            TabEvent::Detached { window, tab } => self.history.on_detached(window, tab),
            TabEvent::WindowRemoved { window } => self.history.on_window_removed(window),
        }
    }

    /// Feed every pending browser event into the history store.
    pub fn sync_events(&mut self) {
        for event in self.browser.take_events() {
            self.handle_event(event);
        }
    }

    /// Execute `request` for the tab it came from.
    pub fn execute(
        &mut self,
        window: WindowId,
        tab: TabId,
        request: &ActionRequest,
    ) -> anyhow::Result<ActionReply> {
        self.sync_events();
        let builtin = BuiltinAction::from_name(&request.action)
            .ok_or_else(|| anyhow!("unknown action '{}'", request.action))?;
        if builtin.site() != ExecutionSite::Authority {
            bail!("'{}' runs inside the page", request.action);
        }

        let command = match builtin {
            BuiltinAction::GotoPreviousTab => {
                return self.step_history(window, HistoryStep::Previous, false)
            }
            BuiltinAction::GotoPreviousTabLoop => {
                return self.step_history(window, HistoryStep::Previous, true)
            }
            BuiltinAction::GotoNextTab => return self.step_history(window, HistoryStep::Next, false),
            BuiltinAction::GotoNextTabLoop => {
                return self.step_history(window, HistoryStep::Next, true)
            }
            BuiltinAction::NewTab => BrowserCommand::CreateTab {
                url: None,
                active: true,
            },
            BuiltinAction::CloseTab => BrowserCommand::CloseTab,
            BuiltinAction::ReopenClosedTab => BrowserCommand::RestoreClosedTab,
            BuiltinAction::DuplicateTab => BrowserCommand::DuplicateTab,
            BuiltinAction::ReloadTab => BrowserCommand::Reload,
            BuiltinAction::StopLoading => BrowserCommand::StopLoading,
            BuiltinAction::NextTab => BrowserCommand::CycleTab { offset: 1 },
            BuiltinAction::PreviousTab => BrowserCommand::CycleTab { offset: -1 },
            BuiltinAction::Back => BrowserCommand::HistoryBack,
            BuiltinAction::Forward => BrowserCommand::HistoryForward,
            BuiltinAction::NewWindow => BrowserCommand::CreateWindow { url: None },
            BuiltinAction::CloseWindow => BrowserCommand::CloseWindow,
            BuiltinAction::MinimizeWindow => BrowserCommand::MinimizeWindow,
            BuiltinAction::MaximizeWindow => BrowserCommand::MaximizeWindow,
            BuiltinAction::FullscreenWindow => BrowserCommand::FullscreenWindow,
            BuiltinAction::OpenLinkInNewTab | BuiltinAction::OpenUrl => BrowserCommand::CreateTab {
                url: Some(required(&request.url, "link")?),
                active: true,
            },
            BuiltinAction::OpenLinkInBackgroundTab => BrowserCommand::CreateTab {
                url: Some(required(&request.url, "link")?),
                active: false,
            },
            BuiltinAction::OpenLinkInNewWindow => BrowserCommand::CreateWindow {
                url: Some(required(&request.url, "link")?),
            },
            BuiltinAction::OpenImageInNewTab => BrowserCommand::CreateTab {
                url: Some(required(&request.src, "image")?),
                active: true,
            },
            BuiltinAction::UpsertBookmark => BrowserCommand::UpsertBookmark,
            BuiltinAction::ZoomIn => BrowserCommand::Zoom {
                change: ZoomChange::In,
            },
            BuiltinAction::ZoomOut => BrowserCommand::Zoom {
                change: ZoomChange::Out,
            },
            BuiltinAction::ZoomReset => BrowserCommand::Zoom {
                change: ZoomChange::Reset,
            },
            other => bail!("'{}' has no browser command", other.name()),
        };

        self.browser.run(window, tab, command)?;
        Ok(ActionReply::default())
    }

    fn step_history(
        &mut self,
        window: WindowId,
        step: HistoryStep,
        wrap: bool,
    ) -> anyhow::Result<ActionReply> {
        let active = self.browser.active_tab(window)?;
        let browser = &self.browser;
        let navigation = self
            .history
            .navigate(window, active, step, wrap, |tab| browser.tab_exists(tab));
        match navigation {
            Navigation::Activate(target) => {
                tracing::debug!(window, tab = target, ?step, "activating tab from history");
                if let Err(err) = self.browser.activate_tab(window, target) {
                    self.history.cancel_suppress(window);
                    return Err(err);
                }
                self.sync_events();
                Ok(ActionReply::default())
            }
            Navigation::Stay => Ok(ActionReply {
                suppress_context_menu: true,
            }),
        }
    }
}

fn required(value: &Option<String>, what: &str) -> anyhow::Result<String> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("no {what} under the gesture"))
}

/// [`ActionHost`] for the top frame of one tab, backed by a shared
/// [`Background`].
pub struct TabBinding<B> {
    background: Arc<Mutex<Background<B>>>,
    window: WindowId,
    tab: TabId,
}

impl<B> TabBinding<B> {
    pub fn new(background: Arc<Mutex<Background<B>>>, window: WindowId, tab: TabId) -> Self {
        Self {
            background,
            window,
            tab,
        }
    }
}

impl<B: BrowserHost> ActionHost for TabBinding<B> {
    fn execute(&mut self, request: &ActionRequest) -> anyhow::Result<ActionReply> {
        let mut background = self
            .background
            .lock()
            .map_err(|_| anyhow!("background lock poisoned"))?;
        background.execute(self.window, self.tab, request)
    }
}

/// In-memory browser used by tests and the replay binary.
#[derive(Debug, Default, Clone)]
pub struct MockBrowser {
    windows: BTreeMap<WindowId, Vec<TabId>>,
    active: BTreeMap<WindowId, TabId>,
    next_tab: TabId,
    commands: Vec<(WindowId, TabId, BrowserCommand)>,
    events: VecDeque<TabEvent>,
    failing: bool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and focus a new tab in `window`.
    pub fn open_tab(&mut self, window: WindowId) -> TabId {
        self.next_tab += 1;
        let tab = self.next_tab;
        self.windows.entry(window).or_default().push(tab);
        self.focus(window, tab);
        tab
    }

    /// User-driven activation.
    pub fn focus(&mut self, window: WindowId, tab: TabId) {
        self.active.insert(window, tab);
        self.events.push_back(TabEvent::Activated { window, tab });
    }

    pub fn close_tab(&mut self, window: WindowId, tab: TabId) {
        let Some(tabs) = self.windows.get_mut(&window) else {
            return;
        };
        tabs.retain(|id| *id != tab);
        let fallback = tabs.last().copied();
        self.events.push_back(TabEvent::Removed { window, tab });
        if self.active.get(&window) == Some(&tab) {
            self.active.remove(&window);
            if let Some(next) = fallback {
                self.focus(window, next);
            }
        }
    }

    pub fn close_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
        self.active.remove(&window);
        self.events.push_back(TabEvent::WindowRemoved { window });
    }

    /// Make every subsequent [`BrowserHost::run`] and
    /// [`BrowserHost::activate_tab`] call fail.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn tabs(&self, window: WindowId) -> &[TabId] {
        self.windows.get(&window).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn current_tab(&self, window: WindowId) -> Option<TabId> {
        self.active.get(&window).copied()
    }

    pub fn commands(&self) -> &[(WindowId, TabId, BrowserCommand)] {
        &self.commands
    }
}

impl BrowserHost for MockBrowser {
    fn active_tab(&self, window: WindowId) -> anyhow::Result<Option<TabId>> {
        Ok(self.current_tab(window))
    }

    fn tab_exists(&self, tab: TabId) -> bool {
        self.windows.values().any(|tabs| tabs.contains(&tab))
    }

    fn activate_tab(&mut self, window: WindowId, tab: TabId) -> anyhow::Result<()> {
        if self.failing {
            bail!("browser refused to activate tab {tab}");
        }
        if !self.tabs(window).contains(&tab) {
            bail!("tab {tab} is not in window {window}");
        }
        self.focus(window, tab);
        Ok(())
    }

    fn run(
        &mut self,
        window: WindowId,
        tab: TabId,
        command: BrowserCommand,
    ) -> anyhow::Result<()> {
        if self.failing {
            bail!("browser rejected {command:?}");
        }
        self.commands.push((window, tab, command));
        Ok(())
    }

    fn take_events(&mut self) -> Vec<TabEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_activation_is_not_recorded() {
        let mut browser = MockBrowser::new();
        let a = browser.open_tab(1);
        let b = browser.open_tab(1);
        let mut background = Background::new(browser, 10);
        background.sync_events();
        assert_eq!(background.history().history(1), vec![a, b]);

        let reply = background
            .execute(1, b, &ActionRequest::new("gotoprevioustab"))
            .unwrap();
        assert!(!reply.suppress_context_menu);
        assert_eq!(background.browser().current_tab(1), Some(a));
        assert_eq!(background.history().history(1), vec![a, b]);
    }

    #[test]
    fn failed_history_activation_keeps_recording() {
        let mut browser = MockBrowser::new();
        let a = browser.open_tab(1);
        let b = browser.open_tab(1);
        let mut background = Background::new(browser, 10);
        background.sync_events();

        background.browser_mut().set_failing(true);
        assert!(background
            .execute(1, b, &ActionRequest::new("gotoprevioustab"))
            .is_err());
        assert_eq!(background.browser().current_tab(1), Some(b));
        assert!(!background.history().window(1).unwrap().suppress_next_append());

        background.browser_mut().set_failing(false);
        let c = background.browser_mut().open_tab(1);
        background.sync_events();
        assert_eq!(background.history().history(1), vec![a, b, c]);
    }

    #[test]
    fn page_level_actions_are_rejected() {
        let mut background = Background::new(MockBrowser::new(), 10);
        assert!(background
            .execute(1, 1, &ActionRequest::new("scrolldown"))
            .is_err());
        assert!(background.execute(1, 1, &ActionRequest::new("nope")).is_err());
    }
}
