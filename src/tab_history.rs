use std::collections::HashMap;

pub type TabId = u32;
pub type WindowId = u32;

pub const DEFAULT_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Previous,
    Next,
}

/// Result of a previous/next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Activate this tab. The resulting activation will not be recorded.
    Activate(TabId),
    /// Nothing to do; the caller should still keep the context menu suppressed.
    Stay,
}

/// Activation history of one browser window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowHistory {
    history: Vec<TabId>,
    /// `None` while sitting at the live end of the history.
    cursor: Option<usize>,
    suppress_next_append: bool,
}

impl WindowHistory {
    pub fn tabs(&self) -> &[TabId] {
        &self.history
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn suppress_next_append(&self) -> bool {
        self.suppress_next_append
    }

    fn trim(&mut self, capacity: usize) {
        if self.history.len() <= capacity {
            return;
        }
        let drain = self.history.len() - capacity;
        self.history.drain(0..drain);
        self.cursor = self.cursor.map(|cursor| cursor.saturating_sub(drain));
    }

    fn remove(&mut self, tab: TabId) -> bool {
        let before = self.history.len();
        self.history.retain(|id| *id != tab);
        if self.history.len() == before {
            return false;
        }
        self.history.dedup();
        self.cursor = None;
        true
    }
}

/// Most-recently-used tab stacks, one per window.
#[derive(Debug, Clone)]
pub struct TabHistoryStore {
    windows: HashMap<WindowId, WindowHistory>,
    capacity: usize,
}

impl Default for TabHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl TabHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        for record in self.windows.values_mut() {
            record.trim(self.capacity);
        }
    }

    pub fn window(&self, window: WindowId) -> Option<&WindowHistory> {
        self.windows.get(&window)
    }

    pub fn history(&self, window: WindowId) -> Vec<TabId> {
        self.windows
            .get(&window)
            .map(|record| record.history.clone())
            .unwrap_or_default()
    }

    pub fn on_activated(&mut self, window: WindowId, tab: TabId) {
        let capacity = self.capacity;
        let record = self.windows.entry(window).or_default();
        if record.suppress_next_append {
            record.suppress_next_append = false;
            tracing::debug!(window, tab, "skipping activation caused by history navigation");
            return;
        }
        if record.history.last() != Some(&tab) {
            record.history.push(tab);
            record.cursor = None;
        }
        record.trim(capacity);
    }

    /// A tab was closed.
    pub fn on_removed(&mut self, window: WindowId, tab: TabId) {
        self.drop_tab(window, tab);
    }

    /// A tab moved to another window.
    pub fn on_detached(&mut self, window: WindowId, tab: TabId) {
        self.drop_tab(window, tab);
    }

    pub fn on_window_removed(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }

    /// Walk the history of `window` one step.
    ///
    /// `is_live` re-validates the target against the browser's current tabs;
    /// a stale target is dropped from the history and nothing is activated.
    pub fn navigate(
        &mut self,
        window: WindowId,
        active: Option<TabId>,
        step: HistoryStep,
        wrap: bool,
        is_live: impl Fn(TabId) -> bool,
    ) -> Navigation {
        let Some(record) = self.windows.get_mut(&window) else {
            return Navigation::Stay;
        };
        let len = record.history.len();
        if len == 0 {
            return Navigation::Stay;
        }

        let current = record.cursor.unwrap_or(len - 1).min(len - 1);
        let next = match step {
            HistoryStep::Previous if current == 0 => {
                if wrap {
                    len - 1
                } else {
                    0
                }
            }
            HistoryStep::Previous => current - 1,
            HistoryStep::Next if current + 1 >= len => {
                if wrap {
                    0
                } else {
                    len - 1
                }
            }
            HistoryStep::Next => current + 1,
        };
        record.cursor = Some(next);

        let target = record.history[next];
        if Some(target) == active {
            return Navigation::Stay;
        }
        if !is_live(target) {
            tracing::debug!(window, tab = target, "history target no longer exists");
            self.drop_tab(window, target);
            return Navigation::Stay;
        }
        record.suppress_next_append = true;
        Navigation::Activate(target)
    }

    /// Forget a pending suppression after the activation it was meant for
    /// did not happen.
    pub fn cancel_suppress(&mut self, window: WindowId) {
        if let Some(record) = self.windows.get_mut(&window) {
            record.suppress_next_append = false;
        }
    }

    fn drop_tab(&mut self, window: WindowId, tab: TabId) {
        let Some(record) = self.windows.get_mut(&window) else {
            return;
        };
        record.remove(tab);
        if record.history.is_empty() {
            self.windows.remove(&window);
        }
    }
}
