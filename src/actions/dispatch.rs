use crate::actions::ActionRequest;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Reply from the executor of a forwarded action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReply {
    /// The caller should keep the native context menu suppressed even though
    /// nothing visible happened (e.g. tab navigation already at a boundary).
    pub suppress_context_menu: bool,
}

/// Single executor for tab- and window-level actions.
///
/// Requests reach a host at most once: only the top frame owns one.
pub trait ActionHost: Send {
    fn execute(&mut self, request: &ActionRequest) -> anyhow::Result<ActionReply>;
}

/// Run `request` on `host`, swallowing host failures.
pub fn run_on_host(host: &mut dyn ActionHost, request: &ActionRequest) -> Option<ActionReply> {
    match host.execute(request) {
        Ok(reply) => {
            tracing::info!(action = %request.action, "executed action");
            Some(reply)
        }
        Err(err) => {
            tracing::warn!(?err, action = %request.action, "action host call failed");
            None
        }
    }
}

/// Host that only records what it was asked to do.
#[derive(Clone, Default)]
pub struct RecordingHost {
    requests: Arc<Mutex<Vec<ActionRequest>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ActionHost for RecordingHost {
    fn execute(&mut self, request: &ActionRequest) -> anyhow::Result<ActionReply> {
        let mut guard = self
            .requests
            .lock()
            .map_err(|_| anyhow::anyhow!("recording host lock poisoned"))?;
        guard.push(request.clone());
        Ok(ActionReply::default())
    }
}
