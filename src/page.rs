//! Frames of one page, wired together over a single [`FrameBus`].
//!
//! Each [`ContentFrame`] combines a [`GestureTracker`], its replica of the
//! shared state and the action resolver. A [`Page`] owns the frame tree and
//! pumps the bus cooperatively: one delivery at a time, in FIFO order.

use crate::actions::{
    find_scroll_container, run_on_host, ActionHost, ActionRequest, ActionResolver,
    BuiltinAction, ExecutionSite, PendingAction, ResolvedAction, ScrollKind, ScrollMetrics,
};
use crate::frames::{
    CrossFrameSync, Delivery, Envelope, FrameBus, FrameId, FrameMessage, FramePort,
    SharedGestureState,
};
use crate::mouse_gestures::{GestureEvent, GestureTracker, Point, TrackerEffect};
use crate::settings::{KillSwitch, Settings};
use anyhow::{anyhow, bail};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const ROOT_FRAME: FrameId = 0;

/// Upper bound on deliveries handled by one [`Page::pump`] call.
const MAX_PUMP_STEPS: usize = 10_000;

const STALE_CONTEXT_NOTICE: &str =
    "Gestures were updated or reloaded. Reload this page to keep using them.";

/// Liveness of the extension instance the frames belong to.
#[derive(Debug)]
pub struct ExtensionContext {
    valid: AtomicBool,
}

impl Default for ExtensionContext {
    fn default() -> Self {
        Self {
            valid: AtomicBool::new(true),
        }
    }
}

impl ExtensionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails once the extension has been reloaded underneath the page.
    pub fn probe(&self) -> anyhow::Result<()> {
        if self.valid.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(anyhow!("extension context invalidated"))
        }
    }

    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }
}

/// Something a frame asks its host document to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum FrameOutput {
    PreventDefault,
    AllowContextMenu,
    DrawTrail { from: Point, to: Point },
    ClearTrail,
    ShowProgress { arrows: String },
    /// Blocking user-facing message.
    Notice { message: String },
    WriteClipboard { text: String },
    /// Scroll the ancestor at `depth` in the target's scroll chain.
    ScrollElement { depth: usize, kind: ScrollKind },
    ScrollViewport { kind: ScrollKind },
}

pub struct ContentFrame {
    url: String,
    sync: CrossFrameSync,
    tracker: GestureTracker,
    resolver: ActionResolver,
    context: Arc<ExtensionContext>,
    /// Only the top frame has one.
    host: Option<Box<dyn ActionHost>>,
    /// Scroll chain around each child frame's embedding element.
    embedders: HashMap<FrameId, Vec<ScrollMetrics>>,
    outputs: Vec<FrameOutput>,
    stale_notified: bool,
}

impl ContentFrame {
    pub fn new(
        port: FramePort,
        url: &str,
        settings: &Settings,
        context: Arc<ExtensionContext>,
    ) -> Self {
        Self {
            url: url.to_string(),
            sync: CrossFrameSync::new(port),
            tracker: GestureTracker::new(settings.tracker_config()),
            resolver: settings.resolver(),
            context,
            host: None,
            embedders: HashMap::new(),
            outputs: Vec::new(),
            stale_notified: false,
        }
    }

    pub fn with_host(mut self, host: Box<dyn ActionHost>) -> Self {
        if self.sync.is_root() {
            self.host = Some(host);
        } else {
            tracing::warn!(frame = self.id(), "ignoring action host for a nested frame");
        }
        self
    }

    /// Evaluate the kill switch and announce the frame to the root.
    pub fn load(&mut self, kill_switch: &KillSwitch) {
        if kill_switch.matches(&self.url) {
            tracing::info!(frame = self.id(), url = %self.url, "gestures disabled for this page");
            self.sync.disable();
        }
        self.sync.register();
    }

    pub fn id(&self) -> FrameId {
        self.sync.id()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_root(&self) -> bool {
        self.sync.is_root()
    }

    pub fn state(&self) -> &SharedGestureState {
        self.sync.state()
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    pub fn sync_targets(&self) -> &[FrameId] {
        self.sync.sync_targets()
    }

    pub fn outputs(&self) -> &[FrameOutput] {
        &self.outputs
    }

    pub fn take_outputs(&mut self) -> Vec<FrameOutput> {
        std::mem::take(&mut self.outputs)
    }

    pub fn add_child(&mut self, child: FrameId, embedder: Vec<ScrollMetrics>) {
        self.embedders.insert(child, embedder);
    }

    pub fn handle_event(&mut self, event: &GestureEvent) {
        if !self.sync.state().enabled_extension {
            return;
        }
        if let Err(err) = self.context.probe() {
            self.abandon(err);
            return;
        }
        let tracker = &mut self.tracker;
        let effects = self.sync.update(|state| tracker.handle(event, state));
        self.apply(effects);
    }

    pub fn deliver(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Message { payload, .. } => self.receive(&payload),
            Delivery::Deferred { action, .. } => self.run_deferred(action),
        }
    }

    pub fn receive(&mut self, payload: &Value) {
        let Some(message) = Envelope::decode(payload, self.sync.port().extension_id()) else {
            return;
        };
        tracing::debug!(frame = self.id(), ?message, "frame message");
        match message {
            FrameMessage::Register { frame } => self.sync.on_register(frame),
            FrameMessage::SyncState { origin, state } => {
                let outcome = self.sync.on_sync_state(origin, state);
                if self.is_root() {
                    if let Some(arrows) = outcome.progress {
                        self.outputs.push(FrameOutput::ShowProgress { arrows });
                    }
                    if outcome.gesture_ended {
                        let effects = self.tracker.reset();
                        self.apply(effects);
                    }
                }
            }
            FrameMessage::ShowProgress { arrows } => {
                self.outputs.push(FrameOutput::ShowProgress { arrows })
            }
            FrameMessage::Reset => {
                let effects = self.tracker.reset();
                self.apply(effects);
            }
            FrameMessage::ExecuteAction { from, request } => self.on_execute_action(from, request),
            FrameMessage::Disable { origin } => {
                self.sync.on_disable(origin);
                let effects = self.tracker.reset();
                self.apply(effects);
            }
        }
    }

    fn apply(&mut self, effects: Vec<TrackerEffect>) {
        for effect in effects {
            match effect {
                TrackerEffect::PreventDefault => self.outputs.push(FrameOutput::PreventDefault),
                TrackerEffect::AllowContextMenu => {
                    self.outputs.push(FrameOutput::AllowContextMenu)
                }
                TrackerEffect::DrawTrail { from, to } => {
                    self.outputs.push(FrameOutput::DrawTrail { from, to })
                }
                TrackerEffect::ClearTrail => self.outputs.push(FrameOutput::ClearTrail),
                TrackerEffect::Progress(arrows) => {
                    self.outputs.push(FrameOutput::ShowProgress { arrows })
                }
                // Resolved after the sync broadcast already queued on the bus.
                TrackerEffect::Dispatch(pending) => self.sync.port().defer(pending),
            }
        }
    }

    /// Drop the stroke and release the context menu after the extension
    /// went away. The user is told once.
    fn abandon(&mut self, err: anyhow::Error) {
        let tracker = &mut self.tracker;
        let effects = self.sync.update(|state| tracker.cancel(state));
        self.apply(effects);
        if !self.stale_notified {
            self.stale_notified = true;
            tracing::warn!(?err, frame = self.id(), "aborting gesture");
            self.outputs.push(FrameOutput::Notice {
                message: STALE_CONTEXT_NOTICE.to_string(),
            });
        }
    }

    fn run_deferred(&mut self, pending: PendingAction) {
        if let Err(err) = self.context.probe() {
            self.abandon(err);
            return;
        }
        let selected = self.sync.state().selected_text.clone();
        match self.resolver.resolve(&pending, &selected) {
            Ok(Some(resolved)) => self.perform(resolved),
            Ok(None) => {}
            Err(err) => {
                tracing::info!(%err, "action could not be resolved");
                self.outputs.push(FrameOutput::Notice {
                    message: err.to_string(),
                });
            }
        }
    }

    fn perform(&mut self, resolved: ResolvedAction) {
        match resolved.builtin.site() {
            ExecutionSite::Frame => self.run_in_frame(resolved),
            ExecutionSite::Scroll(kind) => {
                self.scroll(kind, &resolved.option.scroll_chain, resolved.request)
            }
            ExecutionSite::Authority => self.execute_at_authority(resolved.request),
        }
    }

    fn run_in_frame(&mut self, resolved: ResolvedAction) {
        let text = match resolved.builtin {
            BuiltinAction::CopyUrl => Some(self.url.clone()),
            BuiltinAction::CopyLinkUrl => resolved.option.url,
            BuiltinAction::CopyImageUrl => resolved.option.src,
            BuiltinAction::CopyText => resolved.request.text,
            BuiltinAction::DisableExtension => {
                self.sync.disable();
                let effects = self.tracker.reset();
                self.apply(effects);
                return;
            }
            other => {
                tracing::warn!(action = other.name(), "action cannot run inside a frame");
                return;
            }
        };
        match text {
            Some(text) if !text.is_empty() => {
                self.outputs.push(FrameOutput::WriteClipboard { text })
            }
            _ => tracing::debug!(action = resolved.builtin.name(), "nothing to copy"),
        }
    }

    /// Scroll the nearest container that can move, otherwise hand the request
    /// to the embedding frame.
    fn scroll(&mut self, kind: ScrollKind, chain: &[ScrollMetrics], request: ActionRequest) {
        if let Some(depth) = find_scroll_container(chain, kind) {
            self.outputs.push(FrameOutput::ScrollElement { depth, kind });
            return;
        }
        if self.is_root() {
            self.outputs.push(FrameOutput::ScrollViewport { kind });
            return;
        }
        let from = self.id();
        self.sync
            .port()
            .post_to_parent(FrameMessage::ExecuteAction { from, request });
    }

    /// Run `request` at the single place allowed to have tab-level side
    /// effects: the top frame's host.
    fn execute_at_authority(&mut self, request: ActionRequest) {
        if !self.is_root() {
            let port = self.sync.port();
            port.post(
                port.root(),
                FrameMessage::ExecuteAction {
                    from: port.id(),
                    request,
                },
            );
            return;
        }
        let Some(host) = self.host.as_mut() else {
            tracing::warn!(action = %request.action, "no action host on the top frame");
            return;
        };
        if let Some(reply) = run_on_host(host.as_mut(), &request) {
            if reply.suppress_context_menu {
                self.sync
                    .update(|state| state.should_prevent_context_menu = true);
            }
        }
    }

    fn on_execute_action(&mut self, from: FrameId, request: ActionRequest) {
        let Some(builtin) = BuiltinAction::from_name(&request.action) else {
            tracing::debug!(action = %request.action, "ignoring forwarded unknown action");
            return;
        };
        match builtin.site() {
            ExecutionSite::Scroll(kind) => {
                let chain = self.embedders.get(&from).cloned().unwrap_or_default();
                self.scroll(kind, &chain, request);
            }
            ExecutionSite::Authority => self.execute_at_authority(request),
            ExecutionSite::Frame => {
                tracing::debug!(action = %request.action, from, "ignoring forwarded frame action")
            }
        }
    }
}

/// A tree of frames sharing one bus and one extension context.
pub struct Page {
    settings: Settings,
    kill_switch: KillSwitch,
    bus: FrameBus,
    context: Arc<ExtensionContext>,
    frames: BTreeMap<FrameId, ContentFrame>,
    next_id: FrameId,
}

impl Page {
    pub fn new(settings: Settings, url: &str, host: Box<dyn ActionHost>) -> Self {
        let bus = FrameBus::new();
        let context = Arc::new(ExtensionContext::new());
        let kill_switch = settings.kill_switch();
        let port = bus.port(ROOT_FRAME, None, ROOT_FRAME, &settings.extension_id);
        let mut root =
            ContentFrame::new(port, url, &settings, Arc::clone(&context)).with_host(host);
        root.load(&kill_switch);

        let mut frames = BTreeMap::new();
        frames.insert(ROOT_FRAME, root);
        Self {
            settings,
            kill_switch,
            bus,
            context,
            frames,
            next_id: ROOT_FRAME + 1,
        }
    }

    pub fn root(&self) -> FrameId {
        ROOT_FRAME
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn context(&self) -> &Arc<ExtensionContext> {
        &self.context
    }

    /// Load a frame inside `parent`. `embedder` is the scroll chain around
    /// the embedding element in the parent, nearest first.
    pub fn add_frame(
        &mut self,
        parent: FrameId,
        url: &str,
        embedder: Vec<ScrollMetrics>,
    ) -> anyhow::Result<FrameId> {
        let Some(parent_frame) = self.frames.get_mut(&parent) else {
            bail!("unknown parent frame {parent}");
        };
        let id = self.next_id;
        self.next_id += 1;
        parent_frame.add_child(id, embedder);

        let port = self
            .bus
            .port(id, Some(parent), ROOT_FRAME, &self.settings.extension_id);
        let mut frame = ContentFrame::new(port, url, &self.settings, Arc::clone(&self.context));
        frame.load(&self.kill_switch);
        self.frames.insert(id, frame);
        Ok(id)
    }

    pub fn frame(&self, id: FrameId) -> Option<&ContentFrame> {
        self.frames.get(&id)
    }

    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.frames.keys().copied().collect()
    }

    pub fn dispatch(&mut self, frame: FrameId, event: &GestureEvent) -> anyhow::Result<()> {
        let target = self
            .frames
            .get_mut(&frame)
            .ok_or_else(|| anyhow!("unknown frame {frame}"))?;
        target.handle_event(event);
        Ok(())
    }

    /// Post a raw payload to `frame`, as any script on the page could.
    pub fn post_raw(&self, frame: FrameId, payload: Value) {
        if self
            .bus
            .sender()
            .send(Delivery::Message { to: frame, payload })
            .is_err()
        {
            tracing::debug!(frame, "bus closed; dropping raw payload");
        }
    }

    /// Deliver queued messages until the bus is idle. Returns how many were
    /// handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(delivery) = self.bus.try_next() {
            handled += 1;
            match self.frames.get_mut(&delivery.target()) {
                Some(frame) => frame.deliver(delivery),
                None => tracing::debug!(frame = delivery.target(), "no such frame; dropping"),
            }
            if handled >= MAX_PUMP_STEPS {
                tracing::warn!(handled, "frame bus still busy; pausing pump");
                break;
            }
        }
        handled
    }

    pub fn take_outputs(&mut self, frame: FrameId) -> Vec<FrameOutput> {
        self.frames
            .get_mut(&frame)
            .map(ContentFrame::take_outputs)
            .unwrap_or_default()
    }
}
