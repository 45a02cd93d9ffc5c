use crate::frames::{FrameId, FrameMessage, FramePort, SharedGestureState};

/// What changed when a snapshot from another frame was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub changed: bool,
    /// New non-empty gesture string.
    pub progress: Option<String>,
    /// `onMouseGesture` went from true to false.
    pub gesture_ended: bool,
}

impl SyncOutcome {
    fn between(previous: &SharedGestureState, current: &SharedGestureState) -> Self {
        let progress = (current.arrows != previous.arrows && !current.arrows.is_empty())
            .then(|| current.arrows.clone());
        Self {
            changed: previous != current,
            progress,
            gesture_ended: previous.on_mouse_gesture && !current.on_mouse_gesture,
        }
    }
}

/// One frame's replica of [`SharedGestureState`] and its replication links.
///
/// The root keeps a list of registered descendants and fans every change out
/// to them. Any other frame only ever talks to the root.
pub struct CrossFrameSync {
    port: FramePort,
    targets: Vec<FrameId>,
    state: SharedGestureState,
}

impl CrossFrameSync {
    pub fn new(port: FramePort) -> Self {
        let targets = if port.is_root() {
            Vec::new()
        } else {
            vec![port.root()]
        };
        Self {
            port,
            targets,
            state: SharedGestureState::default(),
        }
    }

    pub fn id(&self) -> FrameId {
        self.port.id()
    }

    pub fn is_root(&self) -> bool {
        self.port.is_root()
    }

    pub fn port(&self) -> &FramePort {
        &self.port
    }

    pub fn state(&self) -> &SharedGestureState {
        &self.state
    }

    pub fn sync_targets(&self) -> &[FrameId] {
        &self.targets
    }

    /// Announce this frame to the root. Sent once, at load.
    pub fn register(&self) {
        if !self.is_root() {
            self.port.post_to_parent(FrameMessage::Register { frame: self.id() });
        }
    }

    /// Mutate the local replica and broadcast it if anything changed.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut SharedGestureState) -> R) -> R {
        let previous = self.state.clone();
        let result = f(&mut self.state);
        if self.state != previous {
            self.broadcast();
            if self.is_root() {
                let outcome = SyncOutcome::between(&previous, &self.state);
                self.fan_out(&outcome, self.id());
            }
        }
        result
    }

    /// Send the whole state to every sync target.
    pub fn broadcast(&self) {
        let origin = self.id();
        for target in &self.targets {
            self.port.post(
                *target,
                FrameMessage::SyncState {
                    origin,
                    state: self.state.clone(),
                },
            );
        }
    }

    pub fn on_register(&mut self, frame: FrameId) {
        if !self.is_root() {
            self.port.post_to_parent(FrameMessage::Register { frame });
            return;
        }
        if frame == self.id() || self.targets.contains(&frame) {
            return;
        }
        tracing::debug!(frame, "registered sync target");
        self.targets.push(frame);
        self.port.post(
            frame,
            FrameMessage::SyncState {
                origin: self.id(),
                state: self.state.clone(),
            },
        );
    }

    /// Replace the local replica with a snapshot from `origin`.
    pub fn on_sync_state(&mut self, origin: FrameId, state: SharedGestureState) -> SyncOutcome {
        let previous = std::mem::replace(&mut self.state, state);
        // Disabling holds until the page reloads, whatever a snapshot says.
        self.state.enabled_extension &= previous.enabled_extension;
        let outcome = SyncOutcome::between(&previous, &self.state);
        if self.is_root() {
            for target in self.targets.iter().filter(|target| **target != origin) {
                self.port.post(
                    *target,
                    FrameMessage::SyncState {
                        origin,
                        state: self.state.clone(),
                    },
                );
            }
            self.fan_out(&outcome, origin);
        }
        outcome
    }

    /// Turn gestures off page-wide, starting here.
    pub fn disable(&mut self) {
        self.state.enabled_extension = false;
        let origin = self.id();
        for target in &self.targets {
            self.port.post(*target, FrameMessage::Disable { origin });
        }
    }

    pub fn on_disable(&mut self, origin: FrameId) {
        self.state.enabled_extension = false;
        if self.is_root() {
            for target in self.targets.iter().filter(|target| **target != origin) {
                self.port.post(*target, FrameMessage::Disable { origin });
            }
        }
    }

    fn fan_out(&self, outcome: &SyncOutcome, origin: FrameId) {
        if let Some(arrows) = &outcome.progress {
            for target in &self.targets {
                self.port.post(
                    *target,
                    FrameMessage::ShowProgress {
                        arrows: arrows.clone(),
                    },
                );
            }
        }
        if outcome.gesture_ended {
            for target in self.targets.iter().filter(|target| **target != origin) {
                self.port.post(*target, FrameMessage::Reset);
            }
        }
    }
}
