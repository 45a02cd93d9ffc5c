use crate::actions::PendingAction;
use crate::frames::{Envelope, FrameId, FrameMessage};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Something waiting on the page's event loop.
#[derive(Debug)]
pub enum Delivery {
    /// A posted cross-frame message, still in wire form.
    Message { to: FrameId, payload: Value },
    /// A zero-delay continuation a frame scheduled for itself.
    Deferred { to: FrameId, action: PendingAction },
}

impl Delivery {
    pub fn target(&self) -> FrameId {
        match self {
            Delivery::Message { to, .. } | Delivery::Deferred { to, .. } => *to,
        }
    }
}

/// One FIFO event loop shared by every frame of a page.
pub struct FrameBus {
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl Default for FrameBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn port(
        &self,
        id: FrameId,
        parent: Option<FrameId>,
        root: FrameId,
        extension_id: &str,
    ) -> FramePort {
        FramePort {
            id,
            parent,
            root,
            extension_id: Arc::from(extension_id),
            tx: self.tx.clone(),
        }
    }

    /// Raw sender, for traffic that does not come from one of our frames.
    pub fn sender(&self) -> Sender<Delivery> {
        self.tx.clone()
    }

    pub fn try_next(&self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }
}

/// A frame's handle on the bus: its own identity plus where its parent and
/// the root live.
#[derive(Clone)]
pub struct FramePort {
    id: FrameId,
    parent: Option<FrameId>,
    root: FrameId,
    extension_id: Arc<str>,
    tx: Sender<Delivery>,
}

impl FramePort {
    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    pub fn root(&self) -> FrameId {
        self.root
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    pub fn post(&self, to: FrameId, message: FrameMessage) {
        match Envelope::encode(&self.extension_id, message) {
            Ok(payload) => self.send(Delivery::Message { to, payload }),
            Err(err) => tracing::warn!(?err, "failed to encode frame message"),
        }
    }

    pub fn post_to_parent(&self, message: FrameMessage) {
        if let Some(parent) = self.parent {
            self.post(parent, message);
        }
    }

    /// Queue `action` behind everything already posted.
    pub fn defer(&self, action: PendingAction) {
        self.send(Delivery::Deferred {
            to: self.id,
            action,
        });
    }

    fn send(&self, delivery: Delivery) {
        if let Err(err) = self.tx.send(delivery) {
            tracing::debug!(?err, frame = self.id, "frame bus closed; dropping delivery");
        }
    }
}
