//! One preview update per animation frame.
//!
//! Pointer moves arrive faster than the host repaints. Each move schedules
//! its patch here, replacing (cancelling) whatever was pending, and the host
//! drains at most one update per animation frame.

use ovl_core::{ElementId, ElementPatch};

/// Identifies one scheduled frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub id: ElementId,
    pub patch: ElementPatch,
}

#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: Option<(FrameToken, PendingUpdate)>,
    issued: u64,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `patch` for the next frame. Any earlier pending update is
    /// dropped; its token will no longer run.
    pub fn schedule(&mut self, id: ElementId, patch: ElementPatch) -> FrameToken {
        self.issued += 1;
        let token = FrameToken(self.issued);
        if let Some((old, _)) = self.pending.replace((token, PendingUpdate { id, patch })) {
            log::trace!("frame {:?} superseded by {:?}", old, token);
        }
        token
    }

    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending.as_ref().map(|(t, _)| *t)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The animation frame fired: hand over the pending update, if any.
    pub fn take(&mut self) -> Option<PendingUpdate> {
        self.pending.take().map(|(_, update)| update)
    }

    /// Run only if `token` is still the live request.
    pub fn take_if(&mut self, token: FrameToken) -> Option<PendingUpdate> {
        if self.pending_token() == Some(token) {
            self.take()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
