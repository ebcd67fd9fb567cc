/// At most one outstanding redraw request.
///
/// Requests made before the next display tick collapse into one draw.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameQueue {
    pending: bool,
    coalesced: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this request scheduled a new frame, `false` if it
    /// merged into one already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            false
        } else {
            self.pending = true;
            true
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Requests absorbed into an already pending frame, over the queue's life.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
