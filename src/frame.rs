/// Requests a callback on the next rendered frame. The browser binding wraps
/// `requestAnimationFrame`; tests count requests and flush by hand.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Collapses a burst of scroll offsets into one update per frame.
///
/// Only the latest offset is kept; intermediate offsets are dropped.
#[derive(Debug, Default)]
pub struct FrameCoalescer {
    pending: bool,
    latest: Option<f64>,
}

impl FrameCoalescer {
    /// Records `offset` and reports whether a frame must be requested.
    pub fn push(&mut self, offset: f64) -> bool {
        self.latest = Some(offset);
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn flush(&mut self) -> Option<f64> {
        self.pending = false;
        self.latest.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
