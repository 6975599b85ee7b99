use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use awareness_core::impls::PacedFrames;
use awareness_core::ports::FrameClock;

/// PacedFrames that logs every boundary it hands out.
pub struct LoggedFrames {
    inner: PacedFrames,
    seen: AtomicU64,
}

impl LoggedFrames {
    pub fn new(period: Duration) -> Self {
        Self {
            inner: PacedFrames::new(period),
            seen: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl FrameClock for LoggedFrames {
    async fn next_frame(&self) {
        self.inner.next_frame().await;
        let frame = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(frame, "frame boundary");
    }
}
