//! PacedFrames - fixed-period frame boundaries.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until};

use crate::ports::FrameClock;

/// ~60 Hz.
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

const MIN_FRAME_PERIOD: Duration = Duration::from_millis(1);

/// Frame boundaries at fixed multiples of `period` from an epoch.
///
/// The epoch is captured on the first call. Each call waits for the next
/// boundary strictly after "now", so concurrent callers share boundaries the
/// way rendering-frame callbacks do.
#[derive(Debug)]
pub struct PacedFrames {
    period: Duration,
    epoch: OnceLock<Instant>,
}

impl PacedFrames {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_FRAME_PERIOD),
            epoch: OnceLock::new(),
        }
    }

    pub fn sixty_hz() -> Self {
        Self::new(DEFAULT_FRAME_PERIOD)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn next_boundary(&self, now: Instant) -> Instant {
        let epoch = *self.epoch.get_or_init(|| now);
        let period = self.period.as_nanos();
        let elapsed = now.saturating_duration_since(epoch).as_nanos();
        let frames = elapsed / period + 1;
        let offset = u64::try_from(frames * period).unwrap_or(u64::MAX);
        epoch + Duration::from_nanos(offset)
    }
}

impl Default for PacedFrames {
    fn default() -> Self {
        Self::sixty_hz()
    }
}

#[async_trait]
impl FrameClock for PacedFrames {
    async fn next_frame(&self) {
        let boundary = self.next_boundary(Instant::now());
        sleep_until(boundary).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::at_epoch(0, 16)]
    #[case::mid_frame(5, 16)]
    #[case::on_boundary(16, 32)]
    #[case::late(117, 128)]
    fn boundary_is_strictly_after_now(#[case] now_ms: u64, #[case] expected_ms: u64) {
        let frames = PacedFrames::new(Duration::from_millis(16));
        let epoch = Instant::now();
        assert_eq!(frames.next_boundary(epoch), epoch + Duration::from_millis(16));

        let boundary = frames.next_boundary(epoch + Duration::from_millis(now_ms));
        assert_eq!(boundary, epoch + Duration::from_millis(expected_ms));
    }

    #[test]
    fn zero_period_is_clamped() {
        assert_eq!(PacedFrames::new(Duration::ZERO).period(), MIN_FRAME_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn next_frame_waits_for_boundary() {
        let frames = PacedFrames::new(Duration::from_millis(16));
        let start = Instant::now();

        frames.next_frame().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(16) && elapsed < Duration::from_millis(17));

        tokio::time::sleep(Duration::from_millis(4)).await;
        frames.next_frame().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(32) && elapsed < Duration::from_millis(33));
    }
}
