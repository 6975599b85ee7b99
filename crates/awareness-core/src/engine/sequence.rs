//! SequenceDriver - Stepwise を 1 ステップずつ駆動する状態機械
//!
//! # 状態遷移
//! ```text
//! AwaitingPrevious ──► AwaitingFrame ──► Stepping ──┬──► AwaitingPrevious
//!                                                   └──► Terminal
//! ```
//! - AwaitingPrevious: 直前のステップの changer を完全に解決する
//! - AwaitingFrame: フレーム境界を 1 回だけ待つ（スキップしない）
//! - Stepping: source から次のステップを取り出す
//!
//! ステップ N の changer はステップ N+1 を取り出す周回の先頭で解決されます。

use thiserror::Error;

use super::resolver::ChangerResolver;
use crate::domain::{HandlerFailure, StateChanger, Step, Stepwise};

/// A failure that escapes the driver.
///
/// Only the step source itself can produce one; failures of the changers it
/// yields are stored in the error slot instead.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("step source failed while producing step {step}: {failure}")]
    Source { step: usize, failure: HandlerFailure },
}

enum DriverState {
    AwaitingPrevious(Option<StateChanger>),
    AwaitingFrame,
    Stepping,
    Terminal,
}

impl DriverState {
    fn name(&self) -> &'static str {
        match self {
            DriverState::AwaitingPrevious(_) => "awaiting_previous",
            DriverState::AwaitingFrame => "awaiting_frame",
            DriverState::Stepping => "stepping",
            DriverState::Terminal => "terminal",
        }
    }
}

/// Drains a [`Stepwise`] source strictly in order.
///
/// Guarantees:
/// - step K is fully resolved (nested deferred/stepwise included) before
///   step K+1 starts resolving
/// - exactly one frame boundary between consecutive pulls
///
/// A source that fails while being pulled is not caught here. The error is
/// returned from [`SequenceDriver::run`] and nothing is written to the slot.
pub struct SequenceDriver {
    resolver: ChangerResolver,
    source: Stepwise,
    pulled: usize,
}

impl SequenceDriver {
    pub fn new(resolver: ChangerResolver, source: Stepwise) -> Self {
        Self {
            resolver,
            source,
            pulled: 0,
        }
    }

    pub async fn run(mut self) -> Result<(), SequenceError> {
        let mut state = DriverState::AwaitingPrevious(None);
        loop {
            tracing::trace!(state = state.name(), pulled = self.pulled, "sequence transition");
            state = match state {
                DriverState::AwaitingPrevious(previous) => {
                    self.resolver.resolve(previous).settle().await?;
                    DriverState::AwaitingFrame
                }
                DriverState::AwaitingFrame => {
                    self.resolver.frames().next_frame().await;
                    DriverState::Stepping
                }
                DriverState::Stepping => {
                    let step = self
                        .source
                        .next_step()
                        .map_err(|failure| SequenceError::Source {
                            step: self.pulled,
                            failure,
                        })?;
                    self.pulled += 1;
                    match step {
                        Step::Yielded(changer) => DriverState::AwaitingPrevious(Some(changer)),
                        Step::Complete(last) => {
                            self.resolver.resolve(last).settle().await?;
                            DriverState::Terminal
                        }
                    }
                }
                DriverState::Terminal => return Ok(()),
            };
        }
    }
}
