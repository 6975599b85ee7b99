//! ChangerResolver: dispatches one StateChanger by variant.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::error_capture::{Immediate, catching};
use super::sequence::{SequenceDriver, SequenceError};
use crate::domain::{Delta, ErrorSlot, HandlerFailure, StateChanger};
use crate::ports::{AlterState, FrameClock, Mutation};

/// Outcome of [`ChangerResolver::resolve`].
pub enum Resolution {
    /// Applied synchronously (or nothing to do).
    Applied,
    /// Deferred or stepwise work still to run.
    Pending(BoxFuture<'static, Result<(), SequenceError>>),
}

impl Resolution {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending(_))
    }

    /// Wait until the changer is fully resolved, nested work included.
    pub async fn settle(self) -> Result<(), SequenceError> {
        match self {
            Resolution::Applied => Ok(()),
            Resolution::Pending(pending) => pending.await,
        }
    }
}

/// Resolves changers for one invocation, writing failures to `slot`.
#[derive(Clone)]
pub struct ChangerResolver {
    alter: Arc<dyn AlterState>,
    frames: Arc<dyn FrameClock>,
    slot: ErrorSlot,
}

impl ChangerResolver {
    pub fn new(alter: Arc<dyn AlterState>, frames: Arc<dyn FrameClock>, slot: ErrorSlot) -> Self {
        Self {
            alter,
            frames,
            slot,
        }
    }

    pub fn frames(&self) -> &Arc<dyn FrameClock> {
        &self.frames
    }

    /// `alter ∘ catching(_, slot)`
    pub fn change_state(&self, changer: Immediate) {
        self.alter.alter(catching(changer, self.slot));
    }

    /// Overwrite the slot with `failure`.
    pub fn store_error(&self, failure: HandlerFailure) {
        let slot = self.slot;
        self.alter
            .alter(Mutation::new(move |_| Delta::failure(slot, &failure)));
    }

    /// Delta and Transform apply before this returns; the keystroke-driven
    /// path must not wait for a scheduler tick. Deferred and Stepwise come
    /// back as [`Resolution::Pending`].
    pub fn resolve(&self, changer: Option<StateChanger>) -> Resolution {
        let Some(changer) = changer else {
            return Resolution::Applied;
        };

        match changer {
            StateChanger::Delta(delta) => {
                self.change_state(Immediate::Delta(delta));
                Resolution::Applied
            }
            StateChanger::Transform(transform) => {
                self.change_state(Immediate::Transform(transform));
                Resolution::Applied
            }
            StateChanger::Deferred(deferred) => {
                let resolver = self.clone();
                Resolution::Pending(Box::pin(async move {
                    match deferred.await {
                        Ok(next) => resolver.resolve(next).settle().await,
                        Err(failure) => {
                            tracing::debug!(slot = %resolver.slot, error = %failure, "deferred rejected");
                            resolver.store_error(failure);
                            Ok(())
                        }
                    }
                }))
            }
            StateChanger::Stepwise(source) => {
                Resolution::Pending(Box::pin(SequenceDriver::new(self.clone(), source).run()))
            }
        }
    }
}
