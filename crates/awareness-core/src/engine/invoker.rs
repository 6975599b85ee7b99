//! HandlerInvoker: calls a handler and fans its result out to the resolver.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::resolver::{ChangerResolver, Resolution};
use super::sequence::SequenceError;
use crate::domain::{ErrorSlot, HandlerFailure, HandlerResult};
use crate::ports::{AlterState, FrameClock};

/// Called with failures nobody awaits: a step source that failed while being
/// pulled. The error slot is not written for these.
pub type UnobservedHook = Arc<dyn Fn(&SequenceError) + Send + Sync>;

/// Invokes handlers and dispatches what they return.
///
/// Entry points built on top of this never return handler failures; every
/// recoverable failure ends up in state under the invocation's slot.
#[derive(Clone)]
pub struct HandlerInvoker {
    alter: Arc<dyn AlterState>,
    frames: Arc<dyn FrameClock>,
    runtime: Handle,
    unobserved: Option<UnobservedHook>,
}

impl HandlerInvoker {
    pub fn new(alter: Arc<dyn AlterState>, frames: Arc<dyn FrameClock>, runtime: Handle) -> Self {
        Self {
            alter,
            frames,
            runtime,
            unobserved: None,
        }
    }

    pub fn with_unobserved_hook(mut self, hook: UnobservedHook) -> Self {
        self.unobserved = Some(hook);
        self
    }

    /// Run `call` and resolve each returned changer.
    ///
    /// - `Err` from `call` goes to `slot`; nothing else is processed.
    /// - Delta/Transform changers are applied before this returns.
    /// - Deferred/Stepwise changers are spawned, one task each, with no
    ///   ordering between siblings.
    pub fn invoke<F>(&self, name: &str, slot: ErrorSlot, call: F)
    where
        F: FnOnce() -> Result<HandlerResult, HandlerFailure>,
    {
        let resolver = ChangerResolver::new(self.alter.clone(), self.frames.clone(), slot);

        let result = match call() {
            Ok(result) => result,
            Err(failure) => {
                tracing::debug!(handler = name, slot = %slot, error = %failure, "handler failed");
                resolver.store_error(failure);
                return;
            }
        };

        let changers = result.into_changers();
        tracing::trace!(handler = name, count = changers.len(), "dispatching state changers");

        for changer in changers {
            let kind = changer.kind();
            let Resolution::Pending(pending) = resolver.resolve(Some(changer)) else {
                continue;
            };

            let handler = name.to_owned();
            let hook = self.unobserved.clone();
            self.runtime.spawn(async move {
                if let Err(err) = pending.await {
                    tracing::error!(handler = %handler, kind = %kind, error = %err, "unobserved failure in state changer");
                    if let Some(hook) = hook {
                        hook(&err);
                    }
                }
            });
        }
    }
}
