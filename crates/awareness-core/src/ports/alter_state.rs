//! AlterState port - the host's mutation callback.

use std::fmt;

use crate::domain::{Delta, State};

/// A failure-safe mutation: maps the state at application time to a delta.
///
/// Built by the engine; every failure has already been turned into a delta
/// on an error slot by the time a host sees one.
pub struct Mutation(Box<dyn FnOnce(&State) -> Delta + Send>);

impl Mutation {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> Delta + Send + 'static,
    {
        Self(Box::new(f))
    }

    pub fn apply(self, previous: &State) -> Delta {
        (self.0)(previous)
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mutation(..)")
    }
}

/// Applies mutations to the real store.
///
/// Contract for implementors:
/// - apply `mutation.apply(&current)` to the store as a shallow merge
/// - the read of `current` and the write must be atomic relative to each other
/// - a mutation may be evaluated while the store is locked, so it must not
///   call back into the component (no entry points, no `alter`)
/// - safe to call synchronously, repeatedly, and from spawned continuations
pub trait AlterState: Send + Sync {
    fn alter(&self, mutation: Mutation);
}

impl<F> AlterState for F
where
    F: Fn(Mutation) + Send + Sync,
{
    fn alter(&self, mutation: Mutation) {
        self(mutation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn closures_are_alter_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |m: Mutation| {
                let delta = m.apply(&State::default());
                seen.lock().unwrap().push(delta);
            }
        };

        let alter: Arc<dyn AlterState> = Arc::new(sink);
        alter.alter(Mutation::new(|_| Delta::new().with("number", 1)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("number"), Some(&serde_json::json!(1)));
    }
}
