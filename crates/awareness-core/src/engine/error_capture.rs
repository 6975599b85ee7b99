//! ErrorCapture: turns a transform failure into a delta on the error slot.

use crate::domain::{Delta, ErrorSlot, Transform};
use crate::ports::Mutation;

/// The changers that apply synchronously.
#[derive(Debug)]
pub enum Immediate {
    Delta(Delta),
    Transform(Transform),
}

/// Wrap `changer` into a failure-safe [`Mutation`].
///
/// A failing transform yields `{ [slot]: failure }`; a delta passes through
/// unchanged.
pub fn catching(changer: Immediate, slot: ErrorSlot) -> Mutation {
    match changer {
        Immediate::Delta(delta) => Mutation::new(move |_| delta),
        Immediate::Transform(transform) => Mutation::new(move |previous| {
            match transform.apply(previous) {
                Ok(delta) => delta,
                Err(failure) => {
                    tracing::warn!(slot = %slot, error = %failure, "transform failed");
                    Delta::failure(slot, &failure)
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HandlerFailure, State};
    use rstest::rstest;
    use serde_json::json;

    fn counter(n: i64) -> State {
        State::seeded(Delta::new().with("number", n))
    }

    #[rstest]
    #[case::handler(ErrorSlot::Handler)]
    #[case::load(ErrorSlot::Load)]
    fn delta_passes_through(#[case] slot: ErrorSlot) {
        let delta = Delta::new().with("number", 3);
        let out = catching(Immediate::Delta(delta.clone()), slot).apply(&counter(0));
        assert_eq!(out, delta);
    }

    #[test]
    fn transform_reads_previous_state() {
        let t = Transform::infallible(|prev| {
            let n = prev.get_as::<i64>("number").unwrap_or_default();
            Delta::new().with("number", n * 2)
        });
        let out = catching(Immediate::Transform(t), ErrorSlot::Handler).apply(&counter(4));
        assert_eq!(out.get("number"), Some(&json!(8)));
    }

    #[rstest]
    #[case::handler(ErrorSlot::Handler, "handlerError")]
    #[case::load(ErrorSlot::Load, "loadError")]
    fn transform_failure_lands_in_slot(#[case] slot: ErrorSlot, #[case] field: &str) {
        let t = Transform::new(|_| Err(HandlerFailure::new("bad transform")));
        let out = catching(Immediate::Transform(t), slot).apply(&counter(1));

        assert_eq!(out.len(), 1);
        assert_eq!(out.get(field), Some(&json!({ "message": "bad transform" })));
    }
}
