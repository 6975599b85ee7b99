//! apply_action - handler を単体で実行するテスト用ヘルパー
//!
//! 使い捨てのコンポーネントを作り、最初の mutation だけを
//! `previous` に適用して返します。

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;

use super::builder::ComponentBuilder;
use super::handler::HandlerContext;
use crate::domain::{Delta, ErrorSlot, HandlerFailure, HandlerResult, State};
use crate::ports::Mutation;

const ACTION: &str = "action";

/// Run `action` once against `previous` and return the state after its first
/// mutation.
///
/// - A failure written to `handlerError` comes back as `Err`.
/// - If the action never mutates, `previous` is returned once all of its
///   pending work has finished.
///
/// Later mutations (further steps of a stepwise changer, other siblings) are
/// discarded.
pub async fn apply_action<F, R>(
    previous: State,
    action: F,
    args: Vec<Value>,
) -> Result<State, HandlerFailure>
where
    F: Fn(HandlerContext, Vec<Value>) -> Result<R, HandlerFailure> + Send + Sync + 'static,
    R: Into<HandlerResult> + 'static,
{
    let (tx, rx) = oneshot::channel::<Mutation>();
    let first = Mutex::new(Some(tx));
    let alter = move |mutation: Mutation| {
        let sender = first.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender {
            let _ = sender.send(mutation);
        }
    };

    let seed = previous.clone();
    let component = ComponentBuilder::new(Arc::new(alter))
        .initial(move |_| Delta::from(seed.into_inner()))
        .handler(ACTION, action)?
        .build()?;
    component.handlers().call(ACTION, args)?;
    // Pending work keeps its own handle on the sender.
    drop(component);

    let Ok(mutation) = rx.await else {
        return Ok(previous);
    };
    let delta = mutation.apply(&previous);
    match delta.get(ErrorSlot::Handler.field()) {
        None | Some(Value::Null) => Ok(previous.merged(delta)),
        Some(stored) => Err(serde_json::from_value(stored.clone())
            .unwrap_or_else(|_| HandlerFailure::new(stored.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::sleep;

    use super::*;
    use crate::app::arg;
    use crate::domain::StateChanger;

    fn counter(n: i64) -> State {
        State::seeded(Delta::new().with("number", n))
    }

    fn add(amount: i64) -> StateChanger {
        StateChanger::transform(move |prev| {
            let n = prev.get_as::<i64>("number").unwrap_or_default();
            Delta::new().with("number", n + amount)
        })
    }

    #[tokio::test]
    async fn applies_transform_to_previous() {
        let next = apply_action(
            counter(4),
            |_, args| {
                let amount: i64 = arg(&args, 0)?;
                Ok(add(amount))
            },
            vec![json!(3)],
        )
        .await
        .unwrap();

        assert_eq!(next, counter(7));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_deferred_mutation() {
        let next = apply_action(
            counter(1),
            |_, _| {
                Ok(StateChanger::deferred(async {
                    sleep(Duration::from_millis(100)).await;
                    Ok(Some(add(1)))
                }))
            },
            vec![],
        )
        .await
        .unwrap();

        assert_eq!(next, counter(2));
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_first_step_counts() {
        let next = apply_action(
            counter(0),
            |_, _| Ok(StateChanger::steps(vec![add(1), add(10)])),
            vec![],
        )
        .await
        .unwrap();

        assert_eq!(next, counter(1));
    }

    #[tokio::test]
    async fn synchronous_failure_is_returned() {
        let err = apply_action(
            counter(0),
            |_, _| -> Result<HandlerResult, HandlerFailure> { Err(HandlerFailure::new("nope")) },
            vec![],
        )
        .await
        .unwrap_err();

        assert_eq!(err, HandlerFailure::new("nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_failure_is_returned() {
        let err = apply_action(
            counter(0),
            |_, _| {
                Ok(StateChanger::deferred(async {
                    sleep(Duration::from_millis(10)).await;
                    Err(HandlerFailure::new("late"))
                }))
            },
            vec![],
        )
        .await
        .unwrap_err();

        assert_eq!(err, HandlerFailure::new("late"));
    }

    #[tokio::test]
    async fn no_mutation_returns_previous() {
        let next = apply_action(counter(5), |_, _| Ok(()), vec![]).await.unwrap();
        assert_eq!(next, counter(5));
    }
}
