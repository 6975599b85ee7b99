//! The demo counter: one handler per kind of state changer.

use std::sync::Arc;
use std::time::Duration;

use awareness_core::app::arg;
use awareness_core::ports::AlterState;
use awareness_core::{
    AwarenessError, Component, ComponentBuilder, ComponentConfig, Delta, HandlerFailure,
    HandlerResult, Props, State, StateChanger,
};
use serde_json::Value;
use tokio::time::sleep;

/// Actions run by the demo, in order.
pub const SCRIPT: [&str; 9] = [
    "one",
    "two",
    "threeFour",
    "double",
    "asyncDouble",
    "yieldDouble",
    "add",
    "doError1",
    "doError2Async",
];

fn number(n: i64) -> Delta {
    Delta::new().with("number", n)
}

fn current(state: &State) -> i64 {
    state.get_as::<i64>("number").unwrap_or_default()
}

fn double() -> StateChanger {
    StateChanger::transform(|prev| number(current(prev) * 2))
}

/// How long to wait after `action` before its effects are all in.
pub fn settle_time(action: &str, delay: Duration, frame: Duration) -> Duration {
    match action {
        "two" | "asyncDouble" | "doError2Async" | "load" => delay + Duration::from_millis(1),
        "threeFour" => delay + frame * 4,
        "yieldDouble" => frame * 3,
        _ => Duration::ZERO,
    }
}

pub fn build(
    store: Arc<dyn AlterState>,
    config: ComponentConfig,
    delay: Duration,
) -> Result<Component, AwarenessError> {
    ComponentBuilder::new(store)
        .with_config(config)
        .initial(|_| number(0))
        .load(move |next: &Props, previous: Option<&Props>| -> Result<HandlerResult, HandlerFailure> {
            if previous == Some(next) {
                return Ok(HandlerResult::Nothing);
            }
            let start = next.get("start").and_then(Value::as_i64).unwrap_or_default();
            Ok(StateChanger::deferred(async move {
                sleep(delay).await;
                Ok(Some(number(start).into()))
            })
            .into())
        })
        .handler("one", |_, _| Ok(number(1)))?
        .handler("two", move |_, _| {
            Ok(StateChanger::deferred(async move {
                sleep(delay).await;
                Ok(Some(number(2).into()))
            }))
        })?
        .handler("threeFour", move |_, _| {
            Ok(StateChanger::steps(vec![
                StateChanger::deferred(async move {
                    sleep(delay).await;
                    Ok(None)
                }),
                number(3).into(),
                number(4).into(),
            ]))
        })?
        .handler("double", |_, _| Ok(double()))?
        .handler("asyncDouble", move |_, _| {
            Ok(StateChanger::deferred(async move {
                sleep(delay).await;
                Ok(Some(double()))
            }))
        })?
        .handler("yieldDouble", |_, _| Ok(StateChanger::steps(vec![double(), double()])))?
        .handler("add", |ctx, args| {
            let amount: i64 = match args.first() {
                Some(_) => arg(&args, 0)?,
                None => ctx.props.get("step").and_then(Value::as_i64).unwrap_or(1),
            };
            Ok(StateChanger::transform(move |prev| number(current(prev) + amount)))
        })?
        .handler("doError1", |_, _| -> Result<HandlerResult, HandlerFailure> {
            Err(HandlerFailure::new("Error one"))
        })?
        .handler("doError2Async", move |_, _| {
            Ok(StateChanger::deferred(async move {
                sleep(delay).await;
                Err(HandlerFailure::new("Error two"))
            }))
        })?
        .build()
}
