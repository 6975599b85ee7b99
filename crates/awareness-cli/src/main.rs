mod counter;
mod frames;
mod logging;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Context;
use awareness_core::engine::{SequenceError, UnobservedHook};
use awareness_core::impls::InMemoryStore;
use awareness_core::{ComponentConfig, Props, State};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tokio::time::sleep;

use crate::frames::LoggedFrames;

/// Drive the demo counter component through every kind of state changer.
#[derive(Debug, Parser)]
#[command(name = "awareness")]
struct Args {
    /// Frame period used to pace stepwise changers, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Delay of every deferred changer, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Value the `load` handler resets the counter to
    #[arg(long, default_value_t = 10)]
    start: i64,

    /// Print every applied state instead of one per action
    #[arg(long)]
    history: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    action: &'a str,
    state: &'a State,
}

fn report(action: &str, state: &State) -> anyhow::Result<()> {
    let line = serde_json::to_string(&Report { action, state }).context("encode report")?;
    println!("{line}");
    Ok(())
}

/// Counts unobserved failures. The engine already logs each one.
fn counting_hook(count: Arc<AtomicUsize>) -> UnobservedHook {
    Arc::new(move |_: &SequenceError| {
        count.fetch_add(1, Ordering::Relaxed);
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let frame = Duration::from_millis(args.frame_ms);
    let delay = Duration::from_millis(args.delay_ms);
    let start = args.start;

    // (A) store と設定を用意
    let store = Arc::new(InMemoryStore::new());
    let unobserved = Arc::new(AtomicUsize::new(0));
    let config = ComponentConfig::default()
        .with_frames(Arc::new(LoggedFrames::new(frame)))
        .with_props(move || {
            let mut props = Props::new();
            props.insert("start".into(), json!(start));
            props
        })
        .with_unobserved_hook(counting_hook(unobserved.clone()));

    // (B) コンポーネントを構築して初期状態を store に入れる
    let component = counter::build(store.clone(), config, delay).context("build counter")?;
    store.seed(component.state().clone());
    report("initial", &store.snapshot())?;

    // (C) load → 各 action を順に実行
    let mut actions = vec!["load"];
    actions.extend(counter::SCRIPT);

    for action in actions {
        let before = store.applied();
        tracing::info!(action, "calling");
        component.handlers().call(action, vec![])?;
        sleep(counter::settle_time(action, delay, frame)).await;

        if args.history {
            for state in &store.history()[before..] {
                report(action, state)?;
            }
        } else {
            report(action, &store.snapshot())?;
        }
    }

    tracing::info!(
        applied = store.applied(),
        unobserved = unobserved.load(Ordering::Relaxed),
        "script finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use awareness_core::impls::PacedFrames;
    use awareness_core::{ComponentBuilder, Delta, HandlerFailure, StateChanger};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn unobserved_failures_are_counted_not_printed() {
        let count = Arc::new(AtomicUsize::new(0));
        let config = ComponentConfig::default()
            .with_frames(Arc::new(PacedFrames::new(Duration::from_millis(16))))
            .with_unobserved_hook(counting_hook(count.clone()));
        let store = Arc::new(InMemoryStore::new());
        let component = ComponentBuilder::new(store.clone())
            .with_config(config)
            .initial(|_| Delta::new())
            .handler("broken", |_, _| {
                Ok(StateChanger::try_steps(vec![Err(HandlerFailure::new("boom"))]))
            })
            .unwrap()
            .build()
            .unwrap();

        component.handlers().call("broken", vec![]).unwrap();
        component.handlers().call("broken", vec![]).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(count.load(Ordering::Relaxed), 2);
        assert_eq!(store.applied(), 0);
    }
}
