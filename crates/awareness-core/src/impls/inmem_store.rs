//! InMemoryStore - 開発用の状態ストア
//!
//! # 学習ポイント
//! - 同期 Mutex による「読み取り＋書き込み」の原子性
//! - watch channel による再描画通知

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::domain::State;
use crate::ports::{AlterState, Mutation};

/// InMemoryStore は開発用の状態ストア
///
/// # 実装詳細
/// - 現在の State と適用履歴を `std::sync::Mutex` で保持
///   （`alter` は同期呼び出しなので tokio の Mutex は使わない）
/// - mutation はロック中に現在の State に対して評価される
///   （transform から entry point を呼ぶと同じスレッドで再ロックしてデッドロックする）
/// - 適用のたびに watch channel へ新しい State を送る
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(InMemoryStore::new());
/// let component = ComponentBuilder::new(store.clone()).initial(...).build()?;
/// store.seed(component.state().clone());
/// ```
pub struct InMemoryStore {
    inner: Mutex<StoreState>,
    updates: watch::Sender<State>,
}

struct StoreState {
    current: State,
    /// State after each applied mutation, oldest first.
    history: Vec<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_state(State::default())
    }

    pub fn with_state(state: State) -> Self {
        let (updates, _) = watch::channel(state.clone());
        Self {
            inner: Mutex::new(StoreState {
                current: state,
                history: Vec::new(),
            }),
            updates,
        }
    }

    /// Replace the current state and clear the history.
    pub fn seed(&self, state: State) {
        let mut guard = self.lock();
        guard.current = state.clone();
        guard.history.clear();
        drop(guard);
        self.updates.send_replace(state);
    }

    pub fn snapshot(&self) -> State {
        self.lock().current.clone()
    }

    pub fn history(&self) -> Vec<State> {
        self.lock().history.clone()
    }

    /// Number of mutations applied since the last seed.
    pub fn applied(&self) -> usize {
        self.lock().history.len()
    }

    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.updates.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlterState for InMemoryStore {
    fn alter(&self, mutation: Mutation) {
        let mut guard = self.lock();
        let delta = mutation.apply(&guard.current);
        tracing::trace!(fields = delta.len(), "applying delta");
        guard.current.merge(delta);
        let next = guard.current.clone();
        guard.history.push(next.clone());
        drop(guard);

        self.updates.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Delta;
    use serde_json::json;

    fn number(state: &State) -> Option<i64> {
        state.get_as("number")
    }

    #[test]
    fn alter_merges_and_records_history() {
        let store = InMemoryStore::with_state(State::seeded(Delta::new().with("number", 0)));

        store.alter(Mutation::new(|_| Delta::new().with("number", 1)));
        store.alter(Mutation::new(|prev| {
            let n = prev.get_as::<i64>("number").unwrap_or_default();
            Delta::new().with("number", n + 10)
        }));

        assert_eq!(number(&store.snapshot()), Some(11));
        let history: Vec<_> = store.history().iter().map(number).collect();
        assert_eq!(history, vec![Some(1), Some(11)]);
        assert_eq!(store.snapshot().get("handlerError"), Some(&json!(null)));
    }

    #[test]
    fn seed_resets_history() {
        let store = InMemoryStore::new();
        store.alter(Mutation::new(|_| Delta::new().with("number", 1)));
        assert_eq!(store.applied(), 1);

        store.seed(State::seeded(Delta::new().with("number", 5)));
        assert_eq!(store.applied(), 0);
        assert_eq!(number(&store.snapshot()), Some(5));
    }

    #[test]
    fn concurrent_transforms_never_lose_updates() {
        let store = std::sync::Arc::new(InMemoryStore::with_state(State::seeded(
            Delta::new().with("number", 0),
        )));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.alter(Mutation::new(|prev| {
                            let n = prev.get_as::<i64>("number").unwrap_or_default();
                            Delta::new().with("number", n + 1)
                        }));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(number(&store.snapshot()), Some(200));
        assert_eq!(store.applied(), 200);
    }

    #[tokio::test]
    async fn subscribers_see_each_update() {
        let store = InMemoryStore::new();
        let mut rx = store.subscribe();

        store.alter(Mutation::new(|_| Delta::new().with("number", 7)));

        rx.changed().await.unwrap();
        assert_eq!(number(&rx.borrow_and_update()), Some(7));
    }
}
