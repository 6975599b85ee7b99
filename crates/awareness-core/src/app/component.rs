//! Component - 構築済みのコンポーネント状態
//!
//! # 構成
//! - `state`: 初期 State
//! - `handlers`: 名前 → エントリポイント のテーブル
//! - `loader`: `load_async(next, prev)`（テーブルとは独立した再読み込み口）
//!
//! handler テーブルは bindings を持つだけで、自分自身を捕捉しません。
//! 呼び出し時に `HandlerContext` にテーブルを明示的に渡します。

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::config::{AdjustArgsFn, PropsFn};
use super::handler::{Handler, HandlerContext, LoadHandler};
use crate::domain::{ErrorSlot, Props, State};
use crate::engine::HandlerInvoker;
use crate::error::AwarenessError;

pub(crate) const LOAD: &str = "load";
pub(crate) const INITIAL: &str = "initial";

/// Wiring shared by every entry point of one component.
pub(crate) struct Shared {
    pub(crate) invoker: HandlerInvoker,
    pub(crate) get_props: PropsFn,
    pub(crate) adjust_args: AdjustArgsFn,
    pub(crate) load: Option<Arc<dyn LoadHandler>>,
}

impl Shared {
    fn load_async(&self, next: Props, previous: Option<Props>) {
        let Some(load) = &self.load else {
            return;
        };
        let load = Arc::clone(load);
        self.invoker.invoke(LOAD, ErrorSlot::Load, move || {
            load.load(&next, previous.as_ref())
        });
    }
}

pub(crate) enum Binding {
    /// Forced reload: `load_async(get_props(), None)`.
    Reload,
    Handler(Arc<dyn Handler>),
}

struct HandlerTable {
    shared: Arc<Shared>,
    bindings: HashMap<String, Binding>,
}

/// Name -> entry point table.
///
/// Cheap to clone; every clone refers to the same table.
#[derive(Clone)]
pub struct Handlers {
    inner: Arc<HandlerTable>,
}

impl Handlers {
    pub(crate) fn new(shared: Arc<Shared>, bindings: HashMap<String, Binding>) -> Self {
        Self {
            inner: Arc::new(HandlerTable { shared, bindings }),
        }
    }

    /// Invoke the entry point `name`.
    ///
    /// The only error is an unknown name. Handler failures are written to
    /// `handlerError` (or `loadError` for `load`) and never returned here.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<(), AwarenessError> {
        let binding = self
            .inner
            .bindings
            .get(name)
            .ok_or_else(|| AwarenessError::UnknownHandler(name.to_owned()))?;
        let shared = &self.inner.shared;

        match binding {
            Binding::Reload => shared.load_async((shared.get_props)(), None),
            Binding::Handler(handler) => {
                let args = (shared.adjust_args)(args);
                let ctx = HandlerContext {
                    props: (shared.get_props)(),
                    handlers: self.clone(),
                };
                let handler = Arc::clone(handler);
                shared
                    .invoker
                    .invoke(name, ErrorSlot::Handler, move || handler.call(ctx, args));
            }
        }
        Ok(())
    }

    /// A bound entry point for `name`, if registered.
    pub fn entry(&self, name: &str) -> Option<EntryPoint> {
        self.contains(name).then(|| EntryPoint {
            handlers: self.clone(),
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bindings.is_empty()
    }
}

/// One entry point of a [`Handlers`] table.
#[derive(Clone)]
pub struct EntryPoint {
    handlers: Handlers,
    name: String,
}

impl EntryPoint {
    pub fn call(&self, args: Vec<Value>) {
        // Only constructed for registered names.
        let _ = self.handlers.call(&self.name, args);
    }
}

/// Reload entry point, independent of the handler table.
#[derive(Clone)]
pub struct Loader {
    shared: Arc<Shared>,
}

impl Loader {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Run `load` with both snapshots. No-op without a `load` handler.
    pub fn load_async(&self, next: Props, previous: Option<Props>) {
        self.shared.load_async(next, previous);
    }
}

/// A built component: initial state, handler table and reload entry point.
pub struct Component {
    state: State,
    handlers: Handlers,
    loader: Loader,
}

impl Component {
    pub(crate) fn new(state: State, handlers: Handlers, loader: Loader) -> Self {
        Self {
            state,
            handlers,
            loader,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn load_async(&self, next: Props, previous: Option<Props>) {
        self.loader.load_async(next, previous);
    }
}
