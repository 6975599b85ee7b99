//! Handler traits - handler 関数の定義
//!
//! # 二層構造
//! - **表層**: クロージャ（`ComponentBuilder::handler` / `load` に直接渡す）
//! - **内部**: `Handler` / `LoadHandler` trait - object-safe, type erasure
//!
//! クロージャの戻り値は `Into<HandlerResult>` なら何でもよく、
//! `HandlerFn` / `LoadFn` が `HandlerResult` に変換します。

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::component::Handlers;
use crate::domain::{HandlerFailure, HandlerResult, Props};

/// First argument of every ordinary handler.
///
/// `handlers` is the complete table, the called handler included, so one
/// handler can invoke another.
#[derive(Clone)]
pub struct HandlerContext {
    pub props: Props,
    pub handlers: Handlers,
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("props", &self.props)
            .field("handlers", &self.handlers.names().collect::<Vec<_>>())
            .finish()
    }
}

/// An ordinary handler: `(context, args) -> HandlerResult`.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: HandlerContext, args: Vec<Value>) -> Result<HandlerResult, HandlerFailure>;
}

/// The `load` handler: `(next_props, previous_props) -> HandlerResult`.
///
/// `previous` is `None` on a forced reload. Comparing the two snapshots to
/// skip expensive work is up to the handler.
pub trait LoadHandler: Send + Sync {
    fn load(&self, next: &Props, previous: Option<&Props>) -> Result<HandlerResult, HandlerFailure>;
}

/// Adapts a closure into a [`Handler`].
pub struct HandlerFn<F, R> {
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> HandlerFn<F, R> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _result: PhantomData,
        }
    }
}

impl<F, R> Handler for HandlerFn<F, R>
where
    F: Fn(HandlerContext, Vec<Value>) -> Result<R, HandlerFailure> + Send + Sync,
    R: Into<HandlerResult>,
{
    fn call(&self, ctx: HandlerContext, args: Vec<Value>) -> Result<HandlerResult, HandlerFailure> {
        (self.f)(ctx, args).map(Into::into)
    }
}

/// Adapts a closure into a [`LoadHandler`].
pub struct LoadFn<F, R> {
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> LoadFn<F, R> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _result: PhantomData,
        }
    }
}

impl<F, R> LoadHandler for LoadFn<F, R>
where
    F: Fn(&Props, Option<&Props>) -> Result<R, HandlerFailure> + Send + Sync,
    R: Into<HandlerResult>,
{
    fn load(&self, next: &Props, previous: Option<&Props>) -> Result<HandlerResult, HandlerFailure> {
        (self.f)(next, previous).map(Into::into)
    }
}

/// Decode positional argument `index`.
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, HandlerFailure> {
    let value = args
        .get(index)
        .ok_or_else(|| HandlerFailure::new(format!("missing argument {index}")))?;
    Ok(serde_json::from_value(value.clone())?)
}
