//! awareness-core
//!
//! State-changer resolution engine for UI components.
//!
//! Handlers never touch the store. They return state changers (a delta, a
//! transform of the previous state, a deferred value, or a stepwise sequence)
//! and the engine turns each one into mutations on a host-owned store,
//! routing every failure into an error slot on the state.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（State, Delta, StateChanger, HandlerFailure）
//! - **ports**: ホストとの境界（AlterState, FrameClock）
//! - **engine**: 解決ロジック（error_capture, resolver, sequence, invoker）
//! - **app**: コンポーネント層（ComponentBuilder, Component, apply_action）
//! - **impls**: 参照実装（InMemoryStore, PacedFrames）

pub mod app;
pub mod domain;
pub mod engine;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{Component, ComponentBuilder, ComponentConfig, HandlerContext, Handlers, apply_action};
pub use domain::{Delta, ErrorSlot, HandlerFailure, HandlerResult, Props, State, StateChanger};
pub use error::AwarenessError;
