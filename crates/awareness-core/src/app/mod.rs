//! App - コンポーネント層
//!
//! engine と ports を組み合わせて、ホストに公開する面を作ります。
//!
//! # 主要コンポーネント
//! - **ComponentBuilder**: コンポーネントの構築とワイヤリング
//! - **ComponentConfig**: get_props / adjust_args / frames / runtime の設定
//! - **Component**: 初期状態・handler テーブル・load_async
//! - **Handler / LoadHandler**: handler の trait とクロージャ adaptor
//! - **apply_action**: handler を単体で試すためのヘルパー

pub mod apply_action;
pub mod builder;
pub mod component;
pub mod config;
pub mod handler;

// 主要な型を再エクスポート
pub use self::apply_action::apply_action;
pub use self::builder::ComponentBuilder;
pub use self::component::{Component, EntryPoint, Handlers, Loader};
pub use self::config::{AdjustArgsFn, ComponentConfig, PropsFn};
pub use self::handler::{Handler, HandlerContext, HandlerFn, LoadFn, LoadHandler, arg};
