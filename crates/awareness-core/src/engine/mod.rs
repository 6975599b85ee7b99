//! Engine - StateChanger の解決と順序制御
//!
//! # 主要コンポーネント（葉から順に）
//! - **error_capture**: Transform の失敗を error slot への delta に変換
//! - **resolver**: StateChanger を variant ごとに処理
//! - **sequence**: Stepwise をフレーム単位で順に駆動する状態機械
//! - **invoker**: handler を呼び出し、結果を resolver に振り分ける

pub mod error_capture;
pub mod invoker;
pub mod resolver;
pub mod sequence;

pub use self::error_capture::{Immediate, catching};
pub use self::invoker::{HandlerInvoker, UnobservedHook};
pub use self::resolver::{ChangerResolver, Resolution};
pub use self::sequence::{SequenceDriver, SequenceError};
