//! Impls - ports の参照実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryStore**: 履歴付きのインメモリ状態ストア（AlterState）
//! - **PacedFrames**: 一定周期のフレーム境界（FrameClock）

pub mod inmem_store;
pub mod paced_frames;

pub use self::inmem_store::InMemoryStore;
pub use self::paced_frames::{DEFAULT_FRAME_PERIOD, PacedFrames};
