//! Ports - ホスト環境との境界
//!
//! エンジンはストアも描画も持ちません。ホストが以下を注入します：
//! - **AlterState**: 変更（Mutation）をストアに適用するコールバック
//! - **FrameClock**: 描画フレーム境界（Stepwise のペーシング用）

pub mod alter_state;
pub mod frame_clock;

pub use self::alter_state::{AlterState, Mutation};
pub use self::frame_clock::FrameClock;
