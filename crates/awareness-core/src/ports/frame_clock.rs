//! FrameClock port - 描画フレーム境界の抽象化
//!
//! # テスト容易性
//! - trait によりフレーム境界を差し替え可能
//! - 実装: `impls::PacedFrames`（一定周期）

use async_trait::async_trait;

/// Resolves once per call on the next rendering-frame boundary.
///
/// Used only by the sequence driver, once per step, never skipped.
#[async_trait]
pub trait FrameClock: Send + Sync {
    async fn next_frame(&self);
}
