//! ComponentConfig - 構築時に一度だけ渡す設定
//!
//! # デフォルト
//! - get_props: 空の Props
//! - adjust_args: 恒等関数
//! - frames: 約 60Hz の PacedFrames
//! - runtime: build() 時点の tokio runtime
//! - on_unobserved: なし（tracing の error! のみ）

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;

use crate::domain::Props;
use crate::engine::UnobservedHook;
use crate::impls::PacedFrames;
use crate::ports::FrameClock;

pub type PropsFn = Arc<dyn Fn() -> Props + Send + Sync>;
pub type AdjustArgsFn = Arc<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

/// Options recognised by [`ComponentBuilder`](super::ComponentBuilder).
#[derive(Clone)]
pub struct ComponentConfig {
    /// Current external property snapshot.
    pub get_props: PropsFn,
    /// Applied to the positional arguments of every ordinary handler call.
    pub adjust_args: AdjustArgsFn,
    pub frames: Arc<dyn FrameClock>,
    /// Runtime that drives deferred and stepwise changers.
    pub runtime: Option<Handle>,
    pub on_unobserved: Option<UnobservedHook>,
}

impl ComponentConfig {
    pub fn with_props<F>(mut self, get_props: F) -> Self
    where
        F: Fn() -> Props + Send + Sync + 'static,
    {
        self.get_props = Arc::new(get_props);
        self
    }

    pub fn with_adjust_args<F>(mut self, adjust_args: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        self.adjust_args = Arc::new(adjust_args);
        self
    }

    pub fn with_frames(mut self, frames: Arc<dyn FrameClock>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_unobserved_hook(mut self, hook: UnobservedHook) -> Self {
        self.on_unobserved = Some(hook);
        self
    }
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            get_props: Arc::new(Props::new),
            adjust_args: Arc::new(|args: Vec<Value>| args),
            frames: Arc::new(PacedFrames::sixty_hz()),
            runtime: None,
            on_unobserved: None,
        }
    }
}

impl fmt::Debug for ComponentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfig")
            .field("runtime", &self.runtime.is_some())
            .field("on_unobserved", &self.on_unobserved.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_empty_props_and_identity() {
        let config = ComponentConfig::default();
        assert!((config.get_props)().is_empty());
        assert_eq!((config.adjust_args)(vec![json!(1), json!(2)]), vec![json!(1), json!(2)]);
        assert!(config.runtime.is_none());
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = ComponentConfig::default()
            .with_props(|| {
                let mut p = Props::new();
                p.insert("user".into(), json!("ada"));
                p
            })
            .with_adjust_args(|args| args.into_iter().rev().collect());

        assert_eq!((config.get_props)().get("user"), Some(&json!("ada")));
        assert_eq!((config.adjust_args)(vec![json!(1), json!(2)]), vec![json!(2), json!(1)]);
    }
}
