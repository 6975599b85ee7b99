//! ComponentBuilder - コンポーネントの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 二段階のテーブル構築（bindings を作ってから共有する）

use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;

use super::component::{Binding, Component, Handlers, INITIAL, LOAD, Loader, Shared};
use super::config::ComponentConfig;
use super::handler::{Handler, HandlerContext, HandlerFn, LoadFn, LoadHandler};
use crate::domain::{Delta, HandlerFailure, HandlerResult, Props, State};
use crate::engine::HandlerInvoker;
use crate::error::AwarenessError;
use crate::ports::AlterState;

type InitialFn = Box<dyn FnOnce(&Props) -> Delta + Send>;

/// ComponentBuilder はコンポーネントを構築
///
/// # 使用例
/// ```ignore
/// let component = ComponentBuilder::new(store.clone())
///     .initial(|_| Delta::new().with("number", 0))
///     .handler("one", |_, _| Ok(Delta::new().with("number", 1)))?
///     .build()?;
/// component.handlers().call("one", vec![])?;
/// ```
///
/// # Fail-fast 設計
/// - 同名 handler の二重登録 → `DuplicateHandler`
/// - `initial` / `load` を handler として登録 → `ReservedName`
/// - build() 時に `initial` がない → `MissingInitial`
/// - build() 時に tokio runtime がない → `NoRuntime`
pub struct ComponentBuilder {
    alter: Arc<dyn AlterState>,
    config: ComponentConfig,
    initial: Option<InitialFn>,
    load: Option<Arc<dyn LoadHandler>>,
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl ComponentBuilder {
    pub fn new(alter: Arc<dyn AlterState>) -> Self {
        Self {
            alter,
            config: ComponentConfig::default(),
            initial: None,
            load: None,
            handlers: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: ComponentConfig) -> Self {
        self.config = config;
        self
    }

    /// 初期状態を props から作る関数（必須）
    pub fn initial<F>(mut self, initial: F) -> Self
    where
        F: FnOnce(&Props) -> Delta + Send + 'static,
    {
        self.initial = Some(Box::new(initial));
        self
    }

    /// `load` handler を設定
    ///
    /// テーブルの `load` エントリと `Component::load_async` の両方から使われます。
    pub fn load<F, R>(self, load: F) -> Self
    where
        F: Fn(&Props, Option<&Props>) -> Result<R, HandlerFailure> + Send + Sync + 'static,
        R: Into<HandlerResult> + 'static,
    {
        self.load_impl(Arc::new(LoadFn::new(load)))
    }

    pub fn load_impl(mut self, load: Arc<dyn LoadHandler>) -> Self {
        self.load = Some(load);
        self
    }

    /// 通常の handler を登録
    ///
    /// # Example
    /// ```ignore
    /// builder.handler("double", |_, _| Ok(StateChanger::transform(double)))?;
    /// ```
    pub fn handler<F, R>(self, name: impl Into<String>, handler: F) -> Result<Self, AwarenessError>
    where
        F: Fn(HandlerContext, Vec<serde_json::Value>) -> Result<R, HandlerFailure>
            + Send
            + Sync
            + 'static,
        R: Into<HandlerResult> + 'static,
    {
        self.handler_impl(name, Arc::new(HandlerFn::new(handler)))
    }

    pub fn handler_impl(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, AwarenessError> {
        let name = name.into();
        if name == INITIAL || name == LOAD {
            return Err(AwarenessError::ReservedName(name));
        }
        if self.handlers.contains_key(&name) {
            return Err(AwarenessError::DuplicateHandler(name));
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    /// Component を構築
    ///
    /// # 検証
    /// - `initial` が設定されているか
    /// - 設定またはカレントの tokio runtime があるか
    pub fn build(self) -> Result<Component, AwarenessError> {
        let initial = self.initial.ok_or(AwarenessError::MissingInitial)?;
        let runtime = match self.config.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| AwarenessError::NoRuntime)?,
        };

        let mut invoker = HandlerInvoker::new(self.alter, self.config.frames, runtime);
        if let Some(hook) = self.config.on_unobserved {
            invoker = invoker.with_unobserved_hook(hook);
        }

        let get_props = self.config.get_props;
        let state = State::seeded(initial(&get_props()));

        let has_load = self.load.is_some();
        let shared = Arc::new(Shared {
            invoker,
            get_props,
            adjust_args: self.config.adjust_args,
            load: self.load,
        });

        // Phase one: bindings only. Phase two: the shared table is handed to
        // each call through HandlerContext.
        let mut bindings: HashMap<String, Binding> = self
            .handlers
            .into_iter()
            .map(|(name, handler)| (name, Binding::Handler(handler)))
            .collect();
        if has_load {
            bindings.insert(LOAD.to_owned(), Binding::Reload);
        }
        tracing::debug!(handlers = bindings.len(), load = has_load, "component built");

        let handlers = Handlers::new(shared.clone(), bindings);
        Ok(Component::new(state, handlers, Loader::new(shared)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::domain::{ErrorSlot, StateChanger};
    use crate::engine::SequenceError;
    use crate::impls::InMemoryStore;

    fn store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::new())
    }

    #[tokio::test]
    async fn test_build_success() {
        let component = ComponentBuilder::new(store())
            .initial(|_| Delta::new().with("number", 0))
            .handler("one", |_, _| Ok(Delta::new().with("number", 1)))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(component.state().get_as::<i64>("number"), Some(0));
        assert_eq!(component.state().error(ErrorSlot::Load), None);
        assert_eq!(component.handlers().names().collect::<Vec<_>>(), vec!["one"]);
    }

    #[tokio::test]
    async fn test_build_missing_initial() {
        let result = ComponentBuilder::new(store()).build();
        assert!(matches!(result, Err(AwarenessError::MissingInitial)));
    }

    #[test]
    fn test_build_without_runtime() {
        let result = ComponentBuilder::new(store())
            .initial(|_| Delta::new())
            .build();
        assert!(matches!(result, Err(AwarenessError::NoRuntime)));
    }

    #[test]
    fn test_build_with_explicit_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let config = ComponentConfig::default().with_runtime(runtime.handle().clone());

        let result = ComponentBuilder::new(store())
            .with_config(config)
            .initial(|_| Delta::new())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_handler() {
        let result = ComponentBuilder::new(store())
            .handler("one", |_, _| Ok(()))
            .unwrap()
            .handler("one", |_, _| Ok(()));
        assert!(matches!(
            result,
            Err(AwarenessError::DuplicateHandler(name)) if name == "one"
        ));
    }

    #[test]
    fn test_reserved_names() {
        for reserved in ["initial", "load"] {
            let result = ComponentBuilder::new(store()).handler(reserved, |_, _| Ok(()));
            assert!(matches!(
                result,
                Err(AwarenessError::ReservedName(name)) if name == reserved
            ));
        }
    }

    #[tokio::test]
    async fn test_initial_sees_props_and_keeps_slots() {
        let config = ComponentConfig::default().with_props(|| {
            let mut props = Props::new();
            props.insert("start".into(), json!(41));
            props
        });
        let component = ComponentBuilder::new(store())
            .with_config(config)
            .initial(|props| Delta::new().with("number", props["start"].clone()))
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(component.state()).unwrap(),
            json!({ "number": 41, "loadError": null, "handlerError": null })
        );
    }

    #[tokio::test]
    async fn test_load_binding_only_with_load_handler() {
        let component = ComponentBuilder::new(store())
            .initial(|_| Delta::new())
            .load(|_: &Props, _: Option<&Props>| Ok(()))
            .build()
            .unwrap();
        assert!(component.handlers().contains("load"));
        assert_eq!(component.handlers().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unobserved_hook_is_wired() {
        let seen = Arc::new(Mutex::new(0));
        let hook = {
            let seen = seen.clone();
            Arc::new(move |_: &SequenceError| *seen.lock().unwrap() += 1)
        };
        let component = ComponentBuilder::new(store())
            .with_config(ComponentConfig::default().with_unobserved_hook(hook))
            .initial(|_| Delta::new())
            .handler("broken", |_, _| {
                Ok(StateChanger::try_steps(vec![Err(HandlerFailure::new("boom"))]))
            })
            .unwrap()
            .build()
            .unwrap();

        component.handlers().call("broken", vec![]).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
