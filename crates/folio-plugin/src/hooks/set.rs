//! A plugin's hook contribution, and closure-backed handlers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::definitions::HookEvent;
use super::payload::HookPayload;
use super::registry::{HookError, HookHandler};
use crate::logger::PluginLogger;

type BoxedHandlerFn =
    dyn Fn(HookPayload, PluginLogger) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync;

/// A closure-based hook handler for quick handler creation.
///
/// The closure receives owned clones so its future can be `'static`.
pub struct ClosureHandler {
    event: HookEvent,
    handler: Arc<BoxedHandlerFn>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("event", &self.event)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    pub fn new<F, Fut>(event: HookEvent, handler: F) -> Self
    where
        F: Fn(HookPayload, PluginLogger) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        let boxed: Arc<BoxedHandlerFn> = Arc::new(
            move |payload: HookPayload,
                  logger: PluginLogger|
                  -> BoxFuture<'static, Result<(), HookError>> {
                Box::pin(handler(payload, logger))
            },
        );
        Self {
            event,
            handler: boxed,
        }
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(&self, payload: &HookPayload, logger: &PluginLogger) -> Result<(), HookError> {
        (self.handler)(payload.clone(), logger.clone()).await
    }
}

/// Event-to-handler map contributed by one hooks plugin.
#[derive(Debug, Default)]
pub struct HookSet {
    handlers: Vec<(HookEvent, Arc<dyn HookHandler>)>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, event: HookEvent, handler: Arc<dyn HookHandler>) -> Self {
        self.handlers.push((event, handler));
        self
    }

    pub fn on_fn<F, Fut>(self, event: HookEvent, handler: F) -> Self
    where
        F: Fn(HookPayload, PluginLogger) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on(event, Arc::new(ClosureHandler::new(event, handler)))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl IntoIterator for HookSet {
    type Item = (HookEvent, Arc<dyn HookHandler>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}
