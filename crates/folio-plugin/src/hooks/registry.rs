//! Hook registry. Plugins subscribe handlers by event; handlers run in
//! subscription order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use folio_core::AppError;

use super::definitions::HookEvent;
use super::payload::HookPayload;
use super::set::HookSet;
use crate::logger::PluginLogger;

/// Failure reported by a hook handler.
///
/// On veto events the message and status become the caller's error.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HookError {
    pub message: String,
    /// HTTP status suggested to the caller.
    pub status: u16,
}

impl HookError {
    /// A rejection with status 400.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 400,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message).with_status(403)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl From<AppError> for HookError {
    fn from(err: AppError) -> Self {
        Self {
            status: err.status_code().as_u16(),
            message: err.message,
        }
    }
}

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles one dispatch. An `Err` vetoes `before*` events.
    async fn handle(&self, payload: &HookPayload, logger: &PluginLogger) -> Result<(), HookError>;
}

/// One handler subscribed to one event.
#[derive(Debug, Clone)]
pub struct HookSubscription {
    pub event: HookEvent,
    /// Plugin that subscribed the handler.
    pub owner: String,
    pub handler: Arc<dyn HookHandler>,
    /// Logger passed to the handler on every dispatch.
    pub logger: PluginLogger,
}

/// Subscriptions grouped by event.
///
/// Mutated only while plugins load, then frozen behind an `Arc` and read
/// by [`HookDispatcher`](super::HookDispatcher).
#[derive(Debug, Default)]
pub struct HookRegistry {
    subscriptions: HashMap<HookEvent, Vec<HookSubscription>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the event's list.
    pub fn subscribe(&mut self, event: HookEvent, handler: Arc<dyn HookHandler>, owner: &str) {
        let entries = self.subscriptions.entry(event).or_default();
        entries.push(HookSubscription {
            event,
            owner: owner.to_string(),
            handler,
            logger: PluginLogger::new(owner),
        });

        info!(
            hook = %event,
            plugin = %owner,
            position = entries.len(),
            "Hook handler subscribed"
        );
    }

    /// Subscribes every handler of a set, keeping the set's order.
    pub fn subscribe_set(&mut self, set: HookSet, owner: &str) {
        for (event, handler) in set {
            self.subscribe(event, handler, owner);
        }
    }

    /// Handlers for an event, in subscription order.
    pub fn subscribers(&self, event: HookEvent) -> &[HookSubscription] {
        self.subscriptions
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_subscribers(&self, event: HookEvent) -> bool {
        !self.subscribers(event).is_empty()
    }

    pub fn subscriber_count(&self, event: HookEvent) -> usize {
        self.subscribers(event).len()
    }

    /// Total number of subscriptions across all events.
    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events with at least one subscriber.
    pub fn registered_events(&self) -> Vec<HookEvent> {
        HookEvent::ALL
            .into_iter()
            .filter(|e| self.has_subscribers(*e))
            .collect()
    }
}
