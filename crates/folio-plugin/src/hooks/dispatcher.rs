//! Hook dispatcher.
//!
//! Handlers run sequentially in subscription order, each awaited before
//! the next starts:
//! - Veto events stop at the first failure and return it as the
//!   operation's error.
//! - Advisory events run every handler; failures are logged and
//!   collected in the report.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tracing::{debug, info, warn};

use folio_core::AppResult;
use folio_core::error::{AppError, ErrorKind};

use super::definitions::{FailurePolicy, HookEvent};
use super::payload::HookPayload;
use super::registry::{HookError, HookRegistry, HookSubscription};

/// A handler failure on an advisory event.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub owner: String,
    pub error: HookError,
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub event: HookEvent,
    /// Handlers that were called.
    pub invoked: usize,
    /// Failures tolerated under the advisory policy.
    pub failures: Vec<HandlerFailure>,
    /// Whether a handler cancelled the outbound webhook call.
    pub cancelled: bool,
}

/// Dispatches events to the handlers in a frozen [`HookRegistry`].
#[derive(Debug)]
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
    /// Per-handler time limit; `None` waits indefinitely.
    timeout: Option<Duration>,
}

impl HookDispatcher {
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Limits how long each handler may run. A handler that overruns counts
    /// as failed with status 504.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Runs every handler subscribed to the payload's event.
    ///
    /// Returns `Err` only when a veto event is rejected.
    pub async fn dispatch(&self, payload: &HookPayload) -> AppResult<DispatchReport> {
        let event = payload.event();
        let policy = event.failure_policy();
        let subscribers = self.registry.subscribers(event);

        let mut report = DispatchReport {
            event,
            invoked: 0,
            failures: Vec::new(),
            cancelled: false,
        };

        if !subscribers.is_empty() {
            debug!(hook = %event, handler_count = subscribers.len(), "Dispatching hook");
        }

        for subscription in subscribers {
            report.invoked += 1;

            let Err(error) = self.invoke(subscription, payload).await else {
                continue;
            };

            match policy {
                FailurePolicy::Veto => {
                    info!(
                        hook = %event,
                        plugin = %subscription.owner,
                        status = error.status,
                        reason = %error.message,
                        "Hook handler vetoed operation"
                    );
                    return Err(veto_error(&subscription.owner, error));
                }
                FailurePolicy::Advisory => {
                    warn!(
                        hook = %event,
                        plugin = %subscription.owner,
                        status = error.status,
                        error = %error.message,
                        "Hook handler failed, continuing"
                    );
                    report.failures.push(HandlerFailure {
                        owner: subscription.owner.clone(),
                        error,
                    });
                }
            }
        }

        if let Some(call) = payload.webhook_call() {
            report.cancelled = call.is_cancelled();
            if report.cancelled {
                info!(
                    website_id = %call.website_id,
                    url = %call.url,
                    "Website webhook call cancelled by hook"
                );
            }
        }

        Ok(report)
    }

    async fn invoke(
        &self,
        subscription: &HookSubscription,
        payload: &HookPayload,
    ) -> Result<(), HookError> {
        let call = subscription.handler.handle(payload, &subscription.logger);
        match self.timeout {
            None => call.await,
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(HookError::new(format!(
                    "Hook handler timed out after {}ms",
                    limit.as_millis()
                ))
                .with_status(504)),
            },
        }
    }
}

/// The caller sees the plugin's message and status unchanged.
fn veto_error(owner: &str, error: HookError) -> AppError {
    let status = StatusCode::from_u16(error.status).ok();
    let err = AppError::with_source(
        ErrorKind::from_status(error.status),
        format!("Rejected by plugin '{owner}': {}", error.message),
        error,
    );
    match status {
        Some(status) => err.with_status(status),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use folio_entity::Website;

    use super::*;
    use crate::hooks::payload::WebsitePayload;
    use crate::hooks::set::HookSet;

    fn website_payload(before: bool) -> HookPayload {
        let payload = WebsitePayload {
            website: Website::new("Docs"),
        };
        if before {
            HookPayload::BeforeWebsiteCreate(payload)
        } else {
            HookPayload::AfterWebsiteCreate(payload)
        }
    }

    #[tokio::test]
    async fn test_empty_dispatch() {
        let dispatcher = HookDispatcher::new(Arc::new(HookRegistry::new()));
        let report = dispatcher.dispatch(&website_payload(true)).await.unwrap();
        assert_eq!(report.invoked, 0);
        assert!(report.failures.is_empty());
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_veto_carries_status_and_owner() {
        let mut registry = HookRegistry::new();
        registry.subscribe_set(
            HookSet::new().on_fn(HookEvent::BeforeWebsiteCreate, |_, _| async {
                Err(HookError::new("title taken").with_status(409))
            }),
            "unique-titles",
        );

        let err = HookDispatcher::new(Arc::new(registry))
            .dispatch(&website_payload(true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "Rejected by plugin 'unique-titles': title taken");
    }

    #[tokio::test]
    async fn test_veto_answers_with_thrown_status() {
        let mut registry = HookRegistry::new();
        registry.subscribe_set(
            HookSet::new().on_fn(HookEvent::BeforeWebsiteCreate, |_, _| async {
                Err(HookError::new("slow down").with_status(429))
            }),
            "rate-limit",
        );

        let err = HookDispatcher::new(Arc::new(registry))
            .dispatch(&website_payload(true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Plugin);
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let response = axum::response::IntoResponse::into_response(err);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let mut registry = HookRegistry::new();
        registry.subscribe_set(
            HookSet::new()
                .on_fn(HookEvent::AfterWebsiteCreate, |_, _| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                })
                .on_fn(HookEvent::AfterWebsiteCreate, move |_, _| {
                    let counter = counter.clone();
                    async move {
                        *counter.lock().unwrap() += 1;
                        Ok(())
                    }
                }),
            "slow",
        );

        let report = HookDispatcher::new(Arc::new(registry))
            .with_timeout(Some(Duration::from_secs(1)))
            .dispatch(&website_payload(false))
            .await
            .unwrap();
        assert_eq!(report.invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error.status, 504);
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
