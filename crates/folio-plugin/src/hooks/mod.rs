//! Lifecycle hooks.
//!
//! Plugins subscribe handlers to [`HookEvent`]s. `before*` events may veto
//! the operation that fired them; `after*` events are informational and a
//! failing handler never affects the outcome.

pub mod definitions;
pub mod dispatcher;
pub mod payload;
pub mod registry;
pub mod set;

pub use definitions::{FailurePolicy, HookEvent};
pub use dispatcher::{DispatchReport, HandlerFailure, HookDispatcher};
pub use payload::{
    CollectionEntryPayload, CollectionInputPayload, CollectionPayload, CollectionTitlePayload,
    HookPayload, MediaPayload, ServerStartPayload, SetupPayload, WebhookCancellation,
    WebsiteHookCallPayload, WebsitePayload,
};
pub use registry::{HookError, HookHandler, HookRegistry, HookSubscription};
pub use set::{ClosureHandler, HookSet};
