//! Hook events and their failure policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a failing handler affects the operation that fired the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first failure aborts the operation and becomes its error.
    Veto,
    /// Failures are logged and the remaining handlers still run.
    Advisory,
}

/// Every lifecycle point a plugin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    BeforeWebsiteCreate,
    AfterWebsiteCreate,
    BeforeWebsiteModify,
    AfterWebsiteModify,
    BeforeWebsiteDelete,
    AfterWebsiteDelete,

    BeforeCollectionCreate,
    AfterCollectionCreate,
    BeforeCollectionModify,
    AfterCollectionModify,
    BeforeCollectionDelete,
    AfterCollectionDelete,

    BeforeCollectionInputCreate,
    AfterCollectionInputCreate,
    BeforeCollectionInputModify,
    AfterCollectionInputModify,
    BeforeCollectionInputDelete,
    AfterCollectionInputDelete,

    BeforeCollectionEntryCreate,
    AfterCollectionEntryCreate,
    BeforeCollectionEntryModify,
    AfterCollectionEntryModify,
    BeforeCollectionEntryDelete,
    AfterCollectionEntryDelete,

    /// The HTTP listener is bound.
    ServerStart,
    /// All plugins are loaded.
    Setup,

    BeforeMediaCreate,
    AfterMediaCreate,
    /// Upload bytes were acknowledged by storage.
    AfterMediaConfirm,
    BeforeMediaDelete,
    AfterMediaDelete,

    BeforeCollectionTitleModify,
    AfterCollectionTitleModify,

    /// A website's outbound webhook is about to be called. Handlers may
    /// cancel the call through the payload; failures do not block it.
    BeforeWebsiteHookCalled,
}

impl HookEvent {
    /// All events, in declaration order.
    pub const ALL: [HookEvent; 34] = [
        Self::BeforeWebsiteCreate,
        Self::AfterWebsiteCreate,
        Self::BeforeWebsiteModify,
        Self::AfterWebsiteModify,
        Self::BeforeWebsiteDelete,
        Self::AfterWebsiteDelete,
        Self::BeforeCollectionCreate,
        Self::AfterCollectionCreate,
        Self::BeforeCollectionModify,
        Self::AfterCollectionModify,
        Self::BeforeCollectionDelete,
        Self::AfterCollectionDelete,
        Self::BeforeCollectionInputCreate,
        Self::AfterCollectionInputCreate,
        Self::BeforeCollectionInputModify,
        Self::AfterCollectionInputModify,
        Self::BeforeCollectionInputDelete,
        Self::AfterCollectionInputDelete,
        Self::BeforeCollectionEntryCreate,
        Self::AfterCollectionEntryCreate,
        Self::BeforeCollectionEntryModify,
        Self::AfterCollectionEntryModify,
        Self::BeforeCollectionEntryDelete,
        Self::AfterCollectionEntryDelete,
        Self::ServerStart,
        Self::Setup,
        Self::BeforeMediaCreate,
        Self::AfterMediaCreate,
        Self::AfterMediaConfirm,
        Self::BeforeMediaDelete,
        Self::AfterMediaDelete,
        Self::BeforeCollectionTitleModify,
        Self::AfterCollectionTitleModify,
        Self::BeforeWebsiteHookCalled,
    ];

    /// Returns the wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeWebsiteCreate => "beforeWebsiteCreate",
            Self::AfterWebsiteCreate => "afterWebsiteCreate",
            Self::BeforeWebsiteModify => "beforeWebsiteModify",
            Self::AfterWebsiteModify => "afterWebsiteModify",
            Self::BeforeWebsiteDelete => "beforeWebsiteDelete",
            Self::AfterWebsiteDelete => "afterWebsiteDelete",
            Self::BeforeCollectionCreate => "beforeCollectionCreate",
            Self::AfterCollectionCreate => "afterCollectionCreate",
            Self::BeforeCollectionModify => "beforeCollectionModify",
            Self::AfterCollectionModify => "afterCollectionModify",
            Self::BeforeCollectionDelete => "beforeCollectionDelete",
            Self::AfterCollectionDelete => "afterCollectionDelete",
            Self::BeforeCollectionInputCreate => "beforeCollectionInputCreate",
            Self::AfterCollectionInputCreate => "afterCollectionInputCreate",
            Self::BeforeCollectionInputModify => "beforeCollectionInputModify",
            Self::AfterCollectionInputModify => "afterCollectionInputModify",
            Self::BeforeCollectionInputDelete => "beforeCollectionInputDelete",
            Self::AfterCollectionInputDelete => "afterCollectionInputDelete",
            Self::BeforeCollectionEntryCreate => "beforeCollectionEntryCreate",
            Self::AfterCollectionEntryCreate => "afterCollectionEntryCreate",
            Self::BeforeCollectionEntryModify => "beforeCollectionEntryModify",
            Self::AfterCollectionEntryModify => "afterCollectionEntryModify",
            Self::BeforeCollectionEntryDelete => "beforeCollectionEntryDelete",
            Self::AfterCollectionEntryDelete => "afterCollectionEntryDelete",
            Self::ServerStart => "serverStart",
            Self::Setup => "setup",
            Self::BeforeMediaCreate => "beforeMediaCreate",
            Self::AfterMediaCreate => "afterMediaCreate",
            Self::AfterMediaConfirm => "afterMediaConfirm",
            Self::BeforeMediaDelete => "beforeMediaDelete",
            Self::AfterMediaDelete => "afterMediaDelete",
            Self::BeforeCollectionTitleModify => "beforeCollectionTitleModify",
            Self::AfterCollectionTitleModify => "afterCollectionTitleModify",
            Self::BeforeWebsiteHookCalled => "beforeWebsiteHookCalled",
        }
    }

    /// Returns `true` for `before*` events.
    pub fn is_before_hook(&self) -> bool {
        self.as_str().starts_with("before")
    }

    /// Veto for `before*` events, except the webhook call which is
    /// cancelled through its payload instead.
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.is_before_hook() && *self != Self::BeforeWebsiteHookCalled {
            FailurePolicy::Veto
        } else {
            FailurePolicy::Advisory
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
