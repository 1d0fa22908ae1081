//! Bounded in-memory audit trail.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_plugin::HookEvent;

const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub event: HookEvent,
    /// `kind:id` of the changed object.
    pub subject: String,
    pub at: DateTime<Utc>,
}

/// Most recent records, oldest evicted first.
#[derive(Debug)]
pub struct AuditTrail {
    capacity: usize,
    records: Mutex<VecDeque<AuditRecord>>,
}

impl AuditTrail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, event: HookEvent, subject: impl Into<String>) {
        let mut records = self.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(AuditRecord {
            event,
            subject: subject.into(),
            at: Utc::now(),
        });
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditRecord> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AuditRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
