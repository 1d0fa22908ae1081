//! Hook handlers of the audit plugin.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use folio_plugin::hooks::{HookError, HookHandler, HookPayload, HookSet};
use folio_plugin::{HookEvent, PluginLogger};

use crate::error::AuditError;
use crate::trail::AuditTrail;

/// Events recorded in the trail.
pub const AUDITED_EVENTS: [HookEvent; 13] = [
    HookEvent::AfterWebsiteCreate,
    HookEvent::AfterWebsiteModify,
    HookEvent::AfterWebsiteDelete,
    HookEvent::AfterCollectionCreate,
    HookEvent::AfterCollectionModify,
    HookEvent::AfterCollectionDelete,
    HookEvent::AfterCollectionEntryCreate,
    HookEvent::AfterCollectionEntryModify,
    HookEvent::AfterCollectionEntryDelete,
    HookEvent::AfterMediaCreate,
    HookEvent::AfterMediaConfirm,
    HookEvent::AfterMediaDelete,
    HookEvent::AfterCollectionTitleModify,
];

/// Everything the plugin subscribes.
pub fn hook_set(trail: Arc<AuditTrail>) -> HookSet {
    let recorder: Arc<dyn HookHandler> = Arc::new(Recorder { trail });
    let set = AUDITED_EVENTS
        .into_iter()
        .fold(HookSet::new(), |set, event| set.on(event, recorder.clone()));

    set.on_fn(HookEvent::BeforeWebsiteCreate, |payload, _| async move {
        check_website_hook_url(&payload).map_err(HookError::from)
    })
    .on_fn(HookEvent::BeforeWebsiteModify, |payload, _| async move {
        check_website_hook_url(&payload).map_err(HookError::from)
    })
    .on_fn(HookEvent::BeforeWebsiteHookCalled, |payload, logger| async move {
        let Some(call) = payload.webhook_call() else {
            return Ok(());
        };
        let secure = Url::parse(&call.url).is_ok_and(|url| url.scheme() == "https");
        if !secure {
            logger.warn(format!("cancelling webhook call to non-HTTPS URL {}", call.url));
            call.cancel();
        }
        Ok(())
    })
}

#[derive(Debug)]
struct Recorder {
    trail: Arc<AuditTrail>,
}

#[async_trait]
impl HookHandler for Recorder {
    async fn handle(&self, payload: &HookPayload, logger: &PluginLogger) -> Result<(), HookError> {
        match subject(payload) {
            Some(subject) => {
                logger.debug(format!("{} {subject}", payload.event()));
                self.trail.record(payload.event(), subject);
            }
            None => logger.warn(format!("no subject for {}", payload.event())),
        }
        Ok(())
    }
}

fn subject(payload: &HookPayload) -> Option<String> {
    use HookPayload::*;

    Some(match payload {
        AfterWebsiteCreate(p) | AfterWebsiteModify(p) | AfterWebsiteDelete(p) => {
            format!("website:{}", p.website.id)
        }
        AfterCollectionCreate(p) | AfterCollectionModify(p) | AfterCollectionDelete(p) => {
            format!("collection:{}", p.collection.id)
        }
        AfterCollectionEntryCreate(p) | AfterCollectionEntryModify(p) | AfterCollectionEntryDelete(p) => {
            format!("entry:{}", p.entry.entry.id)
        }
        AfterMediaCreate(p) | AfterMediaConfirm(p) | AfterMediaDelete(p) => format!("media:{}", p.media.id),
        AfterCollectionTitleModify(p) => format!("collection:{}", p.collection_id),
        _ => return None,
    })
}

fn check_website_hook_url(payload: &HookPayload) -> Result<(), AuditError> {
    let website = match payload {
        HookPayload::BeforeWebsiteCreate(p) | HookPayload::BeforeWebsiteModify(p) => &p.website,
        _ => return Ok(()),
    };
    let Some(url) = website.hook_url.as_deref() else {
        return Ok(());
    };

    let parsed = Url::parse(url).map_err(|source| AuditError::InvalidWebhookUrl {
        url: url.to_string(),
        source,
    })?;
    // http(s) URLs always parse with a non-empty host.
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AuditError::UnsupportedWebhookScheme { url: url.to_string() });
    }
    Ok(())
}
