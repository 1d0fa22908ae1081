//! End-to-end behaviour of a booted extension host.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use serde_json::json;
use tower::ServiceExt;

use folio_core::error::ErrorKind;
use folio_core::types::CollectionId;
use folio_entity::{CollectionEntryWithData, CollectionInput, Website};
use folio_plugin::hooks::{CollectionEntryPayload, CollectionInputPayload, WebsiteHookCallPayload, WebsitePayload};
use folio_plugin::loader::OneOrMany;
use folio_plugin::prelude::*;
use folio_plugin::{ExtensionHost, PluginSelection};

type CallLog = Arc<Mutex<Vec<String>>>;

fn recording_hooks(label: &'static str, log: CallLog) -> HookSet {
    HookSet::new()
        .on_fn(HookEvent::AfterCollectionEntryCreate, move |_, _| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(label.to_string());
                Ok(())
            }
        })
}

fn selection(field_types: &[&str], hooks: &[&str], routes: &[&str]) -> PluginSelection {
    let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
    PluginSelection {
        field_types: owned(field_types),
        hooks: owned(hooks),
        routes: owned(routes),
    }
}

fn entry_payload() -> CollectionEntryPayload {
    CollectionEntryPayload {
        entry: CollectionEntryWithData::new(CollectionId::new()),
    }
}

#[tokio::test]
async fn checkbox_entry_flows_through_registry_and_hooks() {
    let log: CallLog = Arc::default();
    let catalog = PluginCatalog::with_builtin_field_types()
        .hooks("first", {
            let log = log.clone();
            move |_| Ok(OneOrMany::One(recording_hooks("first", log.clone())))
        });

    let host = ExtensionHost::boot(&catalog, &selection(&["checkbox"], &["first"], &[]), None).unwrap();
    let registry = host.field_types();

    let raw = registry.serialize("checkbox", &json!(true)).unwrap();
    assert_eq!(raw, "true");
    registry
        .validate("checkbox", &raw, None, &FieldContext::new())
        .await
        .unwrap();

    let mut entry = entry_payload();
    let input = CollectionInput::new(entry.entry.entry.collection_id, "published", "checkbox");
    entry.entry.set_value(input.id, "checkbox", Some(raw));

    let report = host
        .dispatch(&HookPayload::AfterCollectionEntryCreate(entry.clone()))
        .await
        .unwrap();
    assert_eq!(report.invoked, 1);

    let stored = entry.entry.value_for(input.id).unwrap();
    assert_eq!(registry.deserialize("checkbox", stored).unwrap(), json!(true));
    assert_eq!(*log.lock().unwrap(), ["first"]);
}

#[tokio::test]
async fn handlers_run_in_manifest_then_subscription_order() {
    let log: CallLog = Arc::default();
    let catalog = PluginCatalog::new()
        .hooks("alpha", {
            let log = log.clone();
            move |_| {
                Ok(OneOrMany::Many(vec![
                    recording_hooks("alpha-1", log.clone()),
                    recording_hooks("alpha-2", log.clone()),
                ]))
            }
        })
        .hooks("beta", {
            let log = log.clone();
            move |_| Ok(OneOrMany::One(recording_hooks("beta", log.clone())))
        });

    let host = ExtensionHost::boot(&catalog, &selection(&[], &["beta", "alpha"], &[]), None).unwrap();
    host.dispatch(&HookPayload::AfterCollectionEntryCreate(entry_payload()))
        .await
        .unwrap();

    assert_eq!(*log.lock().unwrap(), ["beta", "alpha-1", "alpha-2"]);
}

#[tokio::test]
async fn before_hook_failure_vetoes_and_stops() {
    let log: CallLog = Arc::default();
    let catalog = PluginCatalog::new()
        .hooks("guard", |_| {
            Ok(OneOrMany::One(HookSet::new().on_fn(
                HookEvent::BeforeCollectionInputCreate,
                |payload, logger| async move {
                    let HookPayload::BeforeCollectionInputCreate(CollectionInputPayload { input }) = payload else {
                        return Ok(());
                    };
                    if input.name.starts_with('_') {
                        logger.info(format!("rejecting reserved input {}", input.name));
                        return Err(HookError::forbidden("Input names starting with '_' are reserved"));
                    }
                    Ok(())
                },
            )))
        })
        .hooks("after-guard", {
            let log = log.clone();
            move |_| {
                let log = log.clone();
                Ok(OneOrMany::One(HookSet::new().on_fn(
                    HookEvent::BeforeCollectionInputCreate,
                    move |_, _| {
                        let log = log.clone();
                        async move {
                            log.lock().unwrap().push("after-guard".to_string());
                            Ok(())
                        }
                    },
                )))
            }
        });

    let host = ExtensionHost::boot(&catalog, &selection(&[], &["guard", "after-guard"], &[]), None).unwrap();

    let reserved = CollectionInput::new(CollectionId::new(), "_internal", "text");
    let err = host
        .dispatch(&HookPayload::BeforeCollectionInputCreate(CollectionInputPayload {
            input: reserved,
        }))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(err.message.contains("reserved"));
    assert!(log.lock().unwrap().is_empty());

    let normal = CollectionInput::new(CollectionId::new(), "title", "text");
    let report = host
        .dispatch(&HookPayload::BeforeCollectionInputCreate(CollectionInputPayload {
            input: normal,
        }))
        .await
        .unwrap();
    assert_eq!(report.invoked, 2);
    assert_eq!(*log.lock().unwrap(), ["after-guard"]);
}

fn entry_modify_step(label: &'static str, log: CallLog, reject: bool) -> HookSet {
    HookSet::new().on_fn(HookEvent::BeforeCollectionEntryModify, move |_, _| {
        let log = log.clone();
        async move {
            if reject {
                return Err(HookError::new(format!("{label} refuses the edit")).with_status(409));
            }
            log.lock().unwrap().push(label.to_string());
            Ok(())
        }
    })
}

fn entry_modify_host(log: &CallLog, rejecting: Option<&'static str>) -> ExtensionHost {
    let catalog = ["a", "b", "c"].into_iter().fold(PluginCatalog::new(), |catalog, label| {
        let log = log.clone();
        let reject = rejecting == Some(label);
        catalog.hooks(label, move |_| Ok(OneOrMany::One(entry_modify_step(label, log.clone(), reject))))
    });
    ExtensionHost::boot(&catalog, &selection(&[], &["a", "b", "c"], &[]), None).unwrap()
}

#[tokio::test]
async fn entry_modify_handlers_run_in_registration_order() {
    let log: CallLog = Arc::default();
    let host = entry_modify_host(&log, None);

    let report = host
        .dispatch(&HookPayload::BeforeCollectionEntryModify(entry_payload()))
        .await
        .unwrap();

    assert_eq!(report.invoked, 3);
    assert_eq!(*log.lock().unwrap(), ["a", "b", "c"]);
}

#[tokio::test]
async fn middle_handler_veto_skips_the_rest() {
    let log: CallLog = Arc::default();
    let host = entry_modify_host(&log, Some("b"));

    let err = host
        .dispatch(&HookPayload::BeforeCollectionEntryModify(entry_payload()))
        .await
        .unwrap_err();

    assert_eq!(*log.lock().unwrap(), ["a"]);
    assert_eq!(err.message, "Rejected by plugin 'b': b refuses the edit");
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn after_hook_failure_is_advisory() {
    let log: CallLog = Arc::default();
    let catalog = PluginCatalog::new()
        .hooks("flaky", |_| {
            Ok(OneOrMany::One(HookSet::new().on_fn(
                HookEvent::AfterCollectionEntryCreate,
                |_, _| async { Err(HookError::new("search index unreachable").with_status(503)) },
            )))
        })
        .hooks("steady", {
            let log = log.clone();
            move |_| Ok(OneOrMany::One(recording_hooks("steady", log.clone())))
        });

    let host = ExtensionHost::boot(&catalog, &selection(&[], &["flaky", "steady"], &[]), None).unwrap();
    let report = host
        .dispatch(&HookPayload::AfterCollectionEntryCreate(entry_payload()))
        .await
        .unwrap();

    assert_eq!(report.invoked, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].owner, "flaky");
    assert_eq!(*log.lock().unwrap(), ["steady"]);
}

#[tokio::test]
async fn webhook_call_cancelled_without_failing() {
    let catalog = PluginCatalog::new()
        .hooks("quiet-hours", |_| {
            Ok(OneOrMany::One(HookSet::new().on_fn(
                HookEvent::BeforeWebsiteHookCalled,
                |payload, _| async move {
                    if let Some(call) = payload.webhook_call() {
                        call.cancel();
                    }
                    Ok(())
                },
            )))
        })
        .hooks("failing", |_| {
            Ok(OneOrMany::One(HookSet::new().on_fn(
                HookEvent::BeforeWebsiteHookCalled,
                |_, _| async { Err(HookError::new("ignored")) },
            )))
        });

    let host = ExtensionHost::boot(&catalog, &selection(&[], &["quiet-hours", "failing"], &[]), None).unwrap();

    let website = Website::new("Shop");
    let call = WebsiteHookCallPayload::new(website.id, "https://hooks.example/rebuild", json!({}));
    let payload = HookPayload::BeforeWebsiteHookCalled(call);

    let report = host.dispatch(&payload).await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.failures.len(), 1);
    assert!(payload.webhook_call().unwrap().is_cancelled());

    let untouched = HookPayload::AfterWebsiteCreate(WebsitePayload { website });
    assert!(!host.dispatch(&untouched).await.unwrap().cancelled);
}

#[tokio::test]
async fn invalid_names_skipped_unknown_names_rejected() {
    let catalog = PluginCatalog::with_builtin_field_types()
        .hooks("bad name", |_| Ok(OneOrMany::One(HookSet::new())));

    let host = ExtensionHost::boot(&catalog, &selection(&["text"], &["bad name"], &[]), None).unwrap();
    assert_eq!(host.summaries()[1].skipped, ["bad name"]);
    assert_eq!(host.field_types().ids(), ["text"]);

    let err = ExtensionHost::boot(&catalog, &selection(&["text"], &["missing"], &[]), None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn duplicate_field_type_aborts_boot() {
    let catalog = PluginCatalog::with_builtin_field_types()
        .field_type("checkbox-again", |_| {
            Ok(OneOrMany::One(Arc::new(folio_plugin::field_types::builtin::Checkbox) as Arc<dyn FieldType>))
        });

    let err = ExtensionHost::boot(&catalog, &selection(&["checkbox", "checkbox-again"], &[], &[]), None)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.message.contains("already registered"));
}

#[tokio::test]
async fn route_plugins_mounted_under_their_name() {
    let catalog = PluginCatalog::new().routes("status", |_| {
        Ok(OneOrMany::One(registrar(|router| {
            router.route("/ping", get(|| async { "pong" }))
        })))
    });

    let host = ExtensionHost::boot(&catalog, &selection(&[], &[], &["status"]), None).unwrap();
    let app = host.mount_routes(Router::new());

    let response = app
        .oneshot(Request::get("/plugins/status/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
