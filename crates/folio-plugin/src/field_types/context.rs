//! Request context handed to field types, and the loopback data port.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;
use url::{PathSegmentsMut, Url};

use folio_core::error::ErrorKind;
use folio_core::types::{CollectionId, UserId, WebsiteId};
use folio_core::{AppError, AppResult};

/// Read access to the public API, authenticated as the requesting user.
///
/// Field types use this to look up related content while validating or
/// rendering, seeing exactly what the user is permitted to see.
#[async_trait]
pub trait AuthenticatedDataPort: Send + Sync {
    /// Fetches `path`, relative to the current website and collection
    /// scope, and decodes the JSON body.
    async fn fetch_json(&self, path: &str) -> AppResult<serde_json::Value>;
}

/// Where a field-type operation is happening and on whose behalf.
#[derive(Clone, Default)]
pub struct FieldContext {
    pub website_id: Option<WebsiteId>,
    pub collection_id: Option<CollectionId>,
    pub user_id: Option<UserId>,
    /// Raw `Authorization` header of the originating request.
    pub authorization: Option<String>,
    data_port: Option<Arc<dyn AuthenticatedDataPort>>,
}

impl FieldContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_website(mut self, website_id: WebsiteId) -> Self {
        self.website_id = Some(website_id);
        self
    }

    pub fn with_collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    pub fn with_data_port(mut self, port: Arc<dyn AuthenticatedDataPort>) -> Self {
        self.data_port = Some(port);
        self
    }

    /// The data port for this request.
    pub fn data_port(&self) -> AppResult<&dyn AuthenticatedDataPort> {
        self.data_port
            .as_deref()
            .ok_or_else(|| AppError::internal("No data port is attached to this field context"))
    }
}

impl fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContext")
            .field("website_id", &self.website_id)
            .field("collection_id", &self.collection_id)
            .field("user_id", &self.user_id)
            .field("authorization", &self.authorization.as_ref().map(|_| "***"))
            .field("data_port", &self.data_port.is_some())
            .finish()
    }
}

/// Builds API URLs scoped to a website and optionally a collection.
///
/// `https://cms.example/api/websites/{w}/collections/{c}/{path}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrlBuilder {
    base: Url,
    website_id: Option<WebsiteId>,
    collection_id: Option<CollectionId>,
}

impl ApiUrlBuilder {
    /// Parses the server's public base URL.
    pub fn new(base: &str) -> AppResult<Self> {
        let base = Url::parse(base).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid public URL '{base}'"),
                e,
            )
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Public URL '{base}' cannot be used as a base"
            )));
        }
        Ok(Self {
            base,
            website_id: None,
            collection_id: None,
        })
    }

    pub fn website(mut self, website_id: WebsiteId) -> Self {
        self.website_id = Some(website_id);
        self
    }

    pub fn collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    /// The scoped prefix, without a trailing slash.
    pub fn scope(&self) -> AppResult<Url> {
        let website = match (self.website_id, self.collection_id) {
            (None, Some(_)) => {
                return Err(AppError::validation(
                    "A collection scope requires a website scope",
                ));
            }
            (website, _) => website,
        };

        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = path_segments(&mut url)?;
            segments.pop_if_empty().push("api");
            if let Some(website) = website {
                segments.push("websites").push(&website.to_string());
            }
            if let Some(collection) = self.collection_id {
                segments.push("collections").push(&collection.to_string());
            }
        }
        Ok(url)
    }

    /// Resolves `path` (which may carry a query) below the scoped prefix.
    ///
    /// Paths that resolve outside the prefix are rejected.
    pub fn build(&self, path: &str) -> AppResult<Url> {
        let scope = self.scope()?;
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Ok(scope);
        }

        let mut dir = scope.clone();
        path_segments(&mut dir)?.push("");
        let url = dir.join(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Invalid API path '{path}'"),
                e,
            )
        })?;

        if url.origin() != dir.origin() || !url.path().starts_with(dir.path()) {
            return Err(AppError::validation(format!(
                "API path '{path}' leaves the {} scope",
                scope.path()
            )));
        }
        Ok(url)
    }
}

fn path_segments(url: &mut Url) -> AppResult<PathSegmentsMut<'_>> {
    url.path_segments_mut()
        .map_err(|()| AppError::configuration("API base URL cannot carry a path"))
}

/// Data port that calls this server's own public API over HTTP.
#[derive(Debug, Clone)]
pub struct LoopbackDataPort {
    client: reqwest::Client,
    urls: ApiUrlBuilder,
    authorization: Option<String>,
}

impl LoopbackDataPort {
    pub fn new(client: reqwest::Client, urls: ApiUrlBuilder, authorization: Option<String>) -> Self {
        Self {
            client,
            urls,
            authorization,
        }
    }

    /// Scopes a port to the website, collection, and credentials of `ctx`.
    pub fn for_context(client: reqwest::Client, base: &ApiUrlBuilder, ctx: &FieldContext) -> Self {
        let mut urls = base.clone();
        if let Some(website) = ctx.website_id {
            urls = urls.website(website);
        }
        if let Some(collection) = ctx.collection_id {
            urls = urls.collection(collection);
        }
        Self::new(client, urls, ctx.authorization.clone())
    }
}

#[async_trait]
impl AuthenticatedDataPort for LoopbackDataPort {
    async fn fetch_json(&self, path: &str) -> AppResult<serde_json::Value> {
        let url = self.urls.build(path)?;
        debug!(url = %url, "Loopback API request");

        let mut request = self.client.get(url.clone());
        if let Some(auth) = &self.authorization {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Loopback request to {url} failed"),
                e,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::new(
                ErrorKind::from_status(status.as_u16()),
                format!("Loopback request to {url} returned {status}"),
            ));
        }

        response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Loopback response from {url} is not JSON"),
                e,
            )
        })
    }
}
