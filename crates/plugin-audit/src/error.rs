//! Audit plugin error types.

use thiserror::Error;

use folio_plugin::HookError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Webhook URL '{url}' is not a valid URL: {source}")]
    InvalidWebhookUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Webhook URL '{url}' must use http or https")]
    UnsupportedWebhookScheme { url: String },
}

impl From<AuditError> for HookError {
    fn from(err: AuditError) -> Self {
        HookError::new(err.to_string()).with_status(422)
    }
}
