//! Structured logging for portal actions

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::errors::PortalError;

/// Structured logger for user-triggered portal actions
///
/// Every event carries the context id of the process so a whole session can
/// be followed through the logs.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_action_started(&self, action: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            action = %action,
            "Action started"
        );
    }

    pub fn log_action_succeeded(&self, action: &str, detail: &str) {
        tracing::info!(
            context_id = %self.context_id,
            action = %action,
            detail = %detail,
            "Action succeeded"
        );
    }

    pub fn log_action_failed(&self, action: &str, error: &PortalError) {
        if error.is_expected_state() || error.is_local() {
            tracing::info!(
                context_id = %self.context_id,
                action = %action,
                error = %error,
                "Action not performed"
            );
        } else {
            tracing::warn!(
                context_id = %self.context_id,
                action = %action,
                error = %error,
                "Action failed"
            );
        }
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over the configured filter.
pub fn init_logging(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
