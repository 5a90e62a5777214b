use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::notify::{NotificationRequest, NotificationTransport};

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered { message_id: Option<String> },
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Makes at most one delivery attempt per request. Failures are logged and
/// reported as [`DeliveryOutcome::Failed`], never as errors.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn NotificationTransport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>) -> Self {
        Self { transport }
    }

    /// Attempt delivery once. No retry, no deduplication.
    pub async fn send(&self, request: &NotificationRequest) -> DeliveryOutcome {
        match self.transport.deliver(&request.to, &request.body).await {
            Ok(delivery) => {
                tracing::info!(
                    item_id = %request.item_id,
                    transition = ?request.transition,
                    message_id = delivery.message_id.as_deref().unwrap_or("-"),
                    "notification delivered"
                );
                DeliveryOutcome::Delivered {
                    message_id: delivery.message_id,
                }
            }
            Err(err) => {
                let err = match err {
                    Error::Notification(_) => err,
                    other => Error::notification(other),
                };
                tracing::warn!(
                    item_id = %request.item_id,
                    transition = ?request.transition,
                    error = %err,
                    "notification failed"
                );
                DeliveryOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Run [`Dispatcher::send`] on its own tokio task.
    ///
    /// Outside a tokio runtime nothing is sent; the failure is logged and
    /// `None` is returned.
    pub fn spawn(&self, request: NotificationRequest) -> Option<JoinHandle<DeliveryOutcome>> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::warn!(
                    item_id = %request.item_id,
                    transition = ?request.transition,
                    error = %err,
                    "notification failed"
                );
                return None;
            }
        };
        let dispatcher = self.clone();
        Some(runtime.spawn(async move { dispatcher.send(&request).await }))
    }
}
