//! Fire-and-forget publication of domain events over NATS.
//!
//! Downstream consumers (invoice mailer, analytics) subscribe to
//! `fastenkart.orders` / `fastenkart.stock` / `fastenkart.contact`.
//! Publishing never fails the originating request.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    client: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(client: Option<async_nats::Client>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn publish(&self, event: DomainEvent) {
        let Some(client) = &self.client else {
            tracing::debug!(?event, "event bus disabled, dropping event");
            return;
        };
        let subject = format!("fastenkart.{}", event.subject());
        match serde_json::to_vec(&event) {
            Ok(payload) => {
                if let Err(e) = client.publish(subject, payload.into()).await {
                    tracing::warn!(error = %e, "failed to publish domain event");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize domain event"),
        }
    }
}
