//! Public contact-form intake.

use super::AppState;
use crate::domain::aggregates::{ContactStatus, ContactSubmission};
use crate::domain::events::{ContactEvent, DomainEvent};
use crate::error::{Error, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactSubmission>)> {
    payload.validate().map_err(|e| Error::Validation(e.to_string()))?;
    let now = Utc::now();
    let submission = ContactSubmission {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        subject: payload.subject,
        message: payload.message,
        status: ContactStatus::New,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_contact(&submission).await?;
    state
        .events
        .publish(DomainEvent::Contact(ContactEvent::Received { submission_id: submission.id }))
        .await;
    Ok((StatusCode::CREATED, Json(submission)))
}
