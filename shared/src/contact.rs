use crate::error::{json_response, parse_json, ApiError};
use crate::store::Store;
use crate::types::{is_valid_email, ContactMessage, NewContactMessage};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Append an inbound contact message. Every field must be present and the
/// email well-formed; nothing further happens to the message.
pub async fn submit_message(
    store: &dyn Store,
    req: ContactRequest,
) -> Result<ContactMessage, ApiError> {
    let name = req.name.trim();
    let email = req.email.trim();
    let subject = req.subject.trim();
    let message = req.message.trim();

    for (field, value) in [
        ("name", name),
        ("email", email),
        ("subject", subject),
        ("message", message),
    ] {
        if value.is_empty() {
            return Err(ApiError::Validation(format!("{} must not be empty", field)));
        }
    }

    if !is_valid_email(email) {
        return Err(ApiError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }

    let created = store
        .create_contact_message(NewContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        })
        .await?;

    Ok(created)
}

// POST /api/contact
pub async fn submit(store: &dyn Store, body: &Body) -> Result<Response<Body>, Error> {
    let req = match parse_json::<ContactRequest>(body) {
        Ok(req) => req,
        Err(err) => return err.into_response(),
    };

    tracing::info!("Contact message from {}", req.email);

    match submit_message(store, req).await {
        Ok(message) => json_response(StatusCode::OK, &message),
        Err(err) => err.into_response(),
    }
}
