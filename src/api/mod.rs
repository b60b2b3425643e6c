/// API routes and handlers
pub mod countries;
pub mod favorites;
pub mod form;
pub mod health;

use crate::context::AppContext;
use axum::Router;
use serde::{Deserialize, Serialize};

/// Envelope for payload-carrying responses: `{"data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Envelope for acknowledgement responses: `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(countries::routes())
        .merge(favorites::routes())
}
