use axum::Json;

use crate::wire::{HealthResponse, MessageResponse};

pub(super) async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Fortnite Course Platform API",
    })
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
