use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::handlers::AppState;
use crate::models::{
    ConnectIncomingMessage, ConnectOutgoingMessage, ConnectionRemovalRequest, GenericResponse,
};
use crate::services::DispatchedMessage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub qrcode_phrase: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateConnectionRequest {
    pub requesting_user_id: i64,
    pub to_be_connected_with_user_id: i64,
}

/// Generates a fresh pairing code for the user to present as a QR code. Any
/// previous live code for the user is overwritten.
pub async fn get_qr_code(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<QrCodeResponse> {
    let code = state.qr_codes.generate_and_store(user_id).await;
    Json(QrCodeResponse {
        qrcode_phrase: code,
    })
}

/// Inbound connect-protocol message. Outcomes travel over the push channel,
/// so the HTTP response only acknowledges receipt. An unknown
/// `connectionIntent` value fails deserialization and never reaches here.
pub async fn connect_message(
    State(state): State<AppState>,
    Json(incoming): Json<ConnectIncomingMessage>,
) -> StatusCode {
    state.connect.connect(incoming).await;
    StatusCode::ACCEPTED
}

/// Pre-scan guard check. The logged-in user id arrives in the `x-user-id`
/// header, resolved upstream; session handling itself lives outside this
/// service.
pub async fn validate_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ValidateConnectionRequest>,
) -> Result<Json<GenericResponse>, (StatusCode, Json<GenericResponse>)> {
    let logged_in_user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(GenericResponse::rejection(
                "Missing or invalid x-user-id header".to_string(),
            )),
        ))?;

    let outcome = state
        .guard
        .validate_connection(
            req.requesting_user_id,
            req.to_be_connected_with_user_id,
            logged_in_user_id,
        )
        .await
        .map_err(|e| {
            tracing::error!("Connection validation lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenericResponse::rejection(
                    "Failed to validate connection".to_string(),
                )),
            )
        })?;

    Ok(Json(outcome.unwrap_or_else(|| GenericResponse::ok(""))))
}

pub async fn remove_connection(
    State(state): State<AppState>,
    Json(req): Json<ConnectionRemovalRequest>,
) -> Json<GenericResponse> {
    if state.connect.remove_connection(&req).await {
        Json(GenericResponse::ok("Connection removed"))
    } else {
        Json(GenericResponse::rejection(
            "Failed to remove connection".to_string(),
        ))
    }
}

pub async fn get_all_connections(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ConnectOutgoingMessage>>, (StatusCode, Json<GenericResponse>)> {
    let connections = state
        .connect
        .get_all_connections_for_a_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list connections for user {}: {}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenericResponse::rejection(
                    "Failed to list connections".to_string(),
                )),
            )
        })?;

    Ok(Json(connections))
}

/// Poll side of the push channel: returns and clears everything queued for
/// the user.
pub async fn poll_messages(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<Vec<DispatchedMessage>> {
    Json(state.dispatcher.drain(user_id))
}
