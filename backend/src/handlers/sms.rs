use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;

use crate::handlers::AppState;
use crate::models::GenericResponse;
use crate::services::SmsError;

#[derive(Debug, Deserialize)]
pub struct SmsChallengeRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct SmsVerifyRequest {
    pub phone: String,
    pub code: String,
}

/// Sends a challenge code to the given phone number. The code itself only
/// travels over SMS, never in the HTTP response.
pub async fn send_sms_challenge(
    State(state): State<AppState>,
    Json(req): Json<SmsChallengeRequest>,
) -> Result<Json<GenericResponse>, (StatusCode, Json<GenericResponse>)> {
    match state.sms.send_challenge_code(&req.phone).await {
        Ok(_) => Ok(Json(GenericResponse::ok("Challenge code sent"))),
        Err(e @ SmsError::InvalidPhoneNumber(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(GenericResponse::rejection(e.to_string())),
        )),
        Err(e @ SmsError::SendFailed(_)) => Err((
            StatusCode::BAD_GATEWAY,
            Json(GenericResponse::rejection(e.to_string())),
        )),
    }
}

pub async fn verify_sms_challenge(
    State(state): State<AppState>,
    Json(req): Json<SmsVerifyRequest>,
) -> Json<GenericResponse> {
    if state.sms.is_valid_challenge_code(&req.phone, &req.code).await {
        Json(GenericResponse::ok("Challenge code accepted"))
    } else {
        Json(GenericResponse::rejection(
            "Challenge code is invalid or expired".to_string(),
        ))
    }
}
