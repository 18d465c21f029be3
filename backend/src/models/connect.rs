use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::UsernameInfo;

/// Durable connection row. The pair is stored in the orientation it was
/// requested in, but the unordered pair is unique across the table (see the
/// connections migration).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub requesting_user_id: i64,
    pub to_be_connected_with_user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// The responder's decision, carried in a follow-up connect message after the
/// solicitation. Anything outside these three wire values is rejected at
/// deserialization and never reaches the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionIntent {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "denied")]
    Denied,
}

/// Inbound connect-protocol message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectIncomingMessage {
    pub requesting_user_id: i64,
    pub to_be_connected_with_user_id: i64,
    #[serde(default)]
    pub qrcode_phrase: Option<String>,
    #[serde(default)]
    pub connection_intent: ConnectionIntent,
}

/// Outbound connect-protocol message. `recipient_user_id` is the routing key
/// for the push channel and is not part of the wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOutgoingMessage {
    #[serde(skip)]
    pub recipient_user_id: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<UsernameInfo>,
}

impl ConnectOutgoingMessage {
    pub fn success(recipient_user_id: i64, message: &str, to: Option<UsernameInfo>) -> Self {
        Self {
            recipient_user_id,
            message: message.to_string(),
            connection_success: Some(true),
            connection_error: None,
            to,
        }
    }

    pub fn error(recipient_user_id: i64, message: &str, to: Option<UsernameInfo>) -> Self {
        Self {
            recipient_user_id,
            message: message.to_string(),
            connection_success: None,
            connection_error: Some(true),
            to,
        }
    }

    pub fn plain(recipient_user_id: i64, message: &str, to: Option<UsernameInfo>) -> Self {
        Self {
            recipient_user_id,
            message: message.to_string(),
            connection_success: None,
            connection_error: None,
            to,
        }
    }
}

/// Request to delete a connection by the exact ordered pair as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRemovalRequest {
    pub requesting_user_id: i64,
    pub connected_with_user_id: i64,
}

/// Structured validation outcome; rejections carry a human-readable reason
/// instead of surfacing as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResponse {
    pub boolean_message: bool,
    pub response_message: String,
}

impl GenericResponse {
    pub fn rejection(reason: String) -> Self {
        Self {
            boolean_message: false,
            response_message: reason,
        }
    }

    pub fn ok(message: &str) -> Self {
        Self {
            boolean_message: true,
            response_message: message.to_string(),
        }
    }
}
