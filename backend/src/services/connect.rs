use std::sync::Arc;

use crate::constants::{
    CONNECT_QUEUE_DESTINATION, MSG_CONFIRMATION_REQUEST, MSG_CONNECTION_DENIED,
    MSG_CONNECTION_SAVE_FAILED, MSG_CONNECTION_SAVED, MSG_INVALID_QR_CODE,
};
use crate::db::connections::{ConnectionLedger, LedgerError};
use crate::db::users::UserDirectory;
use crate::models::{
    ConnectIncomingMessage, ConnectOutgoingMessage, Connection, ConnectionIntent,
    ConnectionRemovalRequest, UsernameInfo,
};
use crate::services::cache::CodeCache;
use crate::services::dispatch::MessageDispatcher;
use crate::services::qrcode::QrCodeService;

/// Drives the connect handshake: interprets an incoming connect message,
/// validates the scanned pairing code, and walks the confirm/deny protocol
/// to a terminal outcome, fanning results out over the push channel.
///
/// The handshake is stateless on the server. The solicitation and the
/// decision are two independent calls; the in-between state lives with the
/// client.
pub struct ConnectService<L, U, C, D> {
    ledger: Arc<L>,
    users: Arc<U>,
    qr_codes: QrCodeService<C>,
    dispatcher: Arc<D>,
}

impl<L, U, C, D> ConnectService<L, U, C, D>
where
    L: ConnectionLedger,
    U: UserDirectory,
    C: CodeCache,
    D: MessageDispatcher,
{
    pub fn new(
        ledger: Arc<L>,
        users: Arc<U>,
        qr_codes: QrCodeService<C>,
        dispatcher: Arc<D>,
    ) -> Self {
        Self {
            ledger,
            users,
            qr_codes,
            dispatcher,
        }
    }

    /// Entry point for an incoming connect message. Every terminal outcome
    /// ends in at least one dispatched message; there is no silent failure.
    pub async fn connect(&self, incoming: ConnectIncomingMessage) {
        let provided = incoming.qrcode_phrase.as_deref().unwrap_or("");
        let valid = self
            .qr_codes
            .validate(provided, incoming.to_be_connected_with_user_id)
            .await;

        if !valid {
            tracing::info!(
                "Rejected connect attempt from user {} to user {}: invalid QR code",
                incoming.requesting_user_id,
                incoming.to_be_connected_with_user_id
            );
            let message = ConnectOutgoingMessage::error(
                incoming.to_be_connected_with_user_id,
                MSG_INVALID_QR_CODE,
                None,
            );
            self.dispatch(message).await;
            return;
        }

        let outgoing = self
            .handle_connection_intent(
                incoming.connection_intent,
                incoming.requesting_user_id,
                incoming.to_be_connected_with_user_id,
            )
            .await;

        for message in outgoing {
            self.dispatch(message).await;
        }
    }

    /// The protocol state machine past code validation: no intent solicits a
    /// decision from the counterpart; confirmed persists and reports to both
    /// parties; denied reports to both parties without persisting.
    pub async fn handle_connection_intent(
        &self,
        intent: ConnectionIntent,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
    ) -> Vec<ConnectOutgoingMessage> {
        match intent {
            ConnectionIntent::Unspecified => {
                let handle = self.resolve_handle(to_be_connected_with_user_id).await;
                vec![ConnectOutgoingMessage::plain(
                    to_be_connected_with_user_id,
                    MSG_CONFIRMATION_REQUEST,
                    Some(handle),
                )]
            }
            ConnectionIntent::Confirmed => {
                match self
                    .save_connection_details(requesting_user_id, to_be_connected_with_user_id)
                    .await
                {
                    Ok(connection) => {
                        tracing::info!(
                            "Saved connection {} between users {} and {}",
                            connection.id,
                            requesting_user_id,
                            to_be_connected_with_user_id
                        );
                        self.notify_both_parties(
                            requesting_user_id,
                            to_be_connected_with_user_id,
                            true,
                            MSG_CONNECTION_SAVED,
                        )
                        .await
                    }
                    // Persistence failure (including losing an insert race to
                    // a concurrent confirmation) is reported to both parties,
                    // never propagated to the caller.
                    Err(e) => {
                        tracing::warn!(
                            "Failed to save connection between users {} and {}: {}",
                            requesting_user_id,
                            to_be_connected_with_user_id,
                            e
                        );
                        self.notify_both_parties(
                            requesting_user_id,
                            to_be_connected_with_user_id,
                            false,
                            MSG_CONNECTION_SAVE_FAILED,
                        )
                        .await
                    }
                }
            }
            ConnectionIntent::Denied => {
                self.notify_both_parties(
                    requesting_user_id,
                    to_be_connected_with_user_id,
                    false,
                    MSG_CONNECTION_DENIED,
                )
                .await
            }
        }
    }

    /// Direct persistence attempt, no guard checks. Duplicate and
    /// self-connection writes surface as typed ledger errors.
    pub async fn save_connection_details(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
    ) -> Result<Connection, LedgerError> {
        self.ledger
            .insert(requesting_user_id, to_be_connected_with_user_id)
            .await
    }

    /// Deletes the exact ordered pair as stored. Returns false for a
    /// self-referencing request without touching storage, and false when the
    /// ledger reports an error.
    pub async fn remove_connection(&self, request: &ConnectionRemovalRequest) -> bool {
        if request.requesting_user_id == request.connected_with_user_id {
            return false;
        }
        match self
            .ledger
            .delete_by_ordered_pair(request.requesting_user_id, request.connected_with_user_id)
            .await
        {
            Ok(0) => {
                tracing::warn!(
                    "Removal request from user {} for connection with user {} matched no stored row",
                    request.requesting_user_id,
                    request.connected_with_user_id
                );
                true
            }
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to remove connection ({}, {}): {}",
                    request.requesting_user_id,
                    request.connected_with_user_id,
                    e
                );
                false
            }
        }
    }

    /// One message per connection targeting `user_id`, each carrying the
    /// requester's display handle. Empty when the user has none.
    pub async fn get_all_connections_for_a_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConnectOutgoingMessage>, LedgerError> {
        let connections = self.ledger.find_all_by_target(user_id).await?;
        let mut outgoing = Vec::with_capacity(connections.len());
        for connection in connections {
            let handle = self.resolve_handle(connection.requesting_user_id).await;
            outgoing.push(ConnectOutgoingMessage::success(user_id, "", Some(handle)));
        }
        Ok(outgoing)
    }

    async fn dispatch(&self, message: ConnectOutgoingMessage) {
        let recipient = message.recipient_user_id;
        self.dispatcher
            .send_to_user(recipient, CONNECT_QUEUE_DESTINATION, message)
            .await;
    }

    /// One message per party; each carries the other party's display handle.
    async fn notify_both_parties(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
        success: bool,
        text: &str,
    ) -> Vec<ConnectOutgoingMessage> {
        let requester_handle = self.resolve_handle(requesting_user_id).await;
        let target_handle = self.resolve_handle(to_be_connected_with_user_id).await;

        let build: fn(i64, &str, Option<UsernameInfo>) -> ConnectOutgoingMessage = if success {
            ConnectOutgoingMessage::success
        } else {
            ConnectOutgoingMessage::error
        };

        vec![
            build(requesting_user_id, text, Some(target_handle)),
            build(to_be_connected_with_user_id, text, Some(requester_handle)),
        ]
    }

    /// A missing user must not abort a handshake that already completed
    /// against storage; fall back to a bare-id handle and log it.
    async fn resolve_handle(&self, user_id: i64) -> UsernameInfo {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => UsernameInfo::from(&user),
            Ok(None) => {
                tracing::warn!("No user row for id {} while resolving handle", user_id);
                UsernameInfo {
                    user_id,
                    username: String::new(),
                }
            }
            Err(e) => {
                tracing::warn!("User lookup failed for id {}: {}", user_id, e);
                UsernameInfo {
                    user_id,
                    username: String::new(),
                }
            }
        }
    }
}
