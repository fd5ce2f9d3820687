//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection's outbound channel with the registry
//!   2. Loop: decode inbound frames into requests for the registry, and
//!      encode whatever the registry pushes back into outbound frames
//!   3. On exit (close, error, or panic) the guard tells the registry the
//!      connection is gone

use std::sync::Arc;

use halma_protocol::{ClientMessage, Codec, Envelope, PlayerId, RejectReason, ServerMessage};
use halma_room::{RegistryHandle, RoomError};
use halma_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::HalmaError;

/// Drop guard that frees the player's seat when the handler exits.
///
/// `Drop` is synchronous, so the disconnect is sent from a spawned task.
struct ConnectionGuard {
    player_id: PlayerId,
    registry: RegistryHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let _ = registry.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), HalmaError> {
    let player_id = PlayerId::from(conn.id());
    tracing::info!(%player_id, "player connected");

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.connect(player_id, tx).await?;
    let _guard = ConnectionGuard {
        player_id,
        registry: state.registry.clone(),
    };

    let mut seq: u64 = 1;

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };

                match state.codec.decode::<Envelope<ClientMessage>>(&data) {
                    Ok(envelope) => {
                        let forwarded = state.registry.send_message(player_id, envelope.payload).await;
                        if let Err(e) = forwarded {
                            tracing::warn!(%player_id, error = %e, "registry unavailable");
                            let _ = send(&conn, &state, &mut seq, rejection(&e)).await;
                            return Err(e.into());
                        }
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "undecodable frame");
                        let reply = ServerMessage::MoveRejected {
                            reason: RejectReason::IllegalMove,
                        };
                        send(&conn, &state, &mut seq, reply).await?;
                    }
                }
            }

            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => send(&conn, &state, &mut seq, msg).await?,
                    None => {
                        tracing::warn!(%player_id, "registry dropped the outbound channel");
                        break;
                    }
                }
            }
        }
    }

    // _guard drops here → disconnect fires.
    Ok(())
}

/// Wraps `msg` in the next envelope and writes it to the connection.
async fn send<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    seq: &mut u64,
    msg: ServerMessage,
) -> Result<(), HalmaError> {
    let envelope = Envelope::new(
        next_seq(seq),
        state.started.elapsed().as_millis() as u64,
        msg,
    );
    let bytes = state.codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// The reply for a request the registry could not take.
fn rejection(err: &RoomError) -> ServerMessage {
    ServerMessage::MoveRejected {
        reason: err.reason(),
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
