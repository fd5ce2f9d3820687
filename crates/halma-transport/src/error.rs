//! Transport failures.

use std::io;
use std::time::Duration;

/// What went wrong below the protocol layer.
///
/// Per-connection variants only end that connection's handler; `Bind`
/// and `LocalAddr` concern the listener itself.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("tcp accept failed: {0}")]
    Accept(#[source] io::Error),

    #[error("listener address unavailable: {0}")]
    LocalAddr(#[source] io::Error),

    /// The peer connected but did not complete the upgrade in time.
    #[error("handshake not completed within {0:?}")]
    HandshakeTimeout(Duration),

    /// The peer is gone; nothing more can be written.
    #[error("connection closed")]
    Closed,

    #[cfg(feature = "websocket")]
    #[error("websocket upgrade failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    #[cfg(feature = "websocket")]
    #[error("websocket frame error: {0}")]
    Frame(#[source] tokio_tungstenite::tungstenite::Error),
}
