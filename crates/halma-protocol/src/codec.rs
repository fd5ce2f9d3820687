//! Frame encoding.
//!
//! The server never touches `serde_json` directly: it goes through a
//! [`Codec`], so the wire format can be swapped without touching the
//! connection handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to frame bytes and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Turns a message into one frame's bytes.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one inbound frame.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] for anything a client could send that is
    /// not a well-formed `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON frames, the format browser clients speak.
///
/// Output is always UTF-8, so the WebSocket transport sends it as text.
///
/// ```rust
/// use halma_protocol::{ClientMessage, Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = br#"{"payload":{"type":"start"}}"#;
/// let envelope: Envelope<ClientMessage> = codec.decode(frame).unwrap();
/// assert_eq!(envelope.seq, 0);
/// assert_eq!(envelope.payload, ClientMessage::Start);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
