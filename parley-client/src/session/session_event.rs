use crate::media::ConnectionState;
use bytes::Bytes;
use parley_core::PeerIdentity;

/// What the caller of a session gets to see.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignalingConnected,

    /// The relay socket closed or could not be opened. The session stops.
    SignalingDisconnected { reason: String },

    ConnectionStateChanged(ConnectionState),

    DataReceived(Bytes),

    /// The remote identity never got finalized. The session stops.
    NegotiationTimedOut(PeerIdentity),

    /// The media engine rejected negotiation data. The session stops.
    Failed(String),

    /// Last event of every session.
    Stopped,
}
