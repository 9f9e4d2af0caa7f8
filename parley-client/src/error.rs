use parley_core::{PeerIdentity, Role, SdpKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaEngineError {
    #[error("failed to create {0}")]
    CreateDescription(SdpKind),

    #[error("failed to apply {kind} description: {reason}")]
    SetDescription { kind: SdpKind, reason: String },

    #[error("failed to add ice candidate: {0}")]
    AddCandidate(String),

    #[error("failed to set up peer connection: {0}")]
    Setup(String),

    #[error("peer connection is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("relay connection failed: {0}")]
    ConnectFailed(String),

    #[error("relay socket is not connected")]
    NotConnected,
}

/// Negotiation data that arrived in a state where it cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("no remote identity known for outgoing {0}")]
    NoRemoteIdentity(&'static str),

    #[error("{role} endpoint cannot send a local {kind}")]
    UnexpectedDescription { role: Role, kind: SdpKind },

    #[error("unexpected {0} for this role")]
    UnexpectedMessage(&'static str),

    #[error("offer from {sender} while negotiating with {active}")]
    ForeignOffer {
        sender: PeerIdentity,
        active: PeerIdentity,
    },
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Media(#[from] MediaEngineError),

    #[error("negotiation coordinator is shut down")]
    ShutDown,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("failed to resolve channel `{channel}`: {reason}")]
    Resolve { channel: String, reason: String },

    #[error("failed to create media engine: {0}")]
    Media(#[from] MediaEngineError),
}
