mod peer;
mod role;
mod signaling;

pub use peer::PeerIdentity;
pub use role::Role;
pub use signaling::{IceCandidate, IceServerConfig, NegotiationMessage, SdpKind};
