pub mod codec;
pub mod model;

pub use codec::{DecodeError, decode, encode};
pub use model::{
    IceCandidate, IceServerConfig, NegotiationMessage, PeerIdentity, Role, SdpKind,
};
