mod error;
mod media;
mod negotiation;
mod resolver;
mod session;
mod signaling;
mod transport;

pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use resolver::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;

pub use parley_core::{
    DecodeError, IceCandidate, IceServerConfig, NegotiationMessage, PeerIdentity, Role, SdpKind,
};
