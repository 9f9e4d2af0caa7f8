pub use parley_core::{NegotiationMessage, PeerIdentity, Role};

pub mod model {
    pub use parley_core::model::*;
}

pub mod codec {
    pub use parley_core::codec::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use parley_client::*;
}
