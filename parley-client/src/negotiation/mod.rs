mod coordinator;
mod peer_state;

pub use coordinator::*;
pub use peer_state::*;
