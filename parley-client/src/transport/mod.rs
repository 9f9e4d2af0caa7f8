mod relay_transport;
mod transport_event;

pub use relay_transport::*;
pub use transport_event::*;
