mod channel_endpoints;
mod static_resolver;

pub use channel_endpoints::*;
pub use static_resolver::*;

use async_trait::async_trait;
use parley_core::Role;

/// Looks up where a channel's relay lives and which ICE servers to use.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    async fn resolve_endpoints(
        &self,
        channel_name: &str,
        role: Role,
    ) -> anyhow::Result<ChannelEndpoints>;
}
