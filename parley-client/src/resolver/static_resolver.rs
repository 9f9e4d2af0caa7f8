use crate::resolver::{ChannelEndpoints, ChannelResolver};
use async_trait::async_trait;
use parley_core::{IceServerConfig, Role};
use tracing::debug;

/// Resolves every channel to one fixed relay and ICE server list.
#[derive(Debug, Clone)]
pub struct StaticChannelResolver {
    signaling_url: String,
    ice_servers: Vec<IceServerConfig>,
}

impl StaticChannelResolver {
    pub fn new(signaling_url: impl Into<String>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            signaling_url: signaling_url.into(),
            ice_servers,
        }
    }
}

#[async_trait]
impl ChannelResolver for StaticChannelResolver {
    async fn resolve_endpoints(
        &self,
        channel_name: &str,
        role: Role,
    ) -> anyhow::Result<ChannelEndpoints> {
        if channel_name.trim().is_empty() {
            anyhow::bail!("channel name is required");
        }

        debug!("Resolved channel '{}' for {} statically", channel_name, role);
        Ok(ChannelEndpoints {
            channel_id: channel_name.trim().to_owned(),
            signaling_url: self.signaling_url.clone(),
            ice_servers: self.ice_servers.clone(),
        })
    }
}
