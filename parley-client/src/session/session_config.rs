use parley_core::PeerIdentity;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub channel_name: String,
    /// How long the remote identity may stay un-finalized.
    pub negotiation_timeout: Duration,
    pub timeout_check_interval: Duration,
    /// Upper bound for reaching the relay, handshake included.
    pub connect_timeout: Duration,
    /// Identity a viewer files its single master under.
    pub master_alias: PeerIdentity,
}

impl SessionConfig {
    pub fn for_channel(channel_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            ..Default::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_name: String::new(),
            negotiation_timeout: Duration::from_secs(30),
            timeout_check_interval: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
            master_alias: PeerIdentity::from("MASTER"),
        }
    }
}
