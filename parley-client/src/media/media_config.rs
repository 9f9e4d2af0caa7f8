use parley_core::IceServerConfig;

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Used when the channel resolver returns no ICE servers.
    pub fallback_ice_servers: Vec<IceServerConfig>,
    pub data_channel_label: String,
    /// Open a data channel before the viewer's offer so the offer carries an
    /// application section even without local media.
    pub offer_data_channel: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            fallback_ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            data_channel_label: "parley".to_owned(),
            offer_data_channel: true,
        }
    }
}
