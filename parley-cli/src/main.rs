use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use parley_client::{
    ConnectionState, IceServerConfig, MediaConfig, PeerIdentity, Role, SessionConfig,
    SessionController, SessionEvent, StaticChannelResolver, WebRtcMediaEngineFactory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Negotiate a WebRTC call through a signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a viewer's offer and answer it
    Master(SessionArgs),
    /// Send an offer to the channel's master
    Viewer(SessionArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Signaling channel; prompted for when omitted
    #[arg(short, long)]
    channel: Option<String>,

    #[arg(long)]
    signaling_url: String,

    /// Defaults to a random id
    #[arg(long)]
    client_id: Option<String>,

    /// STUN/TURN server URL, repeatable
    #[arg(long = "ice-server")]
    ice_servers: Vec<String>,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (role, args) = match Cli::parse().command {
        Commands::Master(args) => (Role::Master, args),
        Commands::Viewer(args) => (Role::Viewer, args),
    };

    let channel = match args.channel {
        Some(channel) => channel,
        None => Input::<String>::new()
            .with_prompt("Channel name")
            .interact_text()
            .context("Failed to read channel name")?,
    };
    let self_identity = args
        .client_id
        .map(PeerIdentity::from)
        .unwrap_or_else(PeerIdentity::generate);

    let ice_servers = args
        .ice_servers
        .into_iter()
        .map(IceServerConfig::stun)
        .collect();
    let resolver = StaticChannelResolver::new(args.signaling_url, ice_servers);
    let config = SessionConfig {
        negotiation_timeout: Duration::from_secs(args.timeout_secs),
        ..SessionConfig::for_channel(channel.clone())
    };

    let mut controller = SessionController::new(
        config,
        Arc::new(resolver),
        Arc::new(WebRtcMediaEngineFactory::new(MediaConfig::default())),
    );

    println!(
        "{} {} on '{}' as {}",
        "📡 Starting".green().bold(),
        role.to_string().bold(),
        channel,
        self_identity.to_string().dimmed()
    );
    let mut events = controller
        .start(role, self_identity)
        .await
        .context("Failed to start session")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Stopping...".yellow());
                controller.stop().await;
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let finished = event == SessionEvent::Stopped;
                print_event(&event);
                if finished {
                    break;
                }
            }
        }
    }

    // Drain whatever the session reported while stopping
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::SignalingConnected => println!("{}", "🔗 Signaling connected".cyan()),
        SessionEvent::SignalingDisconnected { reason } => {
            println!("{} {}", "🔌 Signaling disconnected:".yellow(), reason)
        }
        SessionEvent::ConnectionStateChanged(state) => {
            let label = format!("{state:?}");
            let label = match state {
                ConnectionState::Connected => label.green().bold(),
                ConnectionState::Failed | ConnectionState::Disconnected => label.red(),
                _ => label.normal(),
            };
            println!("🎥 Peer connection: {}", label);
        }
        SessionEvent::DataReceived(data) => {
            println!("📨 {}", String::from_utf8_lossy(data));
        }
        SessionEvent::NegotiationTimedOut(peer) => {
            println!("{} {}", "⏱  Negotiation timed out with".red().bold(), peer)
        }
        SessionEvent::Failed(reason) => println!("{} {}", "❌ Call failed:".red().bold(), reason),
        SessionEvent::Stopped => println!("{}", "✨ Session finished".green()),
    }
}
