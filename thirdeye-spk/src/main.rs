use clap::Parser;
use std::sync::Arc;
use thirdeye_core::{ChannelConfig, EventConsumer};
use thirdeye_spk::engines::EspeakEngine;
use thirdeye_spk::playback::CommandPlayer;
use thirdeye_spk::{Announcer, SimulatedRangeSensor, SpeechConfig};
use tracing::{info, warn};

/// Announcement process of the thirdeye aid: stable events in, speech out.
#[derive(Parser, Debug)]
#[command(name = "thirdeye-spk", version)]
struct Args {
    /// AMQP broker URI
    #[arg(long, default_value = thirdeye_core::config::DEFAULT_AMQP_URI)]
    amqp_uri: String,

    /// Queue carrying stable events
    #[arg(long, default_value = thirdeye_core::config::DEFAULT_QUEUE)]
    queue: String,

    /// Synthesis language
    #[arg(long, default_value = "en")]
    language: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = SpeechConfig {
        language: args.language,
        channel: ChannelConfig {
            uri: args.amqp_uri,
            queue: args.queue,
        },
        ..SpeechConfig::default()
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Without a synthesizer and a player this process has nothing to do.
    let engine = Arc::new(EspeakEngine::new()?);
    let player = Arc::new(CommandPlayer::new()?);
    let sensor = Arc::new(SimulatedRangeSensor::new(
        config.min_distance_m,
        config.max_distance_m,
    ));

    let mut consumer = EventConsumer::connect(&config.channel)
        .await
        .map_err(|e| anyhow::anyhow!("Could not reach event channel: {}", e))?;

    let announcer = Announcer::new(&config, sensor, engine, player);
    announcer.run(&mut consumer).await?;

    if let Err(e) = consumer.close().await {
        warn!("Failed to close event channel cleanly: {}", e);
    }
    info!("Announcer stopped");
    Ok(())
}
