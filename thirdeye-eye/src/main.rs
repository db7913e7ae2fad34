use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thirdeye_core::{ChannelConfig, EventPublisher};
use thirdeye_eye::camera::Camera;
use thirdeye_eye::models::OnnxDetector;
use thirdeye_eye::{DetectionPipeline, VisionConfig};
use tracing::{error, info, warn};

/// Detection process of the thirdeye aid: camera in, stable events out.
#[derive(Parser, Debug)]
#[command(name = "thirdeye-eye", version)]
struct Args {
    /// Path to the ONNX detection model file
    #[arg(long, default_value = "efficientdet_lite2.onnx")]
    model: PathBuf,

    /// Id of camera
    #[arg(long, default_value_t = 0)]
    camera_id: u32,

    /// Width of frame to capture from camera
    #[arg(long, default_value_t = 1280)]
    frame_width: u32,

    /// Height of frame to capture from camera
    #[arg(long, default_value_t = 720)]
    frame_height: u32,

    /// AMQP broker URI
    #[arg(long, default_value = thirdeye_core::config::DEFAULT_AMQP_URI)]
    amqp_uri: String,

    /// Queue carrying stable events
    #[arg(long, default_value = thirdeye_core::config::DEFAULT_QUEUE)]
    queue: String,

    /// Minimum confidence for a detection to count
    #[arg(long, default_value_t = 0.5)]
    score_threshold: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = VisionConfig {
        model_path: args.model,
        camera_id: args.camera_id,
        frame_width: args.frame_width,
        frame_height: args.frame_height,
        score_threshold: args.score_threshold,
        channel: ChannelConfig {
            uri: args.amqp_uri,
            queue: args.queue,
        },
        ..VisionConfig::default()
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Camera or model failure is fatal; nothing useful can run without them.
    let mut camera = Camera::open(&config)?;
    let detector = Arc::new(OnnxDetector::new(&config.model_path, &config)?);

    // A missing broker is not: keep detecting, skip the handoff.
    let publisher = match EventPublisher::connect(&config.channel).await {
        Ok(publisher) => Some(publisher),
        Err(e) => {
            warn!("Could not reach event channel: {}", e);
            None
        }
    };

    let mut pipeline = DetectionPipeline::new(&config, detector, publisher);
    info!(
        "Starting detection loop ({} backend)",
        pipeline.detector_name()
    );

    // Cooperative shutdown, checked between frames.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut frame_seq: u64 = 0;
    while !shutdown.load(Ordering::SeqCst) {
        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}", e);
                anyhow::bail!("camera stream lost");
            }
        };
        frame_seq += 1;
        pipeline.process_frame(&frame, frame_seq).await;
    }
    info!("Stopped by user.");

    if let Some(publisher) = pipeline.into_sink() {
        if let Err(e) = publisher.close().await {
            warn!("Failed to close event channel cleanly: {}", e);
        }
    }

    Ok(())
}
