use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use firewatch::detector::FireDetector;
use firewatch::monitor::{Monitor, MonitorConfig};
use firewatch::report::AlertReporter;

#[derive(Parser)]
#[command(name = "firewatch")]
#[command(about = "Poll a camera still on a fixed interval and report fire classifications")]
struct Cli {
    /// Backend endpoint that receives alerts
    #[arg(
        long,
        env = "BACKEND_URL",
        default_value = "http://backend:4000/api/alert"
    )]
    backend_url: String,

    /// Camera identity included in every payload
    #[arg(long, env = "CAMERA_ID", default_value = "690de2f8681e49c3be38c4b7")]
    camera_id: String,

    /// Path to the serialized classifier
    #[arg(long, value_name = "FILE", default_value = "fire_detection_model.rten")]
    model: PathBuf,

    /// Image polled each cycle
    #[arg(long, value_name = "FILE", default_value = "test.jpg")]
    image: PathBuf,

    /// Seconds between cycles
    #[arg(long, default_value_t = 30)]
    interval: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();

    // The model load is the only unrecovered failure; everything after
    // this point is contained per cycle.
    let detector = FireDetector::load(&args.model)?;
    info!("model loaded from {}", args.model.display());

    let reporter = AlertReporter::new(&args.backend_url, &args.camera_id)?;
    match reporter.send_status(&format!("fire watch online, polling every {}s", args.interval)) {
        Ok(Some(status)) => info!("status log accepted -> {}", status),
        Ok(None) => {}
        Err(e) => warn!("startup status not delivered: {}", e),
    }

    let config = MonitorConfig {
        image_path: args.image,
        interval: Duration::from_secs(args.interval),
    };

    info!("starting fire detection loop");
    Monitor::new(config, &detector, &reporter).run();

    Ok(())
}
