use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::detector::{Classifier, Prediction};
use crate::report::AlertSink;

/// Fixed settings for the polling loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Image polled each cycle.
    pub image_path: PathBuf,
    /// Sleep between cycles.
    pub interval: Duration,
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No file at the source path; nothing classified, nothing reported.
    NoImage,
    /// File present but not decodable as an image.
    UnreadableImage,
    /// The classifier returned an error.
    PredictionFailed,
    /// Alert delivered, with the backend's HTTP status code.
    Delivered { verdict: Prediction, status: u16 },
    /// Classification succeeded but the alert was lost.
    DeliveryFailed(Prediction),
}

/// Single-threaded check-file -> predict -> report loop.
pub struct Monitor<'a, C, S> {
    config: MonitorConfig,
    classifier: &'a C,
    sink: &'a S,
}

impl<'a, C: Classifier, S: AlertSink> Monitor<'a, C, S> {
    pub fn new(config: MonitorConfig, classifier: &'a C, sink: &'a S) -> Self {
        Self {
            config,
            classifier,
            sink,
        }
    }

    /// One iteration. Every failure is contained here; the outcome of one
    /// cycle never changes the behavior of the next.
    pub fn run_cycle(&self) -> CycleOutcome {
        let path = &self.config.image_path;

        if !path.exists() {
            info!("no image found at {}", path.display());
            return CycleOutcome::NoImage;
        }

        let frame = match image::open(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("failed to read image {}: {}", path.display(), e);
                return CycleOutcome::UnreadableImage;
            }
        };

        let verdict = match self.classifier.classify(&frame) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("classification failed: {:#}", e);
                return CycleOutcome::PredictionFailed;
            }
        };

        match self.sink.report(verdict) {
            Ok(status) => {
                info!("sent alert: {} -> {}", verdict.label(), status);
                CycleOutcome::Delivered { verdict, status }
            }
            Err(e) => {
                warn!("alert not delivered: {}", e);
                CycleOutcome::DeliveryFailed(verdict)
            }
        }
    }

    /// Blocking driver: cycle, sleep the fixed interval, repeat until the
    /// process is killed. The sleep happens after every cycle, including
    /// the ones that found no image.
    pub fn run(&self) {
        loop {
            self.run_cycle();
            thread::sleep(self.config.interval);
        }
    }
}
