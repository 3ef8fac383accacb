pub mod preprocess;

use std::path::Path;

use anyhow::{anyhow, bail};
use image::DynamicImage;
use rten::Model;
use rten_tensor::{AsView, NdTensor};

/// Confidence above which a frame counts as fire. Exactly at the threshold
/// classifies as normal.
const FIRE_THRESHOLD: f32 = 0.5;

/// Outcome of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Fire,
    Normal,
}

impl Prediction {
    /// Threshold the model's scalar confidence.
    pub fn from_score(score: f32) -> Self {
        if score > FIRE_THRESHOLD {
            Prediction::Fire
        } else {
            Prediction::Normal
        }
    }

    /// Wire name used in alert payloads.
    pub fn label(self) -> &'static str {
        match self {
            Prediction::Fire => "fire",
            Prediction::Normal => "normal",
        }
    }
}

/// Anything that can turn a frame into a prediction. The polling loop only
/// talks to this, so tests can drive it without a model artifact.
pub trait Classifier {
    fn classify(&self, frame: &DynamicImage) -> anyhow::Result<Prediction>;
}

/// Binary fire classifier backed by a serialized model artifact.
pub struct FireDetector {
    model: Model,
}

impl FireDetector {
    /// Load the model artifact. Called once at startup; a missing or
    /// malformed artifact is fatal and never retried.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("model artifact not found at {}", path.display());
        }

        let model = Model::load_file(path)
            .map_err(|e| anyhow!("failed to load model {}: {}", path.display(), e))?;

        if model.input_ids().len() != 1 || model.output_ids().len() != 1 {
            bail!(
                "expected a single-input, single-output classifier, got {} inputs and {} outputs",
                model.input_ids().len(),
                model.output_ids().len()
            );
        }

        Ok(Self { model })
    }

    /// One forward pass: preprocess, execute, read the scalar confidence
    /// from the [1, 1] output.
    fn score(&self, frame: &DynamicImage) -> anyhow::Result<f32> {
        let input = preprocess::to_model_input(frame);

        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow!("inference failed: {}", e))?;

        let scores: NdTensor<f32, 2> = output
            .try_into()
            .map_err(|e| anyhow!("unexpected model output: {}", e))?;

        Ok(scores[[0, 0]])
    }
}

impl Classifier for FireDetector {
    fn classify(&self, frame: &DynamicImage) -> anyhow::Result<Prediction> {
        Ok(Prediction::from_score(self.score(frame)?))
    }
}
