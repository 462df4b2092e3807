//! Inference engine seam
//!
//! The HTTP layer only ever sees `dyn InferenceEngine`; the burn-backed
//! engine is constructed once at startup and tests plug in stubs.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::{backend::Backend, Tensor, TensorData};
use tracing::{debug, info};

use crate::inference::preprocess::{ImageTensor, CHANNELS};
use crate::model::{WasteClassifier, WasteClassifierConfig};
use crate::utils::error::{ClassifierError, Result};
use crate::IMAGE_SIZE;

/// A loaded model that maps a normalized image to class probabilities
pub trait InferenceEngine: Send + Sync {
    /// Run one forward pass and return one probability per class
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;

    /// Human-readable name of the compute backend
    fn backend_name(&self) -> &str {
        "unknown"
    }
}

/// Inference engine backed by a burn `WasteClassifier`
pub struct BurnEngine<B: Backend> {
    model: Mutex<WasteClassifier<B>>,
    device: B::Device,
    num_classes: usize,
    input_size: usize,
    backend_name: String,
}

impl<B: Backend> BurnEngine<B> {
    /// Load weights from a burn record file and verify the output width
    ///
    /// The config must describe a network fed by the normalizer, so its
    /// `input_size` has to equal [`IMAGE_SIZE`]. A missing or incompatible
    /// artifact is reported as [`ClassifierError::ModelLoad`]; callers treat
    /// it as fatal.
    pub fn load(
        model_path: &Path,
        config: &WasteClassifierConfig,
        device: B::Device,
        backend_name: &str,
    ) -> Result<Self> {
        let start = Instant::now();
        config.validate()?;
        if config.input_size != IMAGE_SIZE {
            return Err(ClassifierError::Config(format!(
                "model input size {} does not match normalized image size {}",
                config.input_size, IMAGE_SIZE
            )));
        }

        let recorder = CompactRecorder::new();

        // The recorder appends its own extension, so check for the stem too
        let with_ext = model_path.with_extension("mpk");
        if !model_path.exists() && !with_ext.exists() {
            return Err(ClassifierError::ModelLoad(
                model_path.to_path_buf(),
                "file not found".to_string(),
            ));
        }

        let model = config
            .init::<B>(&device)
            .load_file(model_path, &recorder, &device)
            .map_err(|e| ClassifierError::ModelLoad(model_path.to_path_buf(), format!("{:?}", e)))?;

        let engine = Self::from_model(model, device, backend_name);

        // Warm-up pass doubles as a compatibility check
        let probs = engine
            .predict(&ImageTensor::zeros())
            .map_err(|e| ClassifierError::ModelLoad(model_path.to_path_buf(), e.to_string()))?;
        if probs.len() != config.num_classes {
            return Err(ClassifierError::ModelLoad(
                model_path.to_path_buf(),
                format!(
                    "model produced {} outputs, expected {}",
                    probs.len(),
                    config.num_classes
                ),
            ));
        }

        info!(
            "Loaded model from {:?} ({} classes) in {:.1} ms",
            model_path,
            engine.num_classes,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(engine)
    }

    /// Wrap an in-memory model (used when the weights come from elsewhere)
    pub fn from_model(model: WasteClassifier<B>, device: B::Device, backend_name: &str) -> Self {
        Self {
            num_classes: model.num_classes(),
            input_size: model.input_size(),
            model: Mutex::new(model),
            device,
            backend_name: backend_name.to_string(),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }
}

impl<B: Backend> InferenceEngine for BurnEngine<B> {
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        let [batch, height, width, channels] = tensor.shape();
        if batch != 1
            || height != self.input_size
            || width != self.input_size
            || channels != CHANNELS
        {
            return Err(ClassifierError::Inference(format!(
                "model expects one {0}x{0}x{1} image, got shape {2:?}",
                self.input_size,
                CHANNELS,
                tensor.shape()
            )));
        }

        let input = Tensor::<B, 4>::from_floats(
            TensorData::new(tensor.to_nchw(), [batch, channels, height, width]),
            &self.device,
        );

        let model = self
            .model
            .lock()
            .map_err(|_| ClassifierError::Inference("model lock poisoned".to_string()))?;

        let start = Instant::now();
        let output = model.probabilities(input);
        drop(model);

        let probs: Vec<f32> = output
            .into_data()
            .to_vec()
            .map_err(|e| ClassifierError::Inference(format!("{:?}", e)))?;

        debug!(
            "Forward pass took {:.2} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        single_row(probs, self.num_classes)
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

/// The output of a one-image batch must be exactly one row of class scores
fn single_row(probs: Vec<f32>, num_classes: usize) -> Result<Vec<f32>> {
    if probs.len() != num_classes {
        return Err(ClassifierError::Inference(format!(
            "model returned {} values, expected {}",
            probs.len(),
            num_classes
        )));
    }
    Ok(probs)
}
