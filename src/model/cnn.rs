//! Waste classifier network
//!
//! Inference-side definition of the CNN whose weights are trained offline and
//! shipped as a burn record. The layout built here must match the record
//! exactly: `stages` pooled convolution stages whose width doubles each time,
//! global average pooling, then a two-layer classification head.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    tensor::{activation, backend::Backend, Tensor},
};

use crate::utils::error::{ClassifierError, Result as ClassifierResult};

/// Shape of the network stored in a model record
#[derive(Config, Debug)]
pub struct WasteClassifierConfig {
    /// Width of the output layer, one unit per catalog class
    #[config(default = "9")]
    pub num_classes: usize,

    /// Side length of the square images the record was trained on
    #[config(default = "224")]
    pub input_size: usize,

    #[config(default = "3")]
    pub in_channels: usize,

    /// Filters in the first stage; every later stage doubles them
    #[config(default = "32")]
    pub base_filters: usize,

    /// Number of conv + pool stages, each halving the spatial size
    #[config(default = "4")]
    pub stages: usize,

    #[config(default = "256")]
    pub hidden_size: usize,
}

impl WasteClassifierConfig {
    /// Reject layouts that cannot produce a valid network
    pub fn validate(&self) -> ClassifierResult<()> {
        if self.num_classes == 0 {
            return Err(ClassifierError::Config(
                "model needs at least one output class".to_string(),
            ));
        }
        if self.in_channels == 0 || self.base_filters == 0 || self.hidden_size == 0 {
            return Err(ClassifierError::Config(
                "channel, filter and hidden sizes must be non-zero".to_string(),
            ));
        }
        if self.stages == 0 {
            return Err(ClassifierError::Config(
                "model needs at least one convolution stage".to_string(),
            ));
        }

        // Each stage halves the feature map, so the input must survive all of them
        let smallest = 1usize.checked_shl(self.stages as u32).unwrap_or(usize::MAX);
        if self.input_size < smallest {
            return Err(ClassifierError::Config(format!(
                "input size {} is too small for {} pooling stages",
                self.input_size, self.stages
            )));
        }
        Ok(())
    }

    /// Channels coming out of the last stage
    pub fn feature_channels(&self) -> usize {
        self.base_filters << self.stages.saturating_sub(1)
    }

    /// Build a freshly initialized network; weights come from a record afterwards
    pub fn init<B: Backend>(&self, device: &B::Device) -> WasteClassifier<B> {
        let mut stages = Vec::with_capacity(self.stages);
        let mut channels = self.in_channels;
        for i in 0..self.stages {
            let filters = self.base_filters << i;
            stages.push(Stage::new(channels, filters, device));
            channels = filters;
        }

        WasteClassifier {
            stages,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            hidden: LinearConfig::new(self.feature_channels(), self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            num_classes: self.num_classes,
            input_size: self.input_size,
        }
    }
}

/// 3x3 same-padded convolution, batch norm, ReLU, 2x2 max pool
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
    pool: MaxPool2d,
}

impl<B: Backend> Stage<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.norm.forward(self.conv.forward(x));
        self.pool.forward(activation::relu(x))
    }
}

/// Pretrained waste image classifier
///
/// Takes NCHW batches of `[0, 1]` RGB images at `input_size` and returns one
/// row per image.
#[derive(Module, Debug)]
pub struct WasteClassifier<B: Backend> {
    stages: Vec<Stage<B>>,
    pool: AdaptiveAvgPool2d,
    hidden: Linear<B>,
    output: Linear<B>,
    num_classes: usize,
    input_size: usize,
}

impl<B: Backend> WasteClassifier<B> {
    /// Raw class scores, shape `[batch, num_classes]`
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self
            .stages
            .iter()
            .fold(images, |x, stage| stage.forward(x));

        let [batch, channels, _, _] = features.dims();
        let pooled = self.pool.forward(features).reshape([batch, channels]);

        let hidden = activation::relu(self.hidden.forward(pooled));
        self.output.forward(hidden)
    }

    /// Class probabilities; each row sums to 1
    pub fn probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        activation::softmax(self.forward(images), 1)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }
}
