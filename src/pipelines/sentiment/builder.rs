use super::model::SentimentModel;
use super::pipeline::SentimentPipeline;
use crate::error::Result;
use crate::models::ModernBertSize;
use crate::pipelines::cache::{global_cache, ModelOptions};
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for creating [`SentimentPipeline`] instances.
///
/// Use [`Self::modernbert`] as the entry point. Loaded weights are shared
/// through a process-wide cache, so building the same model twice is cheap.
///
/// # Examples
///
/// ```rust,no_run
/// # use candle_sentiment::sentiment::{ModernBertSize, SentimentPipelineBuilder};
/// # fn main() -> candle_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base)
///     .cpu()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipelineBuilder<M: SentimentModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentModel> SentimentPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<SentimentPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);

        let model = global_cache()
            .get_or_create(&key, || M::load(self.options.clone(), device.clone()))?;

        Ok(SentimentPipeline { model })
    }
}

impl SentimentPipelineBuilder<crate::models::SentimentModernBert> {
    /// Creates a builder for a pretrained ModernBERT sentiment classifier.
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self::new(size)
    }
}
