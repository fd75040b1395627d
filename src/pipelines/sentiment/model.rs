use candle_core::Device;

use crate::error::Result;

/// Raw label/score pair as produced by the underlying classifier, before any
/// output shaping.
#[derive(Debug, Clone)]
pub struct RawPrediction {
    /// Label exactly as the model's `id2label` mapping spells it.
    pub label: String,
    /// Probability of the predicted label (0.0 to 1.0).
    pub score: f32,
}

/// Interface the pipeline expects from a sentiment classifier.
///
/// The pretrained [`SentimentModernBert`](crate::sentiment::SentimentModernBert)
/// implements this; unit tests substitute a scripted mock.
pub trait SentimentModel {
    /// Options selecting which checkpoint to load.
    type Options: std::fmt::Debug + Clone;

    /// Load the model and its tokenizer onto `device`.
    fn load(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Classify a batch of texts, one `Result` per input.
    ///
    /// Implementations must return exactly one entry per input, in order.
    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Result<RawPrediction>>>;

    /// Device the model runs on.
    fn device(&self) -> &Device;
}
