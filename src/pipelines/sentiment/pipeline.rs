use std::sync::Arc;

use tracing::debug;

use super::model::{RawPrediction, SentimentModel};
use crate::error::{Result, SentimentError};
use crate::pipelines::stats::PipelineStats;

// ============ Output types ============

/// A sentiment prediction with label and confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted sentiment, upper-cased (e.g. "POSITIVE", "NEGATIVE").
    pub label: String,
    /// Confidence score for the predicted label (0.0 to 1.0).
    pub score: f32,
}

/// Single-text output from [`SentimentPipeline::analyze`].
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Single result in batch output.
#[derive(Debug)]
pub struct BatchResult {
    /// Input text.
    pub text: String,
    /// Prediction or error for this input.
    pub prediction: Result<Prediction>,
}

/// Batch output from [`SentimentPipeline::analyze_batch`].
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each input, in input order.
    pub results: Vec<BatchResult>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Pipeline ============

/// Classifies text sentiment by delegating to a pretrained model.
///
/// Construct with [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
/// The pipeline's own work is a validation guard in front of the model and
/// output shaping behind it.
pub struct SentimentPipeline<M: SentimentModel> {
    pub(crate) model: Arc<M>,
}

impl<M: SentimentModel> SentimentPipeline<M> {
    /// Analyze the sentiment of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] if `text` is empty or
    /// whitespace-only. Model-side failures surface as their own variants.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use candle_sentiment::sentiment::{ModernBertSize, SentimentPipelineBuilder};
    /// # fn main() -> candle_sentiment::error::Result<()> {
    /// # let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
    /// let output = pipeline.analyze("I love this!")?;
    /// println!("{} ({:.2})", output.prediction.label, output.prediction.score);
    /// # Ok(())
    /// # }
    /// ```
    pub fn analyze(&self, text: &str) -> Result<Output> {
        validate(text)?;

        let stats_builder = PipelineStats::start();
        let mut predictions = self.model.classify_batch(&[text])?;
        let raw = predictions
            .pop()
            .ok_or_else(|| SentimentError::Unexpected("Model returned no predictions".into()))??;
        let prediction = shape(raw);
        let stats = stats_builder.finish(1);

        debug!(
            label = %prediction.label,
            score = prediction.score as f64,
            elapsed_ms = stats.total_time.as_millis() as u64,
            "analyzed '{}'",
            preview(text)
        );

        Ok(Output { prediction, stats })
    }

    /// Analyze a batch of texts in one forward pass.
    ///
    /// Validation is applied per item: a blank entry yields an
    /// [`SentimentError::InvalidInput`] in its slot without reaching the
    /// model, and the remaining entries are still classified.
    pub fn analyze_batch(&self, texts: &[&str]) -> Result<BatchOutput> {
        let stats_builder = PipelineStats::start();

        let mut slots: Vec<Option<Result<Prediction>>> = texts
            .iter()
            .map(|text| validate(text).err().map(Err))
            .collect();

        let valid_indices: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect();

        if !valid_indices.is_empty() {
            let valid_texts: Vec<&str> = valid_indices.iter().map(|&i| texts[i]).collect();
            let raw = self.model.classify_batch(&valid_texts)?;
            for (&i, result) in valid_indices.iter().zip(raw) {
                slots[i] = Some(result.map(shape));
            }
        }

        let results = texts
            .iter()
            .zip(slots)
            .map(|(text, slot)| BatchResult {
                text: text.to_string(),
                prediction: slot.unwrap_or_else(|| {
                    Err(SentimentError::Unexpected(
                        "Model returned no predictions".into(),
                    ))
                }),
            })
            .collect();

        Ok(BatchOutput {
            results,
            stats: stats_builder.finish(texts.len()),
        })
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

fn validate(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(SentimentError::InvalidInput(
            "Input text must be a non-empty string".into(),
        ));
    }
    Ok(())
}

fn shape(raw: RawPrediction) -> Prediction {
    Prediction {
        label: raw.label.to_uppercase(),
        score: raw.score.clamp(0.0, 1.0),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > 50 {
        let head: String = text.chars().take(50).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
