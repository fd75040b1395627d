//! Sentiment analysis pipeline.
//!
//! Classify text as `POSITIVE` or `NEGATIVE`, returning both the predicted
//! label and a confidence score. Empty or whitespace-only input is rejected
//! with [`SentimentError::InvalidInput`](crate::error::SentimentError).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use candle_sentiment::sentiment::{ModernBertSize, SentimentPipelineBuilder};
//!
//! # fn main() -> candle_sentiment::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//! let output = pipeline.analyze("I absolutely love this product!")?;
//! println!(
//!     "sentiment: {} (confidence: {:.2})",
//!     output.prediction.label, output.prediction.score
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! Analyze multiple texts in one forward pass (returns [`BatchOutput`] with a
//! per-item `Result`, so one bad input does not fail the whole batch):
//!
//! ```rust,no_run
//! # use candle_sentiment::sentiment::{ModernBertSize, SentimentPipelineBuilder};
//! # fn main() -> candle_sentiment::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//! let reviews = &[
//!     "Best purchase I've ever made!",
//!     "Terrible quality, very disappointed.",
//! ];
//!
//! let output = pipeline.analyze_batch(reviews)?;
//!
//! for r in output.results {
//!     let p = r.prediction?;
//!     println!("{}: {} ({:.2})", r.text, p.label, p.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Sizes | Builder Method |
//! |-------|-------|----------------|
//! | ModernBERT | `Base`, `Large` | [`SentimentPipelineBuilder::modernbert`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{ModernBertSize, SentimentModernBert};
pub use crate::pipelines::cache::ModelOptions;
pub use crate::pipelines::stats::PipelineStats;
pub use builder::SentimentPipelineBuilder;
pub use model::{RawPrediction, SentimentModel};
pub use pipeline::{BatchOutput, BatchResult, Output, Prediction, SentimentPipeline};
