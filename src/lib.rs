//! Sentiment analysis for Rust, powered by [Candle](https://github.com/huggingface/candle).
//!
//! Wraps a pretrained ModernBERT sentiment classifier behind a small pipeline
//! interface with an API inspired by Python's [Transformers](https://huggingface.co/docs/transformers).
//! Classification, tokenization, and inference are delegated to the pretrained
//! model; this crate adds input validation, output shaping, and the plumbing
//! around them.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;

pub use pipelines::sentiment;
