#![cfg(feature = "integration")]

//! Validation tier: model-health and drift checks against the real model.
//! Run with `cargo test --features integration --test model_health`.
//!
//! These are plain arithmetic assertions over a fixed labeled sample, not an
//! evaluation framework: an accuracy floor, score calibration, label
//! distribution drift between two balanced halves, and determinism.

use candle_sentiment::error::Result;
use candle_sentiment::sentiment::{
    ModernBertSize, SentimentModernBert, SentimentPipeline, SentimentPipelineBuilder,
};

/// Balanced labeled sample. The first half doubles as the reference slice for
/// the drift check, the second half as the current slice; both stay balanced.
const LABELED_SAMPLES: &[(&str, &str)] = &[
    ("I love this product, it works great!", "POSITIVE"),
    ("Absolutely fantastic! Best purchase ever!", "POSITIVE"),
    ("Exceeded all my expectations!", "POSITIVE"),
    ("Great service, highly recommend!", "POSITIVE"),
    ("This is terrible, I would not recommend.", "NEGATIVE"),
    ("Worst experience, complete waste of money.", "NEGATIVE"),
    ("I hate this product! It's awful!", "NEGATIVE"),
    ("The staff was rude and unhelpful.", "NEGATIVE"),
    ("Couldn't be happier with my purchase!", "POSITIVE"),
    ("10/10 would recommend to anyone!", "POSITIVE"),
    ("What a wonderful surprise, I love it!", "POSITIVE"),
    ("Fantastic movie, thoroughly enjoyed it!", "POSITIVE"),
    ("Complete garbage, do not buy this.", "NEGATIVE"),
    ("Terrible quality, very disappointed.", "NEGATIVE"),
    ("Would not recommend to my worst enemy.", "NEGATIVE"),
    ("Awful support, they never answered.", "NEGATIVE"),
];

const ACCURACY_FLOOR: f64 = 0.8;
const DRIFT_TOLERANCE: f64 = 0.25;

fn pipeline() -> Result<SentimentPipeline<SentimentModernBert>> {
    SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()
}

fn predict_labels(
    pipeline: &SentimentPipeline<SentimentModernBert>,
    samples: &[(&str, &str)],
) -> Result<Vec<String>> {
    let texts: Vec<&str> = samples.iter().map(|(text, _)| *text).collect();
    pipeline
        .analyze_batch(&texts)?
        .results
        .into_iter()
        .map(|r| r.prediction.map(|p| p.label))
        .collect()
}

fn positive_fraction(labels: &[String]) -> f64 {
    let positives = labels.iter().filter(|label| *label == "POSITIVE").count();
    positives as f64 / labels.len() as f64
}

#[test]
fn accuracy_stays_above_floor() -> Result<()> {
    let pipeline = pipeline()?;
    let predicted = predict_labels(&pipeline, LABELED_SAMPLES)?;

    let correct = predicted
        .iter()
        .zip(LABELED_SAMPLES)
        .filter(|(label, (_, expected))| label.as_str() == *expected)
        .count();
    let accuracy = correct as f64 / LABELED_SAMPLES.len() as f64;

    assert!(
        accuracy >= ACCURACY_FLOOR,
        "accuracy {accuracy:.2} fell below floor {ACCURACY_FLOOR}"
    );
    Ok(())
}

#[test]
fn winning_scores_are_calibrated() -> Result<()> {
    let pipeline = pipeline()?;

    for (text, _) in LABELED_SAMPLES {
        let output = pipeline.analyze(text)?;
        assert!(
            output.prediction.score > 0.5 && output.prediction.score <= 1.0,
            "uncalibrated score {} for {text:?}",
            output.prediction.score
        );
    }
    Ok(())
}

#[test]
fn label_distribution_does_not_drift_between_halves() -> Result<()> {
    let pipeline = pipeline()?;

    let mid = LABELED_SAMPLES.len() / 2;
    let reference = predict_labels(&pipeline, &LABELED_SAMPLES[..mid])?;
    let current = predict_labels(&pipeline, &LABELED_SAMPLES[mid..])?;

    // Both halves are balanced by construction, so the positive-rate gap is
    // a direct drift signal.
    let drift = (positive_fraction(&reference) - positive_fraction(&current)).abs();
    assert!(
        drift <= DRIFT_TOLERANCE,
        "label distribution drifted by {drift:.2} between sample halves"
    );
    Ok(())
}

#[test]
fn predictions_are_deterministic() -> Result<()> {
    let pipeline = pipeline()?;
    let text = "I love this product, it works great!";

    let first = pipeline.analyze(text)?.prediction;
    for _ in 0..2 {
        let repeat = pipeline.analyze(text)?.prediction;
        assert_eq!(first.label, repeat.label);
        assert!(
            (first.score - repeat.score).abs() < 1e-6,
            "scores diverged across identical calls: {} vs {}",
            first.score,
            repeat.score
        );
    }
    Ok(())
}
