use std::collections::HashMap;
use std::time::Instant;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::ops::softmax;
use candle_nn::VarBuilder;
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config, ModernBertForSequenceClassification,
};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::{Result, SentimentError};
use crate::pipelines::cache::ModelOptions;
use crate::pipelines::sentiment::model::{RawPrediction, SentimentModel};

/// Available ModernBERT model sizes.
#[derive(Debug, Clone, Copy)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    fn repo_id(self) -> &'static str {
        match self {
            ModernBertSize::Base => "clapAI/modernBERT-base-multilingual-sentiment",
            ModernBertSize::Large => "clapAI/modernBERT-large-multilingual-sentiment",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

impl ModelOptions for ModernBertSize {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

/// ModernBERT with a sequence-classification head, plus its tokenizer.
///
/// The checkpoint, tokenization, and forward pass are all external; this type
/// only wires them together and maps predicted class IDs back to labels.
pub struct SentimentModernBert {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    id2label: HashMap<String, String>,
}

impl SentimentModernBert {
    fn label_for(&self, pred_id: u32) -> Result<String> {
        self.id2label
            .get(&pred_id.to_string())
            .cloned()
            .ok_or_else(|| {
                let mut available: Vec<&str> =
                    self.id2label.values().map(String::as_str).collect();
                available.sort_unstable();
                SentimentError::Unexpected(format!(
                    "Predicted label ID {pred_id} not in id2label. Available: {}",
                    available.join(", ")
                ))
            })
    }

    fn pad_token_id(&self) -> u32 {
        self.tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| self.tokenizer.token_to_id("<pad>"))
            .or_else(|| self.tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0)
    }
}

impl SentimentModel for SentimentModernBert {
    type Options = ModernBertSize;

    fn load(options: ModernBertSize, device: Device) -> Result<Self> {
        let repo_id = options.repo_id();
        let started = Instant::now();

        let api = Api::new()?;
        let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")?;
        let weights_path = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))?;
        let tokenizer_path = repo.get("tokenizer.json")?;

        let config_str = std::fs::read_to_string(&config_path)?;
        let mut config: Config = serde_json::from_str(&config_str)?;
        let labels: LabelMapping = serde_json::from_str(&config_str)?;
        ensure_classifier_config(&mut config, labels.num_labels());

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, &device)?
        };
        let model = ModernBertForSequenceClassification::load(vb, &config)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            SentimentError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        info!(
            model = repo_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded sentiment model"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            id2label: labels.id2label,
        })
    }

    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Result<RawPrediction>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let pad_token_id = self.pad_token_id();

        let mut item_errors: Vec<Option<SentimentError>> =
            (0..texts.len()).map(|_| None).collect();
        let mut encodings = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            match self.tokenizer.encode(*text, true) {
                Ok(encoding) => encodings.push(Some(encoding)),
                Err(e) => {
                    let preview: String = text.chars().take(50).collect();
                    item_errors[i] = Some(SentimentError::Tokenization(format!(
                        "Tokenization failed on '{preview}': {e}"
                    )));
                    encodings.push(None);
                }
            }
        }

        let valid_indices: Vec<usize> = encodings
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| i))
            .collect();

        if valid_indices.is_empty() {
            return Ok(item_errors
                .into_iter()
                .map(|e| {
                    Err(e.unwrap_or_else(|| {
                        SentimentError::Unexpected("Model returned no predictions".to_string())
                    }))
                })
                .collect());
        }

        let max_len = valid_indices
            .iter()
            .filter_map(|&i| encodings[i].as_ref())
            .map(|e| e.len())
            .max()
            .unwrap_or(0);

        let mut all_token_ids: Vec<u32> = Vec::new();
        let mut all_attention_masks: Vec<u32> = Vec::new();

        for &i in &valid_indices {
            let encoding = encodings[i].as_ref().unwrap();
            let mut token_ids = encoding.get_ids().to_vec();
            let mut attention_mask = encoding.get_attention_mask().to_vec();
            token_ids.resize(max_len, pad_token_id);
            attention_mask.resize(max_len, 0);
            all_token_ids.extend(token_ids);
            all_attention_masks.extend(attention_mask);
        }

        let batch_size = valid_indices.len();
        let input_ids = Tensor::from_vec(all_token_ids, (batch_size, max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(all_attention_masks, (batch_size, max_len), &self.device)?;

        let started = Instant::now();
        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probs = softmax(&logits, D::Minus1)?;
        let pred_ids = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
        let probs_2d = probs.to_vec2::<f32>()?;
        debug!(
            batch = batch_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classified batch"
        );

        let mut results: Vec<Result<RawPrediction>> = item_errors
            .into_iter()
            .map(|e| match e {
                Some(err) => Err(err),
                None => Ok(RawPrediction {
                    label: String::new(),
                    score: 0.0,
                }),
            })
            .collect();

        for (batch_idx, &orig_idx) in valid_indices.iter().enumerate() {
            let pred_id = pred_ids[batch_idx];
            let score = probs_2d[batch_idx]
                .get(pred_id as usize)
                .copied()
                .unwrap_or(0.0);
            results[orig_idx] = self
                .label_for(pred_id)
                .map(|label| RawPrediction { label, score });
        }

        Ok(results)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

#[derive(Deserialize)]
struct LabelMapping {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

impl LabelMapping {
    fn num_labels(&self) -> usize {
        self.id2label.len().max(self.label2id.len())
    }
}

// Checkpoints without classifier metadata in config.json still need a
// populated ClassifierConfig for the candle loader to size the head.
fn ensure_classifier_config(config: &mut Config, num_labels: usize) {
    if config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0)
        != num_labels
    {
        let id2label: HashMap<String, String> = (0..num_labels)
            .map(|i| (i.to_string(), format!("label_{i}")))
            .collect();
        let label2id: HashMap<String, String> = id2label
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();

        config.classifier_config = Some(ClassifierConfig {
            id2label,
            label2id,
            classifier_pooling: ClassifierPooling::default(),
        });
    }
}
