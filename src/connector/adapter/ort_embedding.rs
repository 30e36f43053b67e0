use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::application::EmbeddingService;
use crate::domain::{DomainError, EmbeddingConfig};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-mpnet-base-v2";
const DEFAULT_DIMENSIONS: usize = 768;
const DEFAULT_MAX_SEQ_LENGTH: usize = 384;
const BATCH_SIZE: usize = 32;

/// Sentence embeddings computed locally with ONNX Runtime.
///
/// Token embeddings are mean-pooled over the attention mask and L2-normalised.
pub struct OrtEmbedding {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    config: EmbeddingConfig,
    uses_token_type_ids: bool,
}

impl OrtEmbedding {
    /// Downloads (or reuses the cached) model files from the Hugging Face hub.
    pub fn new(model_id: Option<&str>) -> Result<Self, DomainError> {
        let model_id = model_id.unwrap_or(DEFAULT_MODEL_ID);
        info!("Initializing ORT embedding service with model: {}", model_id);

        let api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| DomainError::embedding(format!("Failed to create HF API: {}", e)))?;

        let repo = api.model(model_id.to_string());

        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| DomainError::embedding(format!("Failed to download tokenizer: {}", e)))?;

        let model_path = repo
            .get("onnx/model.onnx")
            .or_else(|_| repo.get("model.onnx"))
            .map_err(|e| DomainError::embedding(format!("Failed to download ONNX model: {}", e)))?;

        Self::from_paths(model_path, tokenizer_path, model_id)
    }

    pub fn from_paths(
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        model_name: &str,
    ) -> Result<Self, DomainError> {
        info!("Loading ONNX model from: {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| DomainError::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DomainError::embedding(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load ONNX model: {}", e)))?;

        // MPNet exports take no segment ids; BERT-style ones do.
        let uses_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load tokenizer: {}", e)))?;

        let config = EmbeddingConfig::new(
            model_name.to_string(),
            DEFAULT_DIMENSIONS,
            DEFAULT_MAX_SEQ_LENGTH,
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            config,
            uses_token_type_ids,
        })
    }

    fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| DomainError::embedding(format!("Tokenization failed: {}", e)))?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.config.max_sequence_length());

        let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let type_ids = encoding.get_type_ids();

            let len = ids.len().min(max_len);

            input_ids.extend(ids[..len].iter().map(|&x| x as i64));
            attention_mask.extend(mask[..len].iter().map(|&x| x as i64));
            token_type_ids.extend(type_ids[..len].iter().map(|&x| x as i64));

            let padding = max_len - len;
            input_ids.extend(std::iter::repeat_n(0i64, padding));
            attention_mask.extend(std::iter::repeat_n(0i64, padding));
            token_type_ids.extend(std::iter::repeat_n(0i64, padding));
        }

        let shape = [batch_size, max_len];
        let input_ids_tensor = Tensor::from_array((shape, input_ids))
            .map_err(|e| DomainError::embedding(format!("Failed to create input_ids tensor: {}", e)))?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask)).map_err(|e| {
            DomainError::embedding(format!("Failed to create attention_mask tensor: {}", e))
        })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| DomainError::embedding(format!("Failed to lock session: {}", e)))?;

        let outputs = if self.uses_token_type_ids {
            let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids)).map_err(|e| {
                DomainError::embedding(format!("Failed to create token_type_ids tensor: {}", e))
            })?;
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
            ])
        }
        .map_err(|e| DomainError::embedding(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| DomainError::embedding("No output tensor found"))?;

        let (shape, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::embedding(format!("Failed to extract output tensor: {}", e)))?;

        let shape: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        debug!("Output tensor shape: {:?}", shape);

        let embeddings = match shape.as_slice() {
            [_, seq_len, hidden_size] => {
                let (seq_len, hidden_size) = (*seq_len, *hidden_size);
                (0..batch_size)
                    .map(|i| {
                        let mask = encodings[i].get_attention_mask();
                        let mut embedding = vec![0.0f32; hidden_size];
                        let mut count = 0.0f32;

                        for j in 0..seq_len.min(max_len) {
                            let mask_val = mask.get(j).copied().unwrap_or(0) as f32;
                            if mask_val > 0.0 {
                                let offset = i * seq_len * hidden_size + j * hidden_size;
                                for (k, value) in embedding.iter_mut().enumerate() {
                                    *value += data[offset + k] * mask_val;
                                }
                                count += mask_val;
                            }
                        }

                        if count > 0.0 {
                            for v in &mut embedding {
                                *v /= count;
                            }
                        }

                        normalize(embedding)
                    })
                    .collect()
            }
            [_, hidden_size] => {
                let hidden_size = *hidden_size;
                (0..batch_size)
                    .map(|i| normalize(data[i * hidden_size..(i + 1) * hidden_size].to_vec()))
                    .collect()
            }
            _ => {
                return Err(DomainError::embedding(format!(
                    "Unexpected output tensor shape: {:?}",
                    shape
                )))
            }
        };

        Ok(embeddings)
    }
}

fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut embedding {
            *v /= norm;
        }
    }
    embedding
}

#[async_trait]
impl EmbeddingService for OrtEmbedding {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut all_vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let text_refs: Vec<&str> = batch.iter().map(|s| s.as_str()).collect();
            all_vectors.extend(self.embed_texts(&text_refs)?);
        }

        debug!("Generated {} embeddings", all_vectors.len());
        Ok(all_vectors)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let vectors = self.embed_texts(&[query])?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("Failed to generate query embedding"))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
