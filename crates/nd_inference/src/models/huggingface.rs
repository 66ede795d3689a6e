use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nd_core::{
    truncate_chars, BinaryLabel, Entity, EntityKind, EntityRecognizer, Error, Result,
    SentimentSignal, SignalReading,
};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
pub const NER_MODEL: &str = "dslim/bert-base-NER";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<NerParameters>,
}

#[derive(Serialize)]
struct NerParameters {
    aggregation_strategy: &'static str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct EntityGroup {
    entity_group: String,
    start: usize,
    end: usize,
}

struct InferenceClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl InferenceClient {
    async fn post(&self, request: &InferenceRequest<'_>) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, self.model))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::Inference(format!(
                "{} returned {}: {}",
                self.model, status, message
            )));
        }
        Ok(body)
    }
}

/// Binary sentiment classifier served by the Hugging Face inference API.
pub struct HuggingFaceClassifier {
    inner: InferenceClient,
    window: usize,
}

impl HuggingFaceClassifier {
    pub fn new(client: Client, api_key: Option<String>) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            Error::Inference("Hugging Face API key is required".to_string())
        })?;
        Ok(Self {
            inner: InferenceClient {
                client,
                api_key,
                base_url: DEFAULT_BASE_URL.to_string(),
                model: SENTIMENT_MODEL.to_string(),
            },
            window: crate::sentiment::bayes::DEFAULT_WINDOW,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner.base_url = base_url.into();
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl fmt::Debug for HuggingFaceClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceClassifier")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.inner.base_url)
            .field("model", &self.inner.model)
            .field("window", &self.window)
            .finish()
    }
}

/// Picks the highest-scoring label from `[[{label, score}, ...]]` or `[{label, score}, ...]`.
fn parse_classification(body: &Value) -> Result<BinaryLabel> {
    let candidates = match body.as_array().and_then(|outer| outer.first()) {
        Some(Value::Array(inner)) => inner.clone(),
        Some(_) => body.as_array().cloned().unwrap_or_default(),
        None => Vec::new(),
    };
    let best = candidates
        .into_iter()
        .filter_map(|v| serde_json::from_value::<LabelScore>(v).ok())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| Error::Inference(format!("Unexpected classification response: {}", body)))?;
    BinaryLabel::parse(&best.label)
        .ok_or_else(|| Error::Inference(format!("Unknown sentiment label: {}", best.label)))
}

#[async_trait]
impl SentimentSignal for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn read(&self, text: &str) -> Result<SignalReading> {
        let request = InferenceRequest {
            inputs: truncate_chars(text, self.window),
            parameters: None,
        };
        let body = self.inner.post(&request).await?;
        parse_classification(&body).map(SignalReading::Label)
    }
}

/// Token-classification NER served by the Hugging Face inference API.
pub struct HuggingFaceRecognizer {
    inner: InferenceClient,
}

impl HuggingFaceRecognizer {
    pub fn new(client: Client, api_key: Option<String>) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            Error::Inference("Hugging Face API key is required".to_string())
        })?;
        Ok(Self {
            inner: InferenceClient {
                client,
                api_key,
                base_url: DEFAULT_BASE_URL.to_string(),
                model: NER_MODEL.to_string(),
            },
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for HuggingFaceRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceRecognizer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.inner.base_url)
            .field("model", &self.inner.model)
            .finish()
    }
}

fn entity_kind(group: &str) -> EntityKind {
    match group.to_uppercase().as_str() {
        "PER" | "PERSON" => EntityKind::Person,
        "ORG" => EntityKind::Organization,
        "LOC" | "GPE" => EntityKind::GeopoliticalEntity,
        "PRODUCT" => EntityKind::Product,
        "EVENT" => EntityKind::Event,
        _ => EntityKind::Other,
    }
}

/// Slices `text` by character offsets, as returned by the API.
fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start >= end {
        return None;
    }
    let mut offsets = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));
    let from = offsets.nth(start)?;
    let to = offsets.nth(end - start - 1)?;
    text.get(from..to)
}

fn parse_entities(text: &str, body: &Value) -> Result<Vec<Entity>> {
    let groups: Vec<EntityGroup> = serde_json::from_value(body.clone())?;
    Ok(groups
        .into_iter()
        .filter_map(|g| {
            let span = char_slice(text, g.start, g.end)?.trim();
            (!span.is_empty()).then(|| Entity::new(span, entity_kind(&g.entity_group)))
        })
        .collect())
}

#[async_trait]
impl EntityRecognizer for HuggingFaceRecognizer {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        let request = InferenceRequest {
            inputs: text,
            parameters: Some(NerParameters {
                aggregation_strategy: "simple",
            }),
        };
        let body = self.inner.post(&request).await?;
        parse_entities(text, &body)
    }
}
