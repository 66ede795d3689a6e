//! DistilBERT fine-tuned on SST-2, run on the CPU with candle.
//!
//! Weights, config and tokenizer are downloaded into `model_dir` on first use
//! and loaded once per process.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use reqwest::Client;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use nd_core::{truncate_chars, BinaryLabel, Error, Result, SentimentSignal, SignalReading};

use super::bayes::DEFAULT_WINDOW;

pub const MODEL_URL: &str =
    "https://huggingface.co/distilbert/distilbert-base-uncased-finetuned-sst-2-english/resolve/main";
/// The fine-tuned repo ships only `vocab.txt`; the base model has the same uncased vocabulary.
pub const TOKENIZER_URL: &str =
    "https://huggingface.co/distilbert/distilbert-base-uncased/resolve/main";
pub const DEFAULT_MODEL_DIR: &str = "models/distilbert-sst2";

const WEIGHTS_FILE: &str = "model.safetensors";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const MAX_TOKENS: usize = 512;

fn model_error(e: impl fmt::Display) -> Error {
    Error::Inference(format!("DistilBERT: {}", e))
}

/// The parts of `config.json` the classification head needs.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    dim: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

struct LoadedModel {
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: HashMap<String, String>,
    device: Device,
}

impl LoadedModel {
    fn load(dir: &Path) -> Result<Self> {
        let device = Device::Cpu;
        let raw_config = std::fs::read_to_string(dir.join(CONFIG_FILE))?;
        let config: DistilBertConfig = serde_json::from_str(&raw_config)?;
        let head: HeadConfig = serde_json::from_str(&raw_config)?;

        info!("🧠 Loading DistilBERT weights from {}", dir.display());
        let tensors = candle_core::safetensors::load_buffer(&std::fs::read(dir.join(WEIGHTS_FILE))?, &device)
            .map_err(model_error)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);

        let encoder = DistilBertModel::load(vb.pp("distilbert"), &config).map_err(model_error)?;
        let pre_classifier = linear(head.dim, head.dim, vb.pp("pre_classifier")).map_err(model_error)?;
        let classifier = linear(head.dim, 2, vb.pp("classifier")).map_err(model_error)?;
        let tokenizer = Tokenizer::from_file(dir.join(TOKENIZER_FILE)).map_err(model_error)?;

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            tokenizer,
            labels: head.id2label,
            device,
        })
    }

    fn classify(&self, text: &str) -> Result<BinaryLabel> {
        let encoding = self.tokenizer.encode(text, true).map_err(model_error)?;
        let ids = clamp_ids(encoding.get_ids(), MAX_TOKENS);
        let len = ids.len();

        let input_ids = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_error)?;
        // nothing is padded, so no position is masked
        let mask = Tensor::zeros((len, len), DType::U8, &self.device).map_err(model_error)?;

        let logits = self
            .encoder
            .forward(&input_ids, &mask)
            .and_then(|hidden| hidden.narrow(1, 0, 1)?.squeeze(1))
            .and_then(|cls| self.pre_classifier.forward(&cls)?.relu())
            .and_then(|h| self.classifier.forward(&h)?.squeeze(0))
            .and_then(|l| l.to_vec1::<f32>())
            .map_err(model_error)?;
        debug!("🎭 DistilBERT logits: {:?}", logits);

        let best = logits
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .ok_or_else(|| model_error("empty logits"))?;
        label_for(best, &self.labels)
    }
}

/// Keeps `[CLS] ... [SEP]` within the position limit.
fn clamp_ids(ids: &[u32], max: usize) -> Vec<u32> {
    if ids.len() <= max || max < 2 {
        return ids.to_vec();
    }
    let mut clamped = ids[..max - 1].to_vec();
    clamped.extend(ids.last().copied());
    clamped
}

/// SST-2 checkpoints use `0 = NEGATIVE`, `1 = POSITIVE` when `id2label` is absent.
fn label_for(index: usize, labels: &HashMap<String, String>) -> Result<BinaryLabel> {
    match labels.get(&index.to_string()) {
        Some(label) => BinaryLabel::parse(label).ok_or_else(|| model_error(format!("unknown label {}", label))),
        None => match index {
            0 => Ok(BinaryLabel::Negative),
            1 => Ok(BinaryLabel::Positive),
            other => Err(model_error(format!("no label for class {}", other))),
        },
    }
}

/// Local DistilBERT sentiment classifier.
pub struct DistilBertSentiment {
    client: Client,
    model_dir: PathBuf,
    model_url: String,
    tokenizer_url: String,
    window: usize,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl fmt::Debug for DistilBertSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistilBertSentiment")
            .field("model_dir", &self.model_dir)
            .field("window", &self.window)
            .field("loaded", &self.loaded.initialized())
            .finish()
    }
}

impl DistilBertSentiment {
    pub fn new(client: Client, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            model_dir: model_dir.into(),
            model_url: MODEL_URL.to_string(),
            tokenizer_url: TOKENIZER_URL.to_string(),
            window: DEFAULT_WINDOW,
            loaded: OnceCell::new(),
        }
    }

    pub fn with_sources(mut self, model_url: impl Into<String>, tokenizer_url: impl Into<String>) -> Self {
        self.model_url = model_url.into().trim_end_matches('/').to_string();
        self.tokenizer_url = tokenizer_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    async fn download(&self, url: &str, target: &Path) -> Result<()> {
        info!("📥 Downloading {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(model_error(format!("{} returned {}", url, status)));
        }
        let bytes = response.bytes().await?;
        // written aside first so an interrupted download is never loaded
        let partial = target.with_extension("part");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, target).await?;
        Ok(())
    }

    async fn ensure_files(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.model_dir).await?;
        let files = [
            (WEIGHTS_FILE, &self.model_url),
            (CONFIG_FILE, &self.model_url),
            (TOKENIZER_FILE, &self.tokenizer_url),
        ];
        for (file, base) in files {
            let target = self.model_dir.join(file);
            if !tokio::fs::try_exists(&target).await? {
                self.download(&format!("{}/{}", base, file), &target).await?;
            }
        }
        Ok(())
    }

    async fn model(&self) -> Result<Arc<LoadedModel>> {
        let model = self
            .loaded
            .get_or_try_init(|| async {
                self.ensure_files().await?;
                let dir = self.model_dir.clone();
                let model = tokio::task::spawn_blocking(move || LoadedModel::load(&dir))
                    .await
                    .map_err(model_error)??;
                info!("✨ DistilBERT sentiment model ready");
                Ok::<_, Error>(Arc::new(model))
            })
            .await?;
        Ok(model.clone())
    }
}

#[async_trait]
impl SentimentSignal for DistilBertSentiment {
    fn name(&self) -> &str {
        "distilbert"
    }

    async fn read(&self, text: &str) -> Result<SignalReading> {
        let model = self.model().await?;
        let text = truncate_chars(text, self.window).to_string();
        let label = tokio::task::spawn_blocking(move || model.classify(&text))
            .await
            .map_err(model_error)??;
        Ok(SignalReading::Label(label))
    }
}
