//! Multinomial Naive Bayes sentiment classifier.
//!
//! Trained once, on first use, from a small embedded corpus of labelled news
//! sentences. Only the first `window` characters of a text are classified.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use nd_core::{truncate_chars, BinaryLabel, Result, SentimentSignal, SignalReading};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_WINDOW: usize = 512;

const POSITIVE_CORPUS: &[&str] = &[
    "Profits soared after a record quarter and investors cheered the results",
    "The company reported strong growth and raised its full year outlook",
    "Shares rallied as sales beat expectations and margins improved",
    "The launch was a huge success with customers praising the new product",
    "Analysts upgraded the stock citing robust demand and healthy cash flow",
    "The firm won a major contract that will boost revenue for years",
    "Regulators approved the merger, clearing the way for expansion",
    "Employees welcomed the pay rise and improved benefits",
    "The new factory will create thousands of jobs in the region",
    "Revenue climbed to an all time high thanks to booming exports",
    "The breakthrough battery promises faster charging and longer range",
    "Investors are optimistic about the recovery and the strong order book",
    "The startup secured new funding to expand into international markets",
    "Deliveries rose sharply and the company exceeded its targets",
    "Customers love the upgrade and satisfaction scores are excellent",
    "The partnership is a great opportunity for both companies",
    "Earnings were impressive and the dividend was increased",
    "The chief executive celebrated a remarkable year of progress",
    "Demand remains resilient and the outlook is positive",
    "The company settled the dispute and shares gained on the news",
    "Sales of the popular model hit a new record",
    "The innovative design won praise from critics and buyers",
    "Production recovered quickly and output is now stable",
    "The firm is thriving with profits up and debt down",
    "Confidence returned to the market as the rebound gathered pace",
    "The deal was a win for shareholders and employees alike",
    "The award recognises outstanding leadership and innovation",
    "Government support helped the sector grow faster than expected",
    "The upgrade improves safety and efficiency for drivers",
    "Strong results lifted the shares to their best day this year",
];

const NEGATIVE_CORPUS: &[&str] = &[
    "Shares plunged after the company missed earnings forecasts",
    "The firm faces a lawsuit over the fatal crash of its vehicle",
    "Regulators opened an investigation into alleged fraud at the company",
    "Sales slumped and the company warned of further losses",
    "Thousands of workers lost their jobs in a new round of layoffs",
    "The recall affects millions of cars with a dangerous defect",
    "Investors fear the debt crisis could push the firm into bankruptcy",
    "The chief executive was criticised for the failed product launch",
    "Profits fell sharply amid weak demand and rising costs",
    "The scandal damaged trust and the shares tumbled",
    "Production was halted after a fire destroyed the plant",
    "The company was fined for breaching safety rules",
    "Analysts downgraded the stock citing slowing growth and uncertainty",
    "Customers complained about poor service and long delays",
    "The merger collapsed after regulators blocked the deal",
    "A data breach exposed the personal details of users",
    "The firm reported a disappointing quarter with revenue down",
    "Strikes and protests disrupted operations across the country",
    "The outlook is bleak as the recession hits demand",
    "Critics accused the company of misleading investors",
    "The share price crashed to its lowest level in years",
    "Losses widened and the company cut its forecast again",
    "Supply shortages forced the factory to stop production",
    "The board is under pressure after a string of failures",
    "Sanctions and tariffs threaten the company's exports",
    "The product was banned after reports of injuries",
    "Inflation and volatility hurt the firm's margins",
    "The investigation found serious violations of the law",
    "Shareholders are worried about mounting problems and debt",
    "The company struggled as competition and costs increased",
];

/// Naive Bayes model over lowercase alphabetic word counts.
pub struct NaiveBayesClassifier {
    log_prior: [f64; 2],
    log_likelihood: [HashMap<String, f64>; 2],
    window: usize,
}

impl NaiveBayesClassifier {
    /// Trains on the embedded corpus.
    pub fn pretrained() -> Self {
        let mut examples: Vec<(&str, BinaryLabel)> = Vec::new();
        examples.extend(POSITIVE_CORPUS.iter().map(|s| (*s, BinaryLabel::Positive)));
        examples.extend(NEGATIVE_CORPUS.iter().map(|s| (*s, BinaryLabel::Negative)));
        Self::train(&examples)
    }

    /// Fits the model with add-one smoothing.
    pub fn train(examples: &[(&str, BinaryLabel)]) -> Self {
        let mut doc_counts = [0usize; 2];
        let mut word_counts: [HashMap<String, usize>; 2] = [HashMap::new(), HashMap::new()];
        let mut vocabulary: HashSet<String> = HashSet::new();

        for (text, label) in examples {
            let class = class_index(*label);
            doc_counts[class] += 1;
            for token in tokenize(text) {
                *word_counts[class].entry(token.clone()).or_insert(0) += 1;
                vocabulary.insert(token);
            }
        }

        let total_docs = (doc_counts[0] + doc_counts[1]).max(1) as f64;
        let vocab_size = vocabulary.len() as f64;
        let mut log_prior = [0.0; 2];
        let mut log_likelihood: [HashMap<String, f64>; 2] = [HashMap::new(), HashMap::new()];

        for class in 0..2 {
            log_prior[class] = ((doc_counts[class] as f64 + 1.0) / (total_docs + 2.0)).ln();
            let class_total: usize = word_counts[class].values().sum();
            let denominator = class_total as f64 + vocab_size;
            for word in &vocabulary {
                let count = word_counts[class].get(word).copied().unwrap_or(0) as f64;
                log_likelihood[class].insert(word.clone(), ((count + 1.0) / denominator).ln());
            }
        }

        debug!(vocabulary = vocabulary.len(), documents = total_docs, "Trained naive bayes sentiment model");
        Self {
            log_prior,
            log_likelihood,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn vocabulary_size(&self) -> usize {
        self.log_likelihood[0].len()
    }

    /// Classifies the first `window` characters of `text`. Words outside the
    /// vocabulary are ignored; an exact tie resolves to `Positive`.
    pub fn classify(&self, text: &str) -> BinaryLabel {
        let mut scores = self.log_prior;
        for token in tokenize(truncate_chars(text, self.window)) {
            for (class, score) in scores.iter_mut().enumerate() {
                if let Some(weight) = self.log_likelihood[class].get(&token) {
                    *score += weight;
                }
            }
        }
        if scores[0] >= scores[1] {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        }
    }
}

fn class_index(label: BinaryLabel) -> usize {
    match label {
        BinaryLabel::Positive => 0,
        BinaryLabel::Negative => 1,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .filter(|w| w.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl SentimentSignal for NaiveBayesClassifier {
    fn name(&self) -> &str {
        "naive-bayes"
    }

    async fn read(&self, text: &str) -> Result<SignalReading> {
        Ok(SignalReading::Label(self.classify(text)))
    }
}
