use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nd_core::{AnalyzedArticle, Article, DigestConfig, DigestOutcome, DigestReport, PairingStrategy};
use nd_inference::{EntityBackend, ModelRegistry, SentimentBackend};
use nd_narration::NarrationRenderer;
use nd_scrapers::{init_logging, DigestManager};
use tracing::info;

const NO_RESULTS: &str = "No articles found. Try another company name.";

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

/// Parses `20s`, `1m30s`, `2h` or a bare number of seconds.
impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();
        let mut seconds: u64 = 0;
        let mut rest = input;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Expected a number in duration {:?}", input));
            }
            let value: u64 = rest[..digits]
                .parse()
                .map_err(|_| format!("Duration {:?} is too long", input))?;
            rest = &rest[digits..];

            let unit = rest.chars().next();
            let scale = match unit {
                None | Some('s') => 1,
                Some('m') => 60,
                Some('h') => 3600,
                Some(c) => return Err(format!("Invalid duration unit: {}", c)),
            };
            if let Some(c) = unit {
                rest = rest[c.len_utf8()..].trim_start();
            }
            seconds = value
                .checked_mul(scale)
                .and_then(|part| seconds.checked_add(part))
                .ok_or_else(|| format!("Duration {:?} is too long", input))?;
        }

        if seconds == 0 {
            return Err("Duration must be a positive number of seconds, minutes or hours".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news digest: sentiment, topics and a spoken summary", long_about = None)]
struct Cli {
    /// Learned sentiment model used alongside the lexicon: local (DistilBERT), naive-bayes, huggingface
    #[arg(long, global = true, default_value = "local")]
    sentiment_backend: SentimentBackend,
    /// Directory the local DistilBERT files are downloaded to
    #[arg(long, global = true, env = "ND_MODEL_DIR")]
    model_dir: Option<PathBuf>,
    /// Named entity recognizer: heuristic, huggingface
    #[arg(long, global = true, default_value = "heuristic")]
    entity_backend: EntityBackend,
    /// Hugging Face API token for the huggingface backends
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,
    /// How search result titles are matched to links: positional, scoped
    #[arg(long, global = true, default_value = "positional")]
    pairing: PairingStrategy,
    /// HTTP timeout per request (e.g. 20s, 1m)
    #[arg(long, global = true, default_value = "20s")]
    timeout: HumanDuration,
    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, analyse and narrate the latest news about a company
    Digest {
        company: String,
        /// Skip translation and speech synthesis
        #[arg(long)]
        no_audio: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Where to write the narrated report
        #[arg(long)]
        audio_path: Option<PathBuf>,
        /// Narration language code
        #[arg(long)]
        language: Option<String>,
    },
    /// List the articles found for a company without analysing them
    Articles {
        company: String,
        #[arg(long)]
        json: bool,
    },
    /// Summarize and classify a single article
    Analyze {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

fn print_article(index: usize, article: &AnalyzedArticle) {
    println!("{}. {}", index, article.title);
    println!("   {}", article.url);
    println!("   Summary: {}", article.summary);
    println!("   Sentiment: {}", article.sentiment);
    println!("   Topics: {}", article.topics.join(", "));
    println!();
}

fn print_report(report: &DigestReport) -> anyhow::Result<()> {
    println!("📰 News about {}", report.company);
    println!();
    for (i, article) in report.articles.iter().enumerate() {
        print_article(i + 1, article);
    }
    println!("📊 Comparative Sentiment Analysis");
    println!("{}", serde_json::to_string_pretty(&report.analysis)?);
    println!();
    println!("{}", report.analysis.final_statement);
    if let Some(audio) = &report.audio {
        println!("🔊 Audio: {}", audio.display());
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    for (i, article) in articles.iter().enumerate() {
        println!("{}. {}", i + 1, article.title);
        println!("   {}", article.url);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = DigestConfig::default()
        .with_pairing(cli.pairing)
        .with_timeout(cli.timeout.0);
    let models = nd_inference::Config {
        sentiment_backend: cli.sentiment_backend,
        entity_backend: cli.entity_backend,
        api_key: cli.hf_token.clone(),
        model_dir: cli.model_dir.clone(),
    };
    let registry = ModelRegistry::new();
    info!("🧠 Models: {:?}", models);

    match cli.command {
        Commands::Digest {
            company,
            no_audio,
            json,
            audio_path,
            language,
        } => {
            if let Some(path) = audio_path {
                config = config.with_audio_path(path);
            }
            if let Some(language) = language {
                config = config.with_target_language(language);
            }
            let mut manager = DigestManager::from_config(config, &models, &registry)?;
            if !no_audio {
                let narrator = NarrationRenderer::google(manager.config().http_client()?, manager.config());
                manager = manager.with_narrator(narrator);
            }

            match manager.run(&company).await? {
                DigestOutcome::NoResults { .. } => println!("{}", NO_RESULTS),
                DigestOutcome::Report(report) if json => {
                    println!("{}", serde_json::to_string_pretty(&report)?)
                }
                DigestOutcome::Report(report) => print_report(&report)?,
            }
        }
        Commands::Articles { company, json } => {
            let manager = DigestManager::from_config(config, &models, &registry)?;
            let articles = manager.articles(&company).await?;
            if articles.is_empty() {
                println!("{}", NO_RESULTS);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                print_articles(&articles);
            }
        }
        Commands::Analyze { url, title, json } => {
            let manager = DigestManager::from_config(config, &models, &registry)?;
            let title = title.unwrap_or_else(|| url.clone());
            let article = manager.analyze_url(&title, &url).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                print_article(1, &article);
            }
        }
    }

    Ok(())
}
