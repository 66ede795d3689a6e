//! Rule-based polarity scoring.
//!
//! A valence lexicon in the VADER style: every known word carries a valence
//! in roughly `[-4, 4]`, adjusted by nearby boosters and negations, a
//! contrastive "but", ALL-CAPS emphasis and exclamation marks. The summed
//! valence is squashed into a compound score in `[-1, 1]`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use nd_core::{Result, SentimentSignal, SignalReading};

const BOOSTER_INCREMENT: f64 = 0.293;
const BOOSTER_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NORMALIZATION_ALPHA: f64 = 15.0;

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("good", 1.9), ("great", 3.1), ("excellent", 2.7), ("amazing", 2.8), ("awesome", 3.1),
    ("best", 3.2), ("better", 1.9), ("love", 3.2), ("like", 1.5), ("happy", 2.7),
    ("glad", 2.0), ("pleased", 1.9), ("delighted", 2.9), ("excited", 1.4), ("exciting", 2.2),
    ("success", 2.7), ("successful", 2.8), ("succeed", 2.2), ("win", 2.8), ("wins", 2.7),
    ("won", 2.7), ("winning", 2.4), ("gain", 2.4), ("gains", 1.8), ("gained", 1.6),
    ("profit", 1.9), ("profits", 1.9), ("profitable", 1.9), ("growth", 1.6), ("grow", 1.4),
    ("grew", 1.2), ("growing", 1.1), ("boost", 1.7), ("boosted", 1.5), ("surge", 1.4),
    ("surged", 1.4), ("soar", 1.9), ("soared", 1.9), ("rally", 1.3), ("rallied", 1.3),
    ("rise", 1.0), ("rises", 1.0), ("rose", 0.9), ("record", 0.8), ("strong", 2.3),
    ("stronger", 1.9), ("strength", 2.2), ("robust", 1.9), ("improve", 1.9), ("improved", 2.1),
    ("improvement", 2.0), ("improving", 1.8), ("recover", 1.4), ("recovery", 1.4), ("rebound", 1.1),
    ("optimistic", 1.3), ("optimism", 2.5), ("confident", 2.2), ("confidence", 2.3), ("positive", 2.6),
    ("benefit", 2.0), ("benefits", 1.6), ("beneficial", 1.9), ("opportunity", 1.8), ("opportunities", 1.6),
    ("innovative", 2.0), ("innovation", 1.8), ("breakthrough", 2.3), ("leading", 1.2), ("leader", 1.3),
    ("praise", 2.6), ("praised", 2.2), ("celebrate", 2.7), ("celebrated", 2.7), ("welcome", 2.0),
    ("welcomed", 1.9), ("support", 1.7), ("supported", 1.3), ("agree", 1.5), ("agreement", 2.2),
    ("approve", 1.7), ("approved", 1.8), ("approval", 2.2), ("upgrade", 1.6), ("upgraded", 1.5),
    ("outperform", 1.6), ("beat", 1.1), ("exceed", 1.6), ("exceeded", 1.6), ("impressive", 3.0),
    ("remarkable", 2.7), ("outstanding", 3.2), ("wonderful", 2.7), ("fantastic", 2.6), ("brilliant", 2.8),
    ("popular", 1.8), ("promising", 2.0), ("promise", 1.3), ("secure", 1.4), ("safe", 1.9),
    ("stable", 1.2), ("stability", 1.7), ("efficient", 1.8), ("easy", 1.9), ("free", 2.3),
    ("fair", 1.3), ("fun", 2.3), ("hope", 1.9), ("hopeful", 2.3), ("thrive", 2.5),
    ("thriving", 2.6), ("expand", 1.3), ("expansion", 1.3), ("advance", 1.5), ("advanced", 1.2),
    ("reward", 2.1), ("rewarding", 2.4), ("honor", 2.2), ("trust", 2.3), ("trusted", 2.1),
    ("resilient", 1.6), ("boom", 2.1), ("booming", 2.1), ("bullish", 1.9), ("upbeat", 2.0),
    ("milestone", 1.8), ("achievement", 2.6), ("achieve", 1.8), ("achieved", 1.6), ("excellence", 3.1),
    ("ideal", 2.4), ("perfect", 2.7), ("solid", 1.3), ("healthy", 1.7), ("lucrative", 1.6),
    // negative
    ("bad", -2.5), ("worse", -2.1), ("worst", -3.1), ("terrible", -2.1), ("awful", -2.0),
    ("horrible", -2.5), ("poor", -2.1), ("hate", -2.7), ("sad", -2.1), ("angry", -2.3),
    ("anger", -2.7), ("fear", -2.2), ("fears", -1.8), ("afraid", -2.0), ("worry", -1.9),
    ("worried", -1.2), ("worries", -1.8), ("concern", -1.1), ("concerns", -1.0), ("concerned", -1.3),
    ("loss", -1.3), ("losses", -1.7), ("lose", -1.7), ("losing", -1.6), ("lost", -1.3),
    ("fail", -2.5), ("failed", -2.3), ("failure", -2.3), ("failing", -2.2), ("decline", -1.1),
    ("declined", -1.1), ("declining", -1.3), ("drop", -1.1), ("dropped", -1.1), ("fall", -1.1),
    ("fell", -1.1), ("falling", -1.0), ("plunge", -1.9), ("plunged", -1.9), ("crash", -1.7),
    ("crashed", -1.7), ("collapse", -2.2), ("collapsed", -2.2), ("slump", -1.8), ("slumped", -1.8),
    ("tumble", -1.4), ("tumbled", -1.4), ("weak", -1.9), ("weaker", -1.9), ("weakness", -1.5),
    ("risk", -1.1), ("risks", -1.1), ("risky", -1.4), ("crisis", -3.1), ("problem", -1.7),
    ("problems", -1.7), ("trouble", -1.7), ("troubled", -2.0), ("threat", -2.4), ("threaten", -2.0),
    ("threatened", -2.0), ("warning", -1.4), ("warn", -0.4), ("warned", -1.1), ("negative", -2.7),
    ("lawsuit", -0.9), ("sue", -1.1), ("sued", -1.1), ("fraud", -2.8), ("scandal", -1.9),
    ("investigation", -1.0), ("probe", -0.8), ("fine", -0.5), ("fined", -1.5), ("penalty", -1.8),
    ("recall", -0.9), ("recalled", -0.9), ("cut", -1.1), ("cuts", -1.1), ("layoff", -2.0),
    ("layoffs", -2.0), ("fired", -2.6), ("strike", -1.2), ("protest", -1.0), ("protests", -1.0),
    ("criticism", -1.9), ("criticised", -1.7), ("criticized", -1.7), ("critic", -1.1), ("blame", -1.4),
    ("blamed", -2.1), ("accuse", -2.0), ("accused", -2.0), ("allegations", -1.4), ("controversy", -1.3),
    ("controversial", -0.8), ("dispute", -1.7), ("conflict", -1.3), ("war", -2.9), ("attack", -2.1),
    ("attacked", -2.1), ("damage", -2.2), ("damaged", -1.9), ("destroy", -2.6), ("destroyed", -2.6),
    ("danger", -2.4), ("dangerous", -2.1), ("death", -2.9), ("dead", -3.3), ("died", -2.6),
    ("killed", -3.5), ("injured", -1.7), ("accident", -2.1), ("disaster", -3.1), ("chaos", -2.7),
    ("uncertain", -1.2), ("uncertainty", -1.4), ("volatile", -1.1), ("volatility", -1.0), ("bearish", -1.5),
    ("downgrade", -1.5), ("downgraded", -1.5), ("miss", -0.6), ("missed", -1.2), ("disappoint", -2.3),
    ("disappointed", -1.9), ("disappointing", -2.2), ("disappointment", -2.3), ("delay", -1.3), ("delayed", -0.9),
    ("shortage", -1.7), ("debt", -1.5), ("bankrupt", -2.6), ("bankruptcy", -2.6), ("recession", -2.2),
    ("inflation", -0.8), ("sanction", -0.9), ("sanctions", -0.9), ("ban", -2.6), ("banned", -2.0),
    ("illegal", -2.6), ("guilty", -1.8), ("violation", -2.2), ("breach", -1.8), ("hack", -1.4),
    ("hacked", -1.7), ("leak", -1.4), ("struggle", -1.5), ("struggling", -1.7), ("suffer", -2.1),
    ("suffered", -2.2), ("pain", -2.3), ("hurt", -2.4), ("harm", -2.5), ("harmful", -2.6),
    ("unfair", -2.1), ("wrong", -2.1), ("mistake", -1.8), ("error", -1.7), ("flaw", -1.6),
    ("flawed", -1.8), ("defect", -1.4), ("broken", -2.1), ("shock", -1.6), ("shocked", -1.3),
    ("slow", -0.8), ("slowdown", -1.4), ("stall", -0.9), ("stalled", -1.1), ("hostile", -2.5),
    ("panic", -2.3), ("turmoil", -2.2), ("downturn", -1.8), ("shrink", -1.1), ("shrinking", -1.1),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOSTER_INCREMENT), ("completely", BOOSTER_INCREMENT), ("considerably", BOOSTER_INCREMENT),
    ("deeply", BOOSTER_INCREMENT), ("enormously", BOOSTER_INCREMENT), ("entirely", BOOSTER_INCREMENT),
    ("especially", BOOSTER_INCREMENT), ("exceptionally", BOOSTER_INCREMENT), ("extremely", BOOSTER_INCREMENT),
    ("greatly", BOOSTER_INCREMENT), ("highly", BOOSTER_INCREMENT), ("hugely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT), ("majorly", BOOSTER_INCREMENT), ("more", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT), ("particularly", BOOSTER_INCREMENT), ("really", BOOSTER_INCREMENT),
    ("remarkably", BOOSTER_INCREMENT), ("significantly", BOOSTER_INCREMENT), ("sharply", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT), ("substantially", BOOSTER_INCREMENT), ("totally", BOOSTER_INCREMENT),
    ("tremendously", BOOSTER_INCREMENT), ("very", BOOSTER_INCREMENT), ("dramatically", BOOSTER_INCREMENT),
    ("almost", BOOSTER_DECREMENT), ("barely", BOOSTER_DECREMENT), ("hardly", BOOSTER_DECREMENT),
    ("less", BOOSTER_DECREMENT), ("little", BOOSTER_DECREMENT), ("marginally", BOOSTER_DECREMENT),
    ("occasionally", BOOSTER_DECREMENT), ("partly", BOOSTER_DECREMENT), ("scarcely", BOOSTER_DECREMENT),
    ("slightly", BOOSTER_DECREMENT), ("somewhat", BOOSTER_DECREMENT),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont", "hadnt",
    "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither", "never", "no", "none", "nope",
    "nor", "not", "nothing", "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt",
];

/// Lexicon polarity scorer producing VADER-style compound scores.
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    /// Compound polarity of `text` in `[-1, 1]`. Text without lexicon words scores `0.0`.
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let mixed_case = tokens.iter().any(|t| is_all_caps(t)) && !tokens.iter().all(|t| is_all_caps(t));
        let normalized: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase().replace('\'', ""))
            .collect();

        let mut sentiments: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in normalized.iter().enumerate() {
            let Some(&base) = self.valences.get(word.as_str()) else {
                sentiments.push(0.0);
                continue;
            };
            let mut valence = base;
            if mixed_case && is_all_caps(tokens[i]) {
                valence += CAPS_INCREMENT * valence.signum();
            }

            for distance in 1..=3 {
                if i < distance {
                    break;
                }
                let previous = normalized[i - distance].as_str();
                if let Some(&boost) = self.boosters.get(previous) {
                    let damping = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    valence += boost * valence.signum() * damping;
                }
            }

            if self.negated(&normalized[i.saturating_sub(3)..i]) {
                valence *= NEGATION_SCALAR;
            }
            sentiments.push(valence);
        }

        if let Some(pivot) = normalized.iter().position(|w| w == "but") {
            for (i, value) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *value *= 0.5;
                } else if i > pivot {
                    *value *= 1.5;
                }
            }
        }

        let mut sum: f64 = sentiments.iter().sum();
        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += exclamations as f64 * EXCLAMATION_INCREMENT * sum.signum();
        }
        normalize(sum)
    }

    fn negated(&self, window: &[String]) -> bool {
        window.iter().any(|w| self.negations.contains(w.as_str()))
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && token.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

fn normalize(score: f64) -> f64 {
    let compound = score / (score * score + NORMALIZATION_ALPHA).sqrt();
    compound.clamp(-1.0, 1.0)
}

#[async_trait]
impl SentimentSignal for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn read(&self, text: &str) -> Result<SignalReading> {
        Ok(SignalReading::Polarity(self.polarity(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_text_scores_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("The company held its annual meeting on Tuesday."), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn test_direction() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("Profits surged to a record and investors were delighted.") > 0.05);
        assert!(scorer.polarity("Shares plunged after the fraud scandal and layoffs.") < -0.05);
    }

    #[test]
    fn test_negation_flips_sign() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("The results were good") > 0.0);
        assert!(scorer.polarity("The results were not good") < 0.0);
        assert!(scorer.polarity("The results weren't good") < 0.0);
    }

    #[test]
    fn test_booster_and_caps_increase_magnitude() {
        let scorer = LexiconScorer::new();
        let plain = scorer.polarity("The launch was good");
        assert!(scorer.polarity("The launch was very good") > plain);
        assert!(scorer.polarity("The launch was GOOD") > plain);
        assert!(scorer.polarity("The launch was good!!") > plain);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("Sales were good but the outlook is terrible") < 0.0);
    }

    #[test]
    fn test_compound_is_bounded() {
        let scorer = LexiconScorer::new();
        let text = "great excellent amazing awesome best love wonderful fantastic brilliant perfect ".repeat(20);
        let score = scorer.polarity(&text);
        assert!(score <= 1.0 && score > 0.9);
    }

    #[tokio::test]
    async fn test_signal_reading() {
        let scorer = LexiconScorer::new();
        match scorer.read("a great day").await.unwrap() {
            SignalReading::Polarity(p) => assert!(p > 0.0),
            other => panic!("unexpected reading: {:?}", other),
        }
    }
}
