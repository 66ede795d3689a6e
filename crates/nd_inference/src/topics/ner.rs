//! Rule-based named entity recognition.
//!
//! Finds runs of capitalised words and types them with small gazetteers and
//! surface cues (organisation suffixes, honorifics, event nouns, product
//! naming). Entity text is always sliced from the input, so callers can rely
//! on it being a substring.

use std::collections::HashSet;

use async_trait::async_trait;
use nd_core::{Entity, EntityKind, EntityRecognizer, Result};
use unicode_segmentation::UnicodeSegmentation;

use super::stopwords::is_stopword;

const PLACES: &[&str] = &[
    "us", "usa", "uk", "united states", "united kingdom", "america", "britain", "great britain",
    "england", "scotland", "wales", "ireland", "northern ireland", "china", "india", "japan",
    "germany", "france", "italy", "spain", "portugal", "canada", "mexico", "brazil", "argentina",
    "chile", "russia", "ukraine", "poland", "netherlands", "belgium", "switzerland", "austria",
    "sweden", "norway", "denmark", "finland", "turkey", "israel", "iran", "iraq", "egypt",
    "saudi arabia", "qatar", "uae", "south africa", "nigeria", "kenya", "australia",
    "new zealand", "indonesia", "vietnam", "thailand", "malaysia", "singapore", "south korea",
    "north korea", "korea", "taiwan", "hong kong", "pakistan", "bangladesh", "europe", "asia",
    "africa", "london", "paris", "berlin", "madrid", "rome", "brussels", "amsterdam", "dublin",
    "edinburgh", "manchester", "new york", "washington", "california", "texas", "florida",
    "nevada", "michigan", "ohio", "detroit", "chicago", "los angeles", "san francisco",
    "seattle", "boston", "austin", "beijing", "shanghai", "shenzhen", "tokyo", "delhi",
    "new delhi", "mumbai", "bangalore", "moscow", "kyiv", "dubai", "sydney", "toronto",
    "silicon valley", "wall street",
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "co", "ltd", "llc", "plc", "group", "bank", "motors",
    "technologies", "technology", "holdings", "airlines", "airways", "university", "commission",
    "agency", "reserve", "ministry", "department", "council", "association", "partners",
    "capital", "securities", "exchange", "fund", "news", "media", "systems", "labs",
    "industries", "pharmaceuticals", "energy", "foundation", "institute", "authority", "court",
    "parliament", "congress", "senate", "union", "office", "police", "party", "board",
    "service", "services", "trust", "federation",
];

const EVENT_NOUNS: &[&str] = &[
    "summit", "olympics", "cup", "war", "conference", "festival", "championship", "expo",
    "games", "forum", "election", "elections", "awards", "prix", "week", "crisis", "pandemic",
    "show", "fair", "open",
];

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "sir", "dame", "lord", "lady", "president", "ceo", "senator",
    "judge", "professor", "prof", "chancellor", "minister", "prime", "chairman", "governor",
    "secretary", "king", "queen", "prince", "princess",
];

const PERSON_CUES: &[&str] = &[
    "boss", "executive", "founder", "co-founder", "chairman", "chairwoman", "spokesperson",
    "spokesman", "spokeswoman", "analyst", "billionaire", "entrepreneur", "investor", "chief",
    "director", "economist", "reporter", "editor", "by",
];

const CALENDAR: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct",
    "nov", "dec",
];

const CONNECTORS: &[&str] = &["of", "de", "du", "la", "van", "von", "der", "del", "da"];

/// Capitalised words that commonly open a sentence without naming anything.
const COMMON_STARTERS: &[&str] = &[
    "shares", "sales", "profits", "revenue", "investors", "analysts", "officials", "police",
    "customers", "workers", "employees", "earlier", "later", "meanwhile", "today", "yesterday",
    "tomorrow", "last", "new", "bosses", "experts", "critics", "people", "users", "drivers",
    "prices", "markets", "stocks", "demand", "production", "deliveries", "earnings", "growth",
    "despite", "according", "speaking", "asked", "instead", "overall", "still", "yet", "but",
    "and", "so", "it", "its", "this", "that", "there", "these", "those", "many", "some", "most",
    "several", "one", "two", "three", "both", "each", "every", "other", "another", "such",
    "following", "while", "although", "if", "when", "after", "before", "since", "government",
    "data", "figures", "reports", "sources", "plans", "talks",
];

/// Sentence adverbs and participles that open a sentence capitalised.
const INFLECTED_OPENERS: &[&str] = &[
    "recently", "currently", "finally", "additionally", "initially", "previously", "separately",
    "similarly", "ultimately", "notably", "importantly", "unfortunately", "fortunately",
    "reportedly", "allegedly", "apparently", "clearly", "increasingly", "including", "during",
    "regarding", "having", "being", "looking", "announcing", "adding", "writing", "based",
    "compared", "combined", "faced", "launched", "founded", "headquartered", "released",
    "expected", "published", "reported", "updated", "owned", "led", "backed", "used",
];

const NON_ENTITY_ACRONYMS: &[&str] = &[
    "CEO", "CFO", "COO", "CTO", "GDP", "IPO", "EV", "EVS", "AI", "TV", "PM", "AM", "UTC", "GMT",
    "OK", "Q1", "Q2", "Q3", "Q4",
];

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    start: usize,
    end: usize,
    word: &'a str,
    sentence_initial: bool,
}

impl Token<'_> {
    fn lower(&self) -> String {
        self.word.to_lowercase()
    }

    fn is_numeric(&self) -> bool {
        self.word.chars().all(|c| c.is_ascii_digit())
    }

    fn is_acronym(&self) -> bool {
        self.word.chars().count() >= 2
            && self.word.chars().all(|c| c.is_alphanumeric())
            && self.word.chars().any(char::is_alphabetic)
            && self.word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
    }

    /// `iPhone`, `eBay`: lowercase first letter followed by an inner capital.
    fn is_camel_product(&self) -> bool {
        let mut chars = self.word.chars();
        matches!(chars.next(), Some(c) if c.is_lowercase())
            && self.word.chars().count() > 2
            && chars.any(char::is_uppercase)
    }

    fn is_capitalized(&self) -> bool {
        matches!(self.word.chars().next(), Some(c) if c.is_uppercase()) || self.is_camel_product()
    }
}

/// `Boeing's` -> `Boeing`. A bare `'s` is left alone.
pub(crate) fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .filter(|w| !w.is_empty())
        .unwrap_or(word)
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut previous_end = 0;
    for (start, word) in text.unicode_word_indices() {
        let word = strip_possessive(word);
        let gap = &text[previous_end..start];
        let sentence_initial = tokens.is_empty() || gap.contains(['.', '!', '?', '\n', ':', ';']);
        tokens.push(Token {
            start,
            end: start + word.len(),
            word,
            sentence_initial,
        });
        previous_end = start + word.len();
    }
    tokens
}

/// Two tokens may belong to one name only if separated by spaces, a hyphen or an ampersand.
fn joinable(text: &str, left: &Token<'_>, right: &Token<'_>) -> bool {
    let gap = &text[left.end..right.start];
    !gap.is_empty() && gap.len() <= 3 && gap.chars().all(|c| c == ' ' || c == '-' || c == '&')
}

fn contains(list: &[&str], word: &str) -> bool {
    list.contains(&word)
}

/// Job titles and honorifics that introduce a person's name.
fn is_title(token: &Token<'_>) -> bool {
    let lower = token.lower();
    contains(HONORIFICS, &lower) || contains(PERSON_CUES, &lower)
}

#[derive(Debug, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Recognises entities in `text`, in order of appearance.
    pub fn entities(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let mid_sentence_words: HashSet<&str> = tokens
            .iter()
            .filter(|t| !t.sentence_initial && t.is_capitalized())
            .map(|t| t.word)
            .collect();
        let lowercase_words: HashSet<&str> = tokens
            .iter()
            .filter(|t| t.word.chars().all(char::is_lowercase))
            .map(|t| t.word)
            .collect();
        let context = Context {
            mid_sentence: &mid_sentence_words,
            lowercase: &lowercase_words,
        };

        let mut entities = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if !tokens[i].is_capitalized() {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < tokens.len() && joinable(text, &tokens[j - 1], &tokens[j]) {
                let next = &tokens[j];
                if next.is_capitalized() || next.is_numeric() && next.word.len() <= 2 {
                    j += 1;
                } else if contains(CONNECTORS, next.word)
                    && j + 1 < tokens.len()
                    && joinable(text, next, &tokens[j + 1])
                    && tokens[j + 1].is_capitalized()
                {
                    j += 2;
                } else {
                    break;
                }
            }
            for (start, end) in split_at_titles(&tokens, i, j) {
                if let Some(entity) = self.classify_span(text, &tokens, start, end, &context) {
                    entities.push(entity);
                }
            }
            i = j;
        }
        entities
    }

    fn classify_span(
        &self,
        text: &str,
        tokens: &[Token<'_>],
        start: usize,
        end: usize,
        context: &Context<'_>,
    ) -> Option<Entity> {
        let mut first = start;
        let mut honorific = false;
        while first < end {
            let lower = tokens[first].lower();
            if is_title(&tokens[first]) && first + 1 < end {
                honorific = true;
                first += 1;
            } else if is_stopword(&lower) && !tokens[first].is_acronym() {
                first += 1;
            } else {
                break;
            }
        }
        if first >= end {
            return None;
        }
        let span = &tokens[first..end];
        let lower_words: Vec<String> = span.iter().map(Token::lower).collect();
        if lower_words
            .iter()
            .zip(span)
            .all(|(w, t)| contains(CALENDAR, w) || t.is_numeric())
        {
            return None;
        }

        let surface = &text[span[0].start..span[span.len() - 1].end];
        let lower_surface = surface.to_lowercase();
        let last = lower_words[lower_words.len() - 1].as_str();
        let previous = first.checked_sub(1).map(|p| tokens[p].lower());

        if span.len() == 1 {
            let token = &span[0];
            if token.is_acronym() && contains(NON_ENTITY_ACRONYMS, token.word) {
                return None;
            }
            if token.sentence_initial && first == start && !self.plausible_opener(token, context) {
                return None;
            }
        }

        let kind = if contains(PLACES, &lower_surface) {
            EntityKind::GeopoliticalEntity
        } else if honorific {
            EntityKind::Person
        } else if span.len() > 1 && contains(ORG_SUFFIXES, last) {
            EntityKind::Organization
        } else if contains(ORG_SUFFIXES, &lower_words[0])
            && lower_words.iter().any(|w| contains(CONNECTORS, w))
        {
            EntityKind::Organization
        } else if span.len() > 1 && contains(EVENT_NOUNS, last) {
            EntityKind::Event
        } else if span.iter().any(|t| t.is_camel_product() || t.is_numeric()) {
            EntityKind::Product
        } else if span.len() == 1 && span[0].is_acronym() {
            EntityKind::Organization
        } else if previous.as_deref().is_some_and(|p| contains(PERSON_CUES, p)) {
            EntityKind::Person
        } else if (2..=3).contains(&span.len()) {
            EntityKind::Person
        } else {
            EntityKind::Organization
        };
        Some(Entity::new(surface, kind))
    }

    /// Whether a lone capitalised word at the start of a sentence is likely a name.
    ///
    /// Only known opener words, or words the same text also uses in lowercase,
    /// are rejected; an unfamiliar capitalised word is taken as a name.
    fn plausible_opener(&self, token: &Token<'_>, context: &Context<'_>) -> bool {
        let lower = token.lower();
        if contains(PLACES, &lower) || token.is_acronym() || token.is_camel_product() {
            return true;
        }
        if context.mid_sentence.contains(token.word) {
            return true;
        }
        !(contains(COMMON_STARTERS, &lower)
            || contains(INFLECTED_OPENERS, &lower)
            || context.lowercase.contains(lower.as_str()))
    }
}

/// Word sets gathered once per text.
struct Context<'a> {
    mid_sentence: &'a HashSet<&'a str>,
    lowercase: &'a HashSet<&'a str>,
}

/// Splits a capitalised run before each title that introduces a later name,
/// so `Tesla Chief Executive Elon Musk` becomes `Tesla` and `Chief Executive Elon Musk`.
/// A run ending in titles (`Stephen King`) stays whole.
fn split_at_titles(tokens: &[Token<'_>], start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut segment_start = start;
    let mut k = start + 1;
    while k < end {
        if is_title(&tokens[k]) && !is_title(&tokens[k - 1]) {
            let mut run_end = k;
            while run_end < end && is_title(&tokens[run_end]) {
                run_end += 1;
            }
            if run_end < end {
                segments.push((segment_start, k));
                segment_start = k;
            }
            k = run_end;
        } else {
            k += 1;
        }
    }
    segments.push((segment_start, end));
    segments
}

#[async_trait]
impl EntityRecognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        Ok(self.entities(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(text: &str) -> Vec<(String, EntityKind)> {
        HeuristicRecognizer::new()
            .entities(text)
            .into_iter()
            .map(|e| (e.text, e.kind))
            .collect()
    }

    #[test]
    fn test_people_organizations_and_places() {
        let found = entities("Tesla boss Elon Musk said the SEC had opened an inquiry in the US.");
        assert_eq!(
            found,
            vec![
                ("Tesla".to_string(), EntityKind::Organization),
                ("Elon Musk".to_string(), EntityKind::Person),
                ("SEC".to_string(), EntityKind::Organization),
                ("US".to_string(), EntityKind::GeopoliticalEntity),
            ]
        );
    }

    #[test]
    fn test_products_and_common_openers() {
        let found = entities("Shares in Apple rose after the iPhone 15 launch in China.");
        assert_eq!(
            found,
            vec![
                ("Apple".to_string(), EntityKind::Organization),
                ("iPhone 15".to_string(), EntityKind::Product),
                ("China".to_string(), EntityKind::GeopoliticalEntity),
            ]
        );
    }

    #[test]
    fn test_events_and_leading_articles() {
        let found = entities("The Paris Olympics will boost Nike.");
        assert_eq!(
            found,
            vec![
                ("Paris Olympics".to_string(), EntityKind::Event),
                ("Nike".to_string(), EntityKind::Organization),
            ]
        );
    }

    #[test]
    fn test_dates_and_honorifics() {
        let found = entities("On Monday, Mr Musk met the Federal Reserve.");
        assert_eq!(
            found,
            vec![
                ("Musk".to_string(), EntityKind::Person),
                ("Federal Reserve".to_string(), EntityKind::Organization),
            ]
        );
    }

    #[test]
    fn test_possessive_and_punctuation_split_names() {
        let found = entities("Investors cheered Tesla's results, Ford fell.");
        let texts: Vec<_> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Tesla", "Ford"]);
    }

    #[test]
    fn test_titles_split_company_from_person() {
        let found = entities("Tesla Chief Executive Elon Musk said sales rose.");
        assert_eq!(
            found,
            vec![
                ("Tesla".to_string(), EntityKind::Organization),
                ("Elon Musk".to_string(), EntityKind::Person),
            ]
        );
        let found = entities("Bank of England Governor Andrew Bailey spoke, as did Apple CEO Tim Cook.");
        let texts: Vec<_> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Bank of England", "Andrew Bailey", "Apple", "Tim Cook"]);
        assert_eq!(found[0].1, EntityKind::Organization);
        assert_eq!(found[1].1, EntityKind::Person);
        assert_eq!(found[3].1, EntityKind::Person);
    }

    #[test]
    fn test_trailing_title_word_stays_in_name() {
        let texts: Vec<_> = entities("A novel by Stephen King sold well.")
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(texts, vec!["Stephen King"]);
    }

    #[test]
    fn test_unfamiliar_sentence_opener_is_a_name() {
        let found = entities("Boeing said on Monday that deliveries fell.");
        assert_eq!(found, vec![("Boeing".to_string(), EntityKind::Organization)]);
        let found = entities("Reportedly, Nvidia is close to a deal.");
        assert_eq!(found, vec![("Nvidia".to_string(), EntityKind::Organization)]);
    }

    #[test]
    fn test_opener_also_used_in_lowercase_is_skipped() {
        let found = entities("Trading was halted on Nasdaq before trading resumed.");
        let texts: Vec<_> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Nasdaq"]);
    }

    #[test]
    fn test_entity_text_is_substring() {
        let text = "Volkswagen and BMW pushed Germany's Bosch-Siemens joint venture, said Dr Anna Schmidt.";
        for entity in HeuristicRecognizer::new().entities(text) {
            assert!(text.contains(&entity.text), "{} not in text", entity.text);
        }
    }

    #[test]
    fn test_plain_lowercase_text_has_no_entities() {
        assert!(entities("sales were slow and profits fell this quarter").is_empty());
        assert!(entities("").is_empty());
    }
}
