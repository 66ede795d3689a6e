//! Deterministic stand-ins for the model backends, used in tests and dry runs.

use std::fmt;

use nd_core::{Entity, EntityRecognizer, Error, Result, SentimentSignal, SignalReading};

/// Signal that always returns the same reading.
pub struct FixedSignal {
    reading: SignalReading,
}

impl fmt::Debug for FixedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedSignal").field("reading", &self.reading).finish()
    }
}

impl FixedSignal {
    pub fn new(reading: SignalReading) -> Self {
        Self { reading }
    }
}

#[async_trait::async_trait]
impl SentimentSignal for FixedSignal {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn read(&self, _text: &str) -> Result<SignalReading> {
        Ok(self.reading)
    }
}

#[derive(Debug)]
pub struct FailingSignal;

#[async_trait::async_trait]
impl SentimentSignal for FailingSignal {
    fn name(&self) -> &str {
        "failing"
    }

    async fn read(&self, _text: &str) -> Result<SignalReading> {
        Err(Error::Inference("signal unavailable".to_string()))
    }
}

/// Recognizer that reports the listed entities that occur in the text, in text order.
#[derive(Debug, Default)]
pub struct StaticRecognizer {
    entities: Vec<Entity>,
}

impl StaticRecognizer {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }
}

#[async_trait::async_trait]
impl EntityRecognizer for StaticRecognizer {
    fn name(&self) -> &str {
        "static"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        let mut found: Vec<(usize, Entity)> = self
            .entities
            .iter()
            .filter_map(|e| text.find(&e.text).map(|pos| (pos, e.clone())))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        Ok(found.into_iter().map(|(_, e)| e).collect())
    }
}

#[derive(Debug)]
pub struct FailingRecognizer;

#[async_trait::async_trait]
impl EntityRecognizer for FailingRecognizer {
    fn name(&self) -> &str {
        "failing"
    }

    async fn recognize(&self, _text: &str) -> Result<Vec<Entity>> {
        Err(Error::Inference("recognizer unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::EntityKind;

    #[tokio::test]
    async fn test_static_recognizer_orders_by_position() {
        let recognizer = StaticRecognizer::new(vec![
            Entity::new("SEC", EntityKind::Organization),
            Entity::new("Tesla", EntityKind::Organization),
            Entity::new("Ford", EntityKind::Organization),
        ]);
        let entities = recognizer.recognize("Tesla was contacted by the SEC").await.unwrap();
        let texts: Vec<_> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Tesla", "SEC"]);
    }

    #[tokio::test]
    async fn test_failing_backends() {
        assert!(FailingSignal.read("text").await.is_err());
        assert!(FailingRecognizer.recognize("text").await.is_err());
    }
}
