//! RASA NLU Training Data
//!
//! Turns a DDD into intent-classification examples in the RASA NLU JSON
//! format:
//!
//! ```json
//! {"rasa_nlu_data": {"common_examples": [
//!   {"text": "call John", "intent": "phone:action::call",
//!    "entities": [{"start": 5, "end": 9, "value": "John", "entity": "sort:contact"}]}
//! ]}}
//! ```

pub mod generator;
pub mod samples;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use generator::{generate_all, GenerateError, GeneratorConfig, IntentGenerator};
pub use samples::{BuiltinSamples, SampleSet, SortNotSupported};

/// Output file name inside `<output_dir>/<lang>/`.
pub const DATA_FILE: &str = "rasa_data.json";

/// Labelled span of an example's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Start offset in characters
    pub start: usize,
    /// End offset in characters (exclusive)
    pub end: usize,
    pub value: String,
    /// `sort:<name>`, `predicate:<name>` or `string`
    pub entity: String,
}

/// One training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentExample {
    pub text: String,
    pub intent: String,
    #[serde(default)]
    pub entities: Vec<EntitySpan>,
}

impl IntentExample {
    pub fn new(text: impl Into<String>, intent: impl Into<String>) -> Self {
        IntentExample {
            text: text.into(),
            intent: intent.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(
        mut self,
        start: usize,
        end: usize,
        value: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        self.entities.push(EntitySpan {
            start,
            end,
            value: value.into(),
            entity: entity.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasaNluData {
    pub common_examples: Vec<IntentExample>,
}

/// Root of a RASA training data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasaData {
    pub rasa_nlu_data: RasaNluData,
}

impl RasaData {
    pub fn common_examples(&self) -> &[IntentExample] {
        &self.rasa_nlu_data.common_examples
    }

    pub fn examples_of_intent<'a>(&'a self, intent: &'a str) -> impl Iterator<Item = &'a IntentExample> {
        self.common_examples().iter().filter(move |e| e.intent == intent)
    }

    /// Serialize with four-space indentation.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        to_pretty_json(self)
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats::from_data(self)
    }
}

/// Serialize any value as JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Counts over generated data
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationStats {
    /// Total examples generated
    pub total_examples: usize,
    /// Examples by intent label
    pub by_intent: BTreeMap<String, usize>,
    /// Entity spans by entity label
    pub by_entity: BTreeMap<String, usize>,
}

impl GenerationStats {
    pub fn from_data(data: &RasaData) -> Self {
        let mut stats = GenerationStats::default();
        for example in data.common_examples() {
            stats.total_examples += 1;
            *stats.by_intent.entry(example.intent.clone()).or_insert(0) += 1;
            for entity in &example.entities {
                *stats.by_entity.entry(entity.entity.clone()).or_insert(0) += 1;
            }
        }
        stats
    }
}
