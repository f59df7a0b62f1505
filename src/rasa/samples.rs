//! Builtin Sort Samples
//!
//! Builtin sorts have no individuals, so entity values for them come from
//! fixed per-language sample lists.

use thiserror::Error;

use crate::ddd::{Language, Sort, SortKind};

/// Raised for builtin sorts that have no sample values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Builtin sort '{0}' is not yet supported together with RASA")]
pub struct SortNotSupported(pub String);

/// Source of entity values for builtin sorts.
pub trait BuiltinSamples: Send + Sync {
    /// Sample surface forms for a builtin sort.
    fn builtin_sort_samples(&self, sort: &Sort) -> Result<Vec<String>, SortNotSupported>;

    /// Text placed before a value in answer-negation examples.
    fn answer_negation_prefix(&self) -> &str;
}

/// Sample values for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    pub integer: Vec<String>,
    pub string: Vec<String>,
    pub datetime: Vec<String>,
    pub negation_prefix: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SampleSet {
    pub fn from_language(language: Language) -> Self {
        match language {
            Language::English => Self::english(),
            Language::Swedish => Self::swedish(),
        }
    }

    pub fn english() -> Self {
        SampleSet {
            integer: owned(&["0", "99", "1224", "a hundred", "two thousand", "dozens"]),
            string: owned(&[
                "single",
                "double word",
                "three in one",
                "hey make it four",
                "the more the merrier five",
                "calm down and count to six",
                "bring them through to the jolly seven",
                "noone counts toes like an eight toed guy",
                "it matters to make sense for nine of us",
                "would you bring ten or none to a desert island",
            ]),
            datetime: owned(&[
                "today",
                "tomorrow",
                "next week",
                "on Monday",
                "at 7 pm",
                "on the 15th of March",
                "in two hours",
                "the day after tomorrow",
            ]),
            negation_prefix: "not ".to_string(),
        }
    }

    pub fn swedish() -> Self {
        SampleSet {
            integer: owned(&["0", "99", "1224", "hundra", "tvåtusen", "dussintals"]),
            string: owned(&[
                "enkel",
                "dubbla ord",
                "tre i ett",
                "hej gör det fyra",
                "ju fler desto roligare fem",
                "lugna ner dig och räkna till sex",
                "ta med dem till den glada sjuan",
                "ingen räknar tår som en åttatåad kille",
                "det spelar roll att det är vettigt för nio av oss",
                "skulle du ta med tio eller ingen till en öde ö",
            ]),
            datetime: owned(&[
                "idag",
                "imorgon",
                "nästa vecka",
                "på måndag",
                "klockan sju på kvällen",
                "den 15 mars",
                "om två timmar",
                "i övermorgon",
            ]),
            negation_prefix: "inte ".to_string(),
        }
    }
}

impl BuiltinSamples for SampleSet {
    fn builtin_sort_samples(&self, sort: &Sort) -> Result<Vec<String>, SortNotSupported> {
        match sort.kind {
            SortKind::Integer => Ok(self.integer.clone()),
            SortKind::String => Ok(self.string.clone()),
            SortKind::DateTime => Ok(self.datetime.clone()),
            SortKind::Real | SortKind::Boolean | SortKind::Domain | SortKind::Custom => {
                Err(SortNotSupported(sort.name.clone()))
            }
        }
    }

    fn answer_negation_prefix(&self) -> &str {
        &self.negation_prefix
    }
}
