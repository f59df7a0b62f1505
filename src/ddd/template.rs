//! Grammar Templates
//!
//! A template is a sequence of literal text chunks interleaved with entity
//! slots. In grammar files it is written inline:
//!
//! ```text
//! call {sort:contact} and say hi from {predicate:caller}
//! ```
//!
//! which parses into the chunks `["call ", " and say hi from ", ""]` and the
//! required entities `[Sortal(contact), Propositional(caller)]`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\s*(sort|predicate)\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}")
        .expect("placeholder regex is valid")
});

/// Template construction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template has {chunks} text chunks but {entities} entities (expected {expected} chunks)")]
    ChunkCount {
        chunks: usize,
        entities: usize,
        expected: usize,
    },

    #[error("Stray '{brace}' in template '{template}'")]
    StrayBrace { template: String, brace: char },

    #[error("Template expects {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },
}

/// An entity slot in a template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum RequiredEntity {
    /// Any value of a sort
    #[serde(rename = "sort")]
    Sortal(String),
    /// A value answering a predicate
    #[serde(rename = "predicate")]
    Propositional(String),
}

impl RequiredEntity {
    pub fn sortal(sort: impl Into<String>) -> Self {
        RequiredEntity::Sortal(sort.into())
    }

    pub fn propositional(predicate: impl Into<String>) -> Self {
        RequiredEntity::Propositional(predicate.into())
    }

    pub fn name(&self) -> &str {
        match self {
            RequiredEntity::Sortal(name) | RequiredEntity::Propositional(name) => name,
        }
    }
}

impl fmt::Display for RequiredEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredEntity::Sortal(sort) => write!(f, "{{sort:{}}}", sort),
            RequiredEntity::Propositional(predicate) => write!(f, "{{predicate:{}}}", predicate),
        }
    }
}

/// Character span of an interpolated value: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Result of filling a template's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub text: String,
    /// One span per slot, in slot order
    pub spans: Vec<Span>,
}

/// Text chunks interleaved with entity slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text_chunks: Vec<String>,
    required_entities: Vec<RequiredEntity>,
}

impl Template {
    /// Build from explicit chunks; `chunks.len()` must be `entities.len() + 1`.
    pub fn new(
        text_chunks: Vec<String>,
        required_entities: Vec<RequiredEntity>,
    ) -> Result<Self, TemplateError> {
        let expected = required_entities.len() + 1;
        if text_chunks.len() != expected {
            return Err(TemplateError::ChunkCount {
                chunks: text_chunks.len(),
                entities: required_entities.len(),
                expected,
            });
        }
        Ok(Template {
            text_chunks,
            required_entities,
        })
    }

    /// Template without entities.
    pub fn plain(text: impl Into<String>) -> Self {
        Template {
            text_chunks: vec![text.into()],
            required_entities: Vec::new(),
        }
    }

    /// Parse the inline `{sort:x}` / `{predicate:y}` notation.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut chunks = Vec::new();
        let mut entities = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            chunks.push(source[last..whole.start()].to_string());
            let name = caps[2].to_string();
            entities.push(match &caps[1] {
                "sort" => RequiredEntity::Sortal(name),
                _ => RequiredEntity::Propositional(name),
            });
            last = whole.end();
        }
        chunks.push(source[last..].to_string());

        for chunk in &chunks {
            if let Some(brace) = chunk.chars().find(|c| *c == '{' || *c == '}') {
                return Err(TemplateError::StrayBrace {
                    template: source.to_string(),
                    brace,
                });
            }
        }

        Template::new(chunks, entities)
    }

    pub fn text_chunks(&self) -> &[String] {
        &self.text_chunks
    }

    pub fn required_entities(&self) -> &[RequiredEntity] {
        &self.required_entities
    }

    pub fn has_entities(&self) -> bool {
        !self.required_entities.is_empty()
    }

    /// Substitute `values` into the slots and record each value's span.
    ///
    /// Offsets count characters, so multi-byte values such as `约翰`
    /// occupy two positions.
    pub fn interpolate<S: AsRef<str>>(&self, values: &[S]) -> Result<Interpolation, TemplateError> {
        if values.len() != self.required_entities.len() {
            return Err(TemplateError::ValueCount {
                expected: self.required_entities.len(),
                actual: values.len(),
            });
        }

        let mut text = String::new();
        let mut position = 0;
        let mut spans = Vec::with_capacity(values.len());

        text.push_str(&self.text_chunks[0]);
        position += self.text_chunks[0].chars().count();

        for (value, chunk) in values.iter().zip(&self.text_chunks[1..]) {
            let value = value.as_ref();
            let start = position;
            text.push_str(value);
            position += value.chars().count();
            spans.push(Span {
                start,
                end: position,
            });

            text.push_str(chunk);
            position += chunk.chars().count();
        }

        Ok(Interpolation { text, spans })
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_chunks[0])?;
        for (entity, chunk) in self.required_entities.iter().zip(&self.text_chunks[1..]) {
            write!(f, "{}{}", entity, chunk)?;
        }
        Ok(())
    }
}
