//! Domain Model
//!
//! The part of the domain that matters for training data: which questions
//! the system can resolve. Each resolve goal asks a wh-question written in
//! lambda notation (`?X.phone_number_of_contact(X)`) or as a bare
//! predicate name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Malformed wh-question '{0}'")]
    Malformed(String),
}

/// A wh-question about a single predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WhQuestion {
    predicate: String,
}

impl WhQuestion {
    pub fn new(predicate: impl Into<String>) -> Self {
        WhQuestion {
            predicate: predicate.into(),
        }
    }

    /// Parse `?X.pred(X)` or `pred`.
    pub fn parse(s: &str) -> Result<Self, QuestionError> {
        let s = s.trim();
        let malformed = || QuestionError::Malformed(s.to_string());

        let predicate = match s.strip_prefix('?') {
            Some(rest) => {
                let (var, body) = rest.split_once('.').ok_or_else(malformed)?;
                let body = body.strip_suffix(')').ok_or_else(malformed)?;
                let (name, arg) = body.split_once('(').ok_or_else(malformed)?;
                if var.is_empty() || arg != var {
                    return Err(malformed());
                }
                name
            }
            None => s,
        };

        if predicate.is_empty()
            || !predicate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(malformed());
        }
        Ok(WhQuestion::new(predicate))
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }
}

impl TryFrom<String> for WhQuestion {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WhQuestion::parse(&value)
    }
}

impl From<WhQuestion> for String {
    fn from(question: WhQuestion) -> Self {
        format!("?X.{}(X)", question.predicate)
    }
}

/// Goal of resolving a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveGoal {
    pub question: WhQuestion,
}

/// Domain description (`domain.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    pub resolve_goals: Vec<ResolveGoal>,
}

impl Domain {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn with_resolve_goal(mut self, predicate: impl Into<String>) -> Self {
        self.resolve_goals.push(ResolveGoal {
            question: WhQuestion::new(predicate),
        });
        self
    }

    pub fn all_resolve_goals(&self) -> &[ResolveGoal] {
        &self.resolve_goals
    }

    /// Predicates asked about by resolve goals, de-duplicated, in
    /// declaration order.
    pub fn resolve_goal_predicates(&self) -> Vec<&str> {
        let mut predicates: Vec<&str> = Vec::new();
        for goal in &self.resolve_goals {
            let predicate = goal.question.predicate();
            if !predicates.contains(&predicate) {
                predicates.push(predicate);
            }
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lambda_question() {
        let q = WhQuestion::parse("?X.phone_number_of_contact(X)").unwrap();
        assert_eq!(q.predicate(), "phone_number_of_contact");
    }

    #[test]
    fn test_parse_bare_predicate() {
        let q = WhQuestion::parse("  selected_price ").unwrap();
        assert_eq!(q.predicate(), "selected_price");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(WhQuestion::parse("?X.price(Y)").is_err());
        assert!(WhQuestion::parse("?X.price").is_err());
        assert!(WhQuestion::parse("").is_err());
        assert!(WhQuestion::parse("what is it").is_err());
    }

    #[test]
    fn test_domain_json_and_dedup() {
        let domain = Domain::from_json(
            r#"{"resolve_goals": [
                {"question": "?X.phone_number_of_contact(X)"},
                {"question": "current_time"},
                {"question": "?Y.phone_number_of_contact(Y)"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(domain.all_resolve_goals().len(), 3);
        assert_eq!(
            domain.resolve_goal_predicates(),
            vec!["phone_number_of_contact", "current_time"]
        );
    }

    #[test]
    fn test_question_serializes_in_lambda_notation() {
        let json = serde_json::to_string(&WhQuestion::new("price")).unwrap();
        assert_eq!(json, "\"?X.price(X)\"");
    }
}
