//! Grammar Model
//!
//! Per-language surface forms: request/question/answer templates, the
//! names of individuals, and sample strings for string-sorted predicates.
//!
//! The on-disk format (`grammar/grammar_<lang>.json`):
//!
//! ```json
//! {
//!   "requests": [{"action": "call", "templates": ["call {sort:contact}"]}],
//!   "questions": [{"predicate": "phone_number_of_contact",
//!                  "templates": ["what is {sort:contact}'s number"]}],
//!   "answers": ["my friend {predicate:selected_contact}"],
//!   "individuals": {"contact_john": ["John", "Johnny"]},
//!   "strings": {"selected_message": ["buy milk"]}
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::template::{RequiredEntity, Template, TemplateError};

/// Grammar lookup and parse errors.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("Failed to parse grammar: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: TemplateError,
    },

    #[error("No grammar entries for individual '{0}'")]
    UnknownIndividual(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported language '{0}' (expected one of: eng, sv)")]
pub struct UnknownLanguage(pub String);

/// Languages with grammar and builtin sample support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    English,
    Swedish,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Swedish];

    /// Code used in file names and output paths.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Swedish => "sv",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eng" | "en" | "english" => Ok(Language::English),
            "sv" | "swe" | "swedish" => Ok(Language::Swedish),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

/// Request to perform an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: String,
    pub template: Template,
}

impl Request {
    pub fn new(action: impl Into<String>, template: Template) -> Self {
        Request {
            action: action.into(),
            template,
        }
    }
}

/// Question about a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub predicate: String,
    pub template: Template,
}

impl Question {
    pub fn new(predicate: impl Into<String>, template: Template) -> Self {
        Question {
            predicate: predicate.into(),
            template,
        }
    }
}

/// Answer phrasing, usually carrying propositional entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub template: Template,
}

impl Answer {
    pub fn new(template: Template) -> Self {
        Answer { template }
    }
}

#[derive(Debug, Deserialize)]
struct RequestEntry {
    action: String,
    templates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    predicate: String,
    templates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GrammarFile {
    #[serde(default)]
    requests: Vec<RequestEntry>,
    #[serde(default)]
    questions: Vec<QuestionEntry>,
    #[serde(default)]
    answers: Vec<String>,
    #[serde(default)]
    individuals: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    strings: BTreeMap<String, Vec<String>>,
}

fn parse_template(source: &str) -> Result<Template, GrammarError> {
    Template::parse(source).map_err(|source_err| GrammarError::Template {
        template: source.to_string(),
        source: source_err,
    })
}

/// Surface forms for one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    requests: Vec<Request>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    individuals: BTreeMap<String, Vec<String>>,
    strings: BTreeMap<String, Vec<String>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_json::from_str(content)?;
        let mut grammar = Grammar::new();

        for entry in file.requests {
            for source in &entry.templates {
                grammar
                    .requests
                    .push(Request::new(entry.action.clone(), parse_template(source)?));
            }
        }
        for entry in file.questions {
            for source in &entry.templates {
                grammar
                    .questions
                    .push(Question::new(entry.predicate.clone(), parse_template(source)?));
            }
        }
        for source in &file.answers {
            grammar.answers.push(Answer::new(parse_template(source)?));
        }
        grammar.individuals = file.individuals;
        grammar.strings = file.strings;

        Ok(grammar)
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn with_answer(mut self, answer: Answer) -> Self {
        self.answers.push(answer);
        self
    }

    pub fn with_individual<I, S>(mut self, individual: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.individuals
            .insert(individual.into(), entries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_strings<I, S>(mut self, predicate: impl Into<String>, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strings
            .insert(predicate.into(), strings.into_iter().map(Into::into).collect());
        self
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn requests_of_action(&self, action: &str) -> Vec<&Request> {
        self.requests.iter().filter(|r| r.action == action).collect()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn questions_of_predicate(&self, predicate: &str) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.predicate == predicate)
            .collect()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Sample strings for a string-sorted predicate.
    pub fn strings_of_predicate(&self, predicate: &str) -> &[String] {
        self.strings
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Surface forms of an individual.
    pub fn entries_of_individual(&self, individual: &str) -> Result<&[String], GrammarError> {
        self.individuals
            .get(individual)
            .map(Vec::as_slice)
            .ok_or_else(|| GrammarError::UnknownIndividual(individual.to_string()))
    }

    pub fn individuals(&self) -> &BTreeMap<String, Vec<String>> {
        &self.individuals
    }

    /// Every template in this grammar, for reference checks.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.requests
            .iter()
            .map(|r| &r.template)
            .chain(self.questions.iter().map(|q| &q.template))
            .chain(self.answers.iter().map(|a| &a.template))
    }

    /// Every required entity in this grammar.
    pub fn required_entities(&self) -> impl Iterator<Item = &RequiredEntity> {
        self.templates().flat_map(|t| t.required_entities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMMAR: &str = r#"{
        "requests": [
            {"action": "call", "templates": ["make a call", "call {sort:contact}"]},
            {"action": "hang_up", "templates": ["hang up"]}
        ],
        "questions": [
            {"predicate": "phone_number_of_contact",
             "templates": ["what is {sort:contact}'s number"]}
        ],
        "answers": ["my friend {predicate:selected_contact}"],
        "individuals": {"contact_john": ["John", "Johnny"]},
        "strings": {"selected_message": ["buy milk"]}
    }"#;

    #[test]
    fn test_parse_grammar() {
        let grammar = Grammar::from_json(GRAMMAR).unwrap();

        assert_eq!(grammar.requests().len(), 3);
        assert_eq!(grammar.requests_of_action("call").len(), 2);
        assert_eq!(grammar.questions_of_predicate("phone_number_of_contact").len(), 1);
        assert_eq!(grammar.answers().len(), 1);
        assert_eq!(
            grammar.entries_of_individual("contact_john").unwrap(),
            &["John", "Johnny"]
        );
        assert_eq!(grammar.strings_of_predicate("selected_message"), &["buy milk"]);
        assert!(grammar.strings_of_predicate("selected_contact").is_empty());
    }

    #[test]
    fn test_unknown_individual() {
        let grammar = Grammar::from_json(GRAMMAR).unwrap();
        assert!(matches!(
            grammar.entries_of_individual("contact_nobody"),
            Err(GrammarError::UnknownIndividual(name)) if name == "contact_nobody"
        ));
    }

    #[test]
    fn test_invalid_template_reports_source() {
        let err = Grammar::from_json(r#"{"answers": ["my friend {contact"]}"#).unwrap_err();
        assert!(err.to_string().contains("my friend {contact"));
    }

    #[test]
    fn test_required_entities_iterates_all_templates() {
        let grammar = Grammar::from_json(GRAMMAR).unwrap();
        let names: Vec<&str> = grammar.required_entities().map(|e| e.name()).collect();
        assert_eq!(names, vec!["contact", "contact", "selected_contact"]);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!("eng".parse::<Language>().unwrap(), Language::English);
        assert_eq!("SV".parse::<Language>().unwrap(), Language::Swedish);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::Swedish.to_string(), "sv");
    }
}
