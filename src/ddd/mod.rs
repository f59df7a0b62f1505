//! Dialogue Domain Descriptions
//!
//! A DDD bundles the ontology, the domain and one grammar per language of a
//! conversational application. On disk it is a directory:
//!
//! ```text
//! phone/
//! ├── ontology.json
//! ├── domain.json
//! └── grammar/
//!     ├── grammar_eng.json
//!     └── grammar_sv.json
//! ```
//!
//! The directory name is the DDD name, which prefixes every intent label.

pub mod domain;
pub mod grammar;
pub mod ontology;
pub mod template;
pub mod validator;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use domain::{Domain, QuestionError, ResolveGoal, WhQuestion};
pub use grammar::{Answer, Grammar, GrammarError, Language, Question, Request, UnknownLanguage};
pub use ontology::{Ontology, OntologyError, Predicate, Sort, SortKind};
pub use template::{Interpolation, RequiredEntity, Span, Template, TemplateError};
pub use validator::{
    validate_ddd, validate_ddd_dir, DddStats, ValidationError, ValidationResult, ValidationWarning,
};

pub const ONTOLOGY_FILE: &str = "ontology.json";
pub const DOMAIN_FILE: &str = "domain.json";
pub const GRAMMAR_DIR: &str = "grammar";

/// DDD loading errors.
#[derive(Debug, Error)]
pub enum DddError {
    #[error("DDD directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load grammar {path}: {source}")]
    Grammar {
        path: PathBuf,
        #[source]
        source: GrammarError,
    },

    #[error("No grammar for language '{0}'")]
    MissingGrammar(Language),
}

/// Path of a language's grammar inside a DDD directory.
pub fn grammar_path(ddd_dir: &Path, language: Language) -> PathBuf {
    ddd_dir
        .join(GRAMMAR_DIR)
        .join(format!("grammar_{}.json", language.code()))
}

/// Whether a DDD directory ships a grammar for `language`.
pub fn grammar_exists_for_language(ddd_dir: &Path, language: Language) -> bool {
    grammar_path(ddd_dir, language).is_file()
}

fn read(path: &Path) -> Result<String, DddError> {
    fs::read_to_string(path).map_err(|source| DddError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Ontology, domain and per-language grammars of one application.
#[derive(Debug, Clone, PartialEq)]
pub struct Ddd {
    pub name: String,
    pub ontology: Ontology,
    pub domain: Domain,
    pub grammars: BTreeMap<Language, Grammar>,
}

impl Ddd {
    pub fn new(name: impl Into<String>, ontology: Ontology, domain: Domain) -> Self {
        Ddd {
            name: name.into(),
            ontology,
            domain,
            grammars: BTreeMap::new(),
        }
    }

    pub fn with_grammar(mut self, language: Language, grammar: Grammar) -> Self {
        self.grammars.insert(language, grammar);
        self
    }

    /// Load a DDD directory with every grammar it ships.
    pub fn load(dir: &Path) -> Result<Self, DddError> {
        let languages: Vec<Language> = Language::ALL
            .into_iter()
            .filter(|language| grammar_exists_for_language(dir, *language))
            .collect();
        Self::load_languages(dir, &languages)
    }

    /// Load a DDD directory with the grammars of `languages`.
    ///
    /// A requested language without a grammar file is an error.
    pub fn load_languages(dir: &Path, languages: &[Language]) -> Result<Self, DddError> {
        if !dir.is_dir() {
            return Err(DddError::NotFound(dir.to_path_buf()));
        }

        let name = dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| dir.display().to_string());

        let ontology_path = dir.join(ONTOLOGY_FILE);
        let ontology = Ontology::from_json(&read(&ontology_path)?).map_err(|source| {
            DddError::Parse {
                path: ontology_path.clone(),
                source,
            }
        })?;

        let domain_path = dir.join(DOMAIN_FILE);
        let domain = if domain_path.exists() {
            Domain::from_json(&read(&domain_path)?).map_err(|source| DddError::Parse {
                path: domain_path.clone(),
                source,
            })?
        } else {
            Domain::default()
        };

        let mut ddd = Ddd::new(name, ontology, domain);
        for &language in languages {
            let path = grammar_path(dir, language);
            if !path.is_file() {
                return Err(DddError::MissingGrammar(language));
            }
            let grammar = Grammar::from_json(&read(&path)?)
                .map_err(|source| DddError::Grammar { path: path.clone(), source })?;
            debug!(ddd = %ddd.name, %language, path = %path.display(), "loaded grammar");
            ddd.grammars.insert(language, grammar);
        }

        Ok(ddd)
    }

    pub fn grammar(&self, language: Language) -> Result<&Grammar, DddError> {
        self.grammars
            .get(&language)
            .ok_or(DddError::MissingGrammar(language))
    }

    pub fn languages(&self) -> Vec<Language> {
        self.grammars.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_ddd(dir: &Path) {
        fs::write(
            dir.join(ONTOLOGY_FILE),
            r#"{"sorts": [{"name": "contact"}], "individuals": {"contact_john": "contact"},
                "actions": ["call"]}"#,
        )
        .unwrap();
        fs::write(
            dir.join(DOMAIN_FILE),
            r#"{"resolve_goals": [{"question": "?X.phone_number(X)"}]}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.join(GRAMMAR_DIR)).unwrap();
        fs::write(
            grammar_path(dir, Language::English),
            r#"{"requests": [{"action": "call", "templates": ["call {sort:contact}"]}],
                "individuals": {"contact_john": ["John"]}}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_ddd_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("phone");
        fs::create_dir(&dir).unwrap();
        write_ddd(&dir);

        let ddd = Ddd::load(&dir).unwrap();
        assert_eq!(ddd.name, "phone");
        assert_eq!(ddd.languages(), vec![Language::English]);
        assert_eq!(ddd.domain.resolve_goal_predicates(), vec!["phone_number"]);
        assert!(ddd.grammar(Language::English).is_ok());
        assert!(matches!(
            ddd.grammar(Language::Swedish),
            Err(DddError::MissingGrammar(Language::Swedish))
        ));
    }

    #[test]
    fn test_missing_requested_grammar() {
        let root = tempfile::tempdir().unwrap();
        write_ddd(root.path());

        assert!(grammar_exists_for_language(root.path(), Language::English));
        assert!(!grammar_exists_for_language(root.path(), Language::Swedish));
        let err = Ddd::load_languages(root.path(), &[Language::Swedish]).unwrap_err();
        assert!(matches!(err, DddError::MissingGrammar(Language::Swedish)));
    }

    #[test]
    fn test_missing_directory() {
        let err = Ddd::load(Path::new("/nonexistent/ddd")).unwrap_err();
        assert!(matches!(err, DddError::NotFound(_)));
    }

    #[test]
    fn test_broken_ontology_names_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join(ONTOLOGY_FILE), "{ not json").unwrap();
        let err = Ddd::load(root.path()).unwrap_err();
        assert!(err.to_string().contains(ONTOLOGY_FILE));
    }
}
