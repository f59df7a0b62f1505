//! Ontology Model
//!
//! Sorts (types), predicates, individuals and actions of a dialogue domain.
//!
//! The on-disk format (`ontology.json`):
//!
//! ```json
//! {
//!   "sorts": [{"name": "contact"}, {"name": "message", "kind": "string"}],
//!   "predicates": [{"name": "selected_contact", "sort": "contact"}],
//!   "individuals": {"contact_john": "contact"},
//!   "actions": ["call"]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ontology lookup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OntologyError {
    #[error("Unknown sort '{0}'")]
    UnknownSort(String),

    #[error("Unknown predicate '{0}'")]
    UnknownPredicate(String),

    #[error("Unknown individual '{0}'")]
    UnknownIndividual(String),
}

/// Kind of a sort. Everything except `Custom` is builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Sort whose values are the individuals declared in the ontology
    Custom,
    Integer,
    Real,
    String,
    #[serde(rename = "datetime")]
    DateTime,
    Boolean,
    Domain,
}

impl SortKind {
    /// Builtin kind for a reserved sort name.
    pub fn builtin_for_name(name: &str) -> Option<SortKind> {
        match name {
            "integer" => Some(SortKind::Integer),
            "real" => Some(SortKind::Real),
            "string" => Some(SortKind::String),
            "datetime" => Some(SortKind::DateTime),
            "boolean" => Some(SortKind::Boolean),
            "domain" => Some(SortKind::Domain),
            _ => None,
        }
    }
}

/// A sort (type) in the ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub name: String,
    pub kind: SortKind,
}

impl Sort {
    pub fn new(name: impl Into<String>, kind: SortKind) -> Self {
        Sort {
            name: name.into(),
            kind,
        }
    }

    /// A custom sort populated by individuals.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, SortKind::Custom)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        self.kind != SortKind::Custom
    }

    pub fn is_integer_sort(&self) -> bool {
        self.kind == SortKind::Integer
    }

    pub fn is_real_sort(&self) -> bool {
        self.kind == SortKind::Real
    }

    pub fn is_string_sort(&self) -> bool {
        self.kind == SortKind::String
    }

    pub fn is_datetime_sort(&self) -> bool {
        self.kind == SortKind::DateTime
    }

    pub fn is_boolean_sort(&self) -> bool {
        self.kind == SortKind::Boolean
    }

    pub fn is_domain_sort(&self) -> bool {
        self.kind == SortKind::Domain
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

static BUILTIN_SORTS: Lazy<BTreeMap<String, Sort>> = Lazy::new(|| {
    ["integer", "real", "string", "datetime", "boolean", "domain"]
        .iter()
        .filter_map(|name| SortKind::builtin_for_name(name).map(|kind| Sort::new(*name, kind)))
        .map(|sort| (sort.name.clone(), sort))
        .collect()
});

/// A predicate and the sort of its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub sort: String,
}

impl Predicate {
    pub fn new(name: impl Into<String>, sort: impl Into<String>) -> Self {
        Predicate {
            name: name.into(),
            sort: sort.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Deserialize)]
struct SortDecl {
    name: String,
    #[serde(default)]
    kind: Option<SortKind>,
}

#[derive(Debug, Deserialize)]
struct OntologyFile {
    #[serde(default)]
    sorts: Vec<SortDecl>,
    #[serde(default)]
    predicates: Vec<Predicate>,
    #[serde(default)]
    individuals: BTreeMap<String, String>,
    #[serde(default)]
    actions: BTreeSet<String>,
}

/// Sorts, predicates, individuals and actions of a DDD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ontology {
    sorts: BTreeMap<String, Sort>,
    predicates: BTreeMap<String, Predicate>,
    individuals: BTreeMap<String, String>,
    actions: BTreeSet<String>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an ontology from its JSON representation.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: OntologyFile = serde_json::from_str(content)?;

        let mut ontology = Ontology::new();
        for decl in file.sorts {
            let kind = decl
                .kind
                .or_else(|| SortKind::builtin_for_name(&decl.name))
                .unwrap_or(SortKind::Custom);
            ontology = ontology.with_sort(Sort::new(decl.name, kind));
        }
        for predicate in file.predicates {
            ontology = ontology.with_predicate(predicate);
        }
        for (individual, sort) in file.individuals {
            ontology = ontology.with_individual(individual, sort);
        }
        for action in file.actions {
            ontology = ontology.with_action(action);
        }
        Ok(ontology)
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.insert(sort.name.clone(), sort);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.insert(predicate.name.clone(), predicate);
        self
    }

    pub fn with_individual(mut self, individual: impl Into<String>, sort: impl Into<String>) -> Self {
        self.individuals.insert(individual.into(), sort.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.insert(action.into());
        self
    }

    /// Declared sorts, keyed by name.
    pub fn sorts(&self) -> &BTreeMap<String, Sort> {
        &self.sorts
    }

    /// Look up a sort. Builtin sorts resolve even when undeclared.
    pub fn sort(&self, name: &str) -> Result<&Sort, OntologyError> {
        self.sorts
            .get(name)
            .or_else(|| BUILTIN_SORTS.get(name))
            .ok_or_else(|| OntologyError::UnknownSort(name.to_string()))
    }

    pub fn has_sort(&self, name: &str) -> bool {
        self.sort(name).is_ok()
    }

    pub fn predicates(&self) -> &BTreeMap<String, Predicate> {
        &self.predicates
    }

    pub fn predicate(&self, name: &str) -> Result<&Predicate, OntologyError> {
        self.predicates
            .get(name)
            .ok_or_else(|| OntologyError::UnknownPredicate(name.to_string()))
    }

    /// Sort of a predicate's answers.
    pub fn predicate_sort(&self, name: &str) -> Result<&Sort, OntologyError> {
        let predicate = self.predicate(name)?;
        self.sort(&predicate.sort)
    }

    /// Individuals of a sort, ordered by name.
    pub fn individuals_of_sort(&self, sort: &str) -> Vec<&str> {
        self.individuals
            .iter()
            .filter(|(_, s)| s.as_str() == sort)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn individuals(&self) -> &BTreeMap<String, String> {
        &self.individuals
    }

    pub fn individual_sort(&self, individual: &str) -> Result<&Sort, OntologyError> {
        let sort = self
            .individuals
            .get(individual)
            .ok_or_else(|| OntologyError::UnknownIndividual(individual.to_string()))?;
        self.sort(sort)
    }

    /// Actions declared by this DDD (builtin dialogue actions excluded).
    pub fn ddd_specific_actions(&self) -> &BTreeSet<String> {
        &self.actions
    }
}
