//! DDD Validator
//!
//! Checks that grammars only reference sorts, predicates, actions and
//! individuals the ontology declares, before any training data is generated.
//! Users run: `nlu-datagen validate --ddd ddds/phone`

use std::collections::BTreeSet;
use std::path::Path;

use super::grammar::{Grammar, Language};
use super::ontology::{Ontology, Sort};
use super::template::RequiredEntity;
use super::{Ddd, DddError};

/// Validation result
#[derive(Debug)]
pub struct ValidationResult {
    /// DDD name
    pub ddd_name: String,
    /// Errors found (generation would fail or produce wrong labels)
    pub errors: Vec<ValidationError>,
    /// Warnings (generation works but coverage is incomplete)
    pub warnings: Vec<ValidationWarning>,
    pub stats: DddStats,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut s = format!("DDD '{}': ", self.ddd_name);
        if self.is_valid() {
            s.push_str("VALID");
        } else {
            s.push_str("INVALID");
        }
        s.push_str(&format!(
            " ({} sorts, {} predicates, {} individuals, {} templates)",
            self.stats.sort_count,
            self.stats.predicate_count,
            self.stats.individual_count,
            self.stats.template_count
        ));
        if !self.errors.is_empty() {
            s.push_str(&format!(", {} errors", self.errors.len()));
        }
        if !self.warnings.is_empty() {
            s.push_str(&format!(", {} warnings", self.warnings.len()));
        }
        s
    }
}

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Grammar has requests for an action the ontology does not declare
    UndeclaredAction { language: Language, action: String },
    /// Grammar has questions about an undeclared predicate
    UndeclaredQuestionPredicate {
        language: Language,
        predicate: String,
    },
    /// Template slot names an unknown sort or predicate
    UnknownEntity {
        language: Language,
        entity: RequiredEntity,
    },
    /// Grammar names an individual the ontology lacks
    UnknownIndividual {
        language: Language,
        individual: String,
    },
    /// Individual declared with an unknown sort
    IndividualOfUnknownSort { individual: String, sort: String },
    /// Predicate declared with an unknown sort
    PredicateOfUnknownSort { predicate: String, sort: String },
    /// Resolve goal about an undeclared predicate
    UndeclaredGoalPredicate(String),
    /// Builtin sort without sample values, declared or used by a slot
    UnsupportedBuiltinSort(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UndeclaredAction { language, action } => {
                write!(f, "[{}] Requests for undeclared action '{}'", language, action)
            }
            ValidationError::UndeclaredQuestionPredicate {
                language,
                predicate,
            } => {
                write!(
                    f,
                    "[{}] Questions for undeclared predicate '{}'",
                    language, predicate
                )
            }
            ValidationError::UnknownEntity { language, entity } => {
                write!(f, "[{}] Template slot {} is not declared", language, entity)
            }
            ValidationError::UnknownIndividual {
                language,
                individual,
            } => {
                write!(
                    f,
                    "[{}] Grammar entries for undeclared individual '{}'",
                    language, individual
                )
            }
            ValidationError::IndividualOfUnknownSort { individual, sort } => {
                write!(
                    f,
                    "Individual '{}' has undeclared sort '{}'",
                    individual, sort
                )
            }
            ValidationError::PredicateOfUnknownSort { predicate, sort } => {
                write!(f, "Predicate '{}' has undeclared sort '{}'", predicate, sort)
            }
            ValidationError::UndeclaredGoalPredicate(predicate) => {
                write!(f, "Resolve goal asks about undeclared predicate '{}'", predicate)
            }
            ValidationError::UnsupportedBuiltinSort(sort) => {
                write!(f, "Builtin sort '{}' cannot be used for training data", sort)
            }
        }
    }
}

/// Validation warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Individual has no surface forms and is left out of the data
    IndividualWithoutEntries {
        language: Language,
        individual: String,
    },
    /// Declared action has no request templates
    ActionWithoutRequests { language: Language, action: String },
    /// Resolve-goal predicate has no question templates
    GoalWithoutQuestions {
        language: Language,
        predicate: String,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::IndividualWithoutEntries {
                language,
                individual,
            } => {
                write!(f, "[{}] Individual '{}' has no grammar entries", language, individual)
            }
            ValidationWarning::ActionWithoutRequests { language, action } => {
                write!(f, "[{}] Action '{}' has no request templates", language, action)
            }
            ValidationWarning::GoalWithoutQuestions {
                language,
                predicate,
            } => {
                write!(
                    f,
                    "[{}] Resolve goal '{}' has no question templates",
                    language, predicate
                )
            }
        }
    }
}

/// Statistics about the DDD
#[derive(Debug, Default)]
pub struct DddStats {
    pub sort_count: usize,
    pub predicate_count: usize,
    pub individual_count: usize,
    pub action_count: usize,
    pub language_count: usize,
    pub template_count: usize,
}

/// Validate a loaded DDD
pub fn validate_ddd(ddd: &Ddd) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let ontology = &ddd.ontology;

    let stats = DddStats {
        sort_count: ontology.sorts().len(),
        predicate_count: ontology.predicates().len(),
        individual_count: ontology.individuals().len(),
        action_count: ontology.ddd_specific_actions().len(),
        language_count: ddd.grammars.len(),
        template_count: ddd.grammars.values().map(|g| g.templates().count()).sum(),
    };

    check_ontology(ontology, &mut errors);

    for predicate in ddd.domain.resolve_goal_predicates() {
        if ontology.predicate(predicate).is_err() {
            errors.push(ValidationError::UndeclaredGoalPredicate(
                predicate.to_string(),
            ));
        }
    }

    for (&language, grammar) in &ddd.grammars {
        check_grammar(ddd, language, grammar, &mut errors, &mut warnings);
    }

    ValidationResult {
        ddd_name: ddd.name.clone(),
        errors,
        warnings,
        stats,
    }
}

/// Load and validate a DDD directory
pub fn validate_ddd_dir(path: &Path) -> Result<ValidationResult, DddError> {
    let ddd = Ddd::load(path)?;
    Ok(validate_ddd(&ddd))
}

/// Real, boolean and domain sorts have no sample values.
fn is_unsupported_builtin(sort: &Sort) -> bool {
    sort.is_real_sort() || sort.is_boolean_sort() || sort.is_domain_sort()
}

fn report_unsupported(sort: &Sort, errors: &mut Vec<ValidationError>) {
    let error = ValidationError::UnsupportedBuiltinSort(sort.name.clone());
    if is_unsupported_builtin(sort) && !errors.contains(&error) {
        errors.push(error);
    }
}

fn check_ontology(ontology: &Ontology, errors: &mut Vec<ValidationError>) {
    for (individual, sort) in ontology.individuals() {
        if !ontology.has_sort(sort) {
            errors.push(ValidationError::IndividualOfUnknownSort {
                individual: individual.clone(),
                sort: sort.clone(),
            });
        }
    }

    for predicate in ontology.predicates().values() {
        if !ontology.has_sort(&predicate.sort) {
            errors.push(ValidationError::PredicateOfUnknownSort {
                predicate: predicate.name.clone(),
                sort: predicate.sort.clone(),
            });
        }
    }

    for sort in ontology.sorts().values() {
        report_unsupported(sort, errors);
    }
}

fn check_grammar(
    ddd: &Ddd,
    language: Language,
    grammar: &Grammar,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let ontology = &ddd.ontology;
    let actions = ontology.ddd_specific_actions();

    let requested: BTreeSet<&str> = grammar.requests().iter().map(|r| r.action.as_str()).collect();
    for action in &requested {
        if !actions.contains(*action) {
            errors.push(ValidationError::UndeclaredAction {
                language,
                action: action.to_string(),
            });
        }
    }
    for action in actions {
        if !requested.contains(action.as_str()) {
            warnings.push(ValidationWarning::ActionWithoutRequests {
                language,
                action: action.clone(),
            });
        }
    }

    let asked: BTreeSet<&str> = grammar
        .questions()
        .iter()
        .map(|q| q.predicate.as_str())
        .collect();
    for predicate in &asked {
        if ontology.predicate(predicate).is_err() {
            errors.push(ValidationError::UndeclaredQuestionPredicate {
                language,
                predicate: predicate.to_string(),
            });
        }
    }
    for predicate in ddd.domain.resolve_goal_predicates() {
        if !asked.contains(predicate) {
            warnings.push(ValidationWarning::GoalWithoutQuestions {
                language,
                predicate: predicate.to_string(),
            });
        }
    }

    let mut reported = BTreeSet::new();
    for entity in grammar.required_entities() {
        let known = match entity {
            RequiredEntity::Sortal(sort) => ontology.has_sort(sort),
            RequiredEntity::Propositional(predicate) => ontology.predicate(predicate).is_ok(),
        };
        if !known && reported.insert(entity.clone()) {
            errors.push(ValidationError::UnknownEntity {
                language,
                entity: entity.clone(),
            });
        }

        // builtins resolve without being declared
        let sort = match entity {
            RequiredEntity::Sortal(sort) => ontology.sort(sort),
            RequiredEntity::Propositional(predicate) => ontology.predicate_sort(predicate),
        };
        if let Ok(sort) = sort {
            report_unsupported(sort, errors);
        }
    }

    for individual in grammar.individuals().keys() {
        if ontology.individual_sort(individual).is_err() {
            errors.push(ValidationError::UnknownIndividual {
                language,
                individual: individual.clone(),
            });
        }
    }
    for individual in ontology.individuals().keys() {
        let has_entries = grammar
            .entries_of_individual(individual)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false);
        if !has_entries {
            warnings.push(ValidationWarning::IndividualWithoutEntries {
                language,
                individual: individual.clone(),
            });
        }
    }
}
