//! Intent Example Generator
//!
//! Expands every grammar template of a DDD into training examples. Each
//! entity slot is filled with the surface forms of its sort (individuals'
//! grammar entries, or builtin samples), the chunks are concatenated and the
//! character span of every filled value is recorded.
//!
//! Generation order:
//!
//! 1. Requests of DDD-specific actions (`<ddd>:action::<action>`)
//! 2. Questions of resolve goals (`<ddd>:question::<predicate>`)
//! 3. Sortal answers and answer negations (`<ddd>:answer`, `<ddd>:answer_negation`)
//! 4. Propositional answers from the grammar (`<ddd>:answer`)

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::samples::{BuiltinSamples, SampleSet, SortNotSupported};
use super::{IntentExample, RasaData, RasaNluData, DATA_FILE};
use crate::ddd::{
    Ddd, DddError, Grammar, Language, OntologyError, RequiredEntity, Sort, Template,
    TemplateError,
};

/// Default root of generated data.
pub const DEFAULT_OUTPUT_DIR: &str = "build_rasa";

/// Above this many raw combinations a capped template is sampled instead of
/// enumerated.
const ENUMERATION_LIMIT: usize = 100_000;

/// Generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    SortNotSupported(#[from] SortNotSupported),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Ddd(#[from] DddError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize training data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Generator thread for '{0}' panicked")]
    WorkerPanicked(String),
}

/// Generator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Cap on examples per template; 0 disables the cap
    pub max_examples_per_template: usize,
    /// Seed for sampling capped templates
    pub seed: u64,
    /// Root directory for `<lang>/rasa_data.json`
    pub output_dir: PathBuf,
    /// Leave out answer negations for string sorts
    pub skip_answer_negation_for_strings: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_examples_per_template: 500,
            seed: 42,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            skip_answer_negation_for_strings: true,
        }
    }
}

pub fn action_intent(ddd_name: &str, action: &str) -> String {
    format!("{}:action::{}", ddd_name, action)
}

pub fn question_intent(ddd_name: &str, predicate: &str) -> String {
    format!("{}:question::{}", ddd_name, predicate)
}

pub fn answer_intent(ddd_name: &str) -> String {
    format!("{}:answer", ddd_name)
}

pub fn answer_negation_intent(ddd_name: &str) -> String {
    format!("{}:answer_negation", ddd_name)
}

/// A value that can fill a slot. `key` identifies the individual (or the
/// literal for builtin samples) so one individual is not used twice in a
/// single example.
#[derive(Debug, Clone)]
struct Candidate {
    key: String,
    surface: String,
}

impl Candidate {
    fn literal(surface: impl Into<String>) -> Self {
        let surface = surface.into();
        Candidate {
            key: surface.clone(),
            surface,
        }
    }
}

/// Candidates and entity label of one template slot.
#[derive(Debug)]
struct SlotValues {
    entity: String,
    sort: String,
    candidates: Vec<Candidate>,
}

/// Generates RASA training data for one language of a DDD.
pub struct IntentGenerator<'a> {
    ddd: &'a Ddd,
    language: Language,
    samples: Box<dyn BuiltinSamples + 'a>,
    config: GeneratorConfig,
}

impl<'a> IntentGenerator<'a> {
    pub fn new(ddd: &'a Ddd, language: Language) -> Self {
        IntentGenerator {
            ddd,
            language,
            samples: Box::new(SampleSet::from_language(language)),
            config: GeneratorConfig::default(),
        }
    }

    /// Replace the builtin sample source.
    pub fn with_samples(mut self, samples: impl BuiltinSamples + 'a) -> Self {
        self.samples = Box::new(samples);
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// `<output_dir>/<lang>/rasa_data.json`
    pub fn output_path(&self) -> PathBuf {
        self.config
            .output_dir
            .join(self.language.code())
            .join(DATA_FILE)
    }

    /// Generate all examples for this language.
    pub fn generate(&self) -> Result<RasaData, GenerateError> {
        let grammar = self.ddd.grammar(self.language)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut examples = Vec::new();

        self.generate_requests(grammar, &mut rng, &mut examples)?;
        self.generate_questions(grammar, &mut rng, &mut examples)?;
        self.generate_sortal_answers(grammar, &mut rng, &mut examples)?;
        self.generate_propositional_answers(grammar, &mut rng, &mut examples)?;

        info!(
            ddd = %self.ddd.name,
            language = %self.language,
            examples = examples.len(),
            "generated training data"
        );

        Ok(RasaData {
            rasa_nlu_data: RasaNluData {
                common_examples: examples,
            },
        })
    }

    /// Generate and write to [`Self::output_path`], creating directories.
    pub fn generate_and_write_to_file(&self) -> Result<PathBuf, GenerateError> {
        let data = self.generate()?;
        let path = self.output_path();
        write_data(&data, &path)?;
        info!(path = %path.display(), "wrote training data");
        Ok(path)
    }

    fn generate_requests(
        &self,
        grammar: &Grammar,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<IntentExample>,
    ) -> Result<(), GenerateError> {
        for action in self.ddd.ontology.ddd_specific_actions() {
            let intent = action_intent(&self.ddd.name, action);
            for request in grammar.requests_of_action(action) {
                self.expand(&request.template, &intent, grammar, rng, out)?;
            }
        }
        Ok(())
    }

    fn generate_questions(
        &self,
        grammar: &Grammar,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<IntentExample>,
    ) -> Result<(), GenerateError> {
        for predicate in self.ddd.domain.resolve_goal_predicates() {
            let intent = question_intent(&self.ddd.name, predicate);
            for question in grammar.questions_of_predicate(predicate) {
                self.expand(&question.template, &intent, grammar, rng, out)?;
            }
        }
        Ok(())
    }

    fn generate_sortal_answers(
        &self,
        grammar: &Grammar,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<IntentExample>,
    ) -> Result<(), GenerateError> {
        let answer = answer_intent(&self.ddd.name);
        let negation = answer_negation_intent(&self.ddd.name);
        let prefix = self.samples.answer_negation_prefix().to_string();

        for sort in self.ddd.ontology.sorts().values() {
            let entity = vec![RequiredEntity::Sortal(sort.name.clone())];

            let template = Template::new(vec![String::new(), String::new()], entity.clone())?;
            self.expand(&template, &answer, grammar, rng, out)?;

            if sort.is_string_sort() && self.config.skip_answer_negation_for_strings {
                debug!(sort = %sort, "no answer negations for string sort");
                continue;
            }
            let template = Template::new(vec![prefix.clone(), String::new()], entity)?;
            self.expand(&template, &negation, grammar, rng, out)?;
        }
        Ok(())
    }

    fn generate_propositional_answers(
        &self,
        grammar: &Grammar,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<IntentExample>,
    ) -> Result<(), GenerateError> {
        let intent = answer_intent(&self.ddd.name);
        for answer in grammar.answers() {
            self.expand(&answer.template, &intent, grammar, rng, out)?;
        }
        Ok(())
    }

    /// Fill every slot combination of `template` and push the examples.
    fn expand(
        &self,
        template: &Template,
        intent: &str,
        grammar: &Grammar,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<IntentExample>,
    ) -> Result<(), GenerateError> {
        let slots = template
            .required_entities()
            .iter()
            .map(|entity| self.slot_values(entity, grammar))
            .collect::<Result<Vec<_>, _>>()?;

        let combinations = self.combinations(&slots, rng);
        debug!(template = %template, intent, examples = combinations.len(), "expanded template");

        for combination in combinations {
            let values: Vec<&str> = slots
                .iter()
                .zip(&combination)
                .map(|(slot, &i)| slot.candidates[i].surface.as_str())
                .collect();
            let interpolation = template.interpolate(&values)?;

            let mut example = IntentExample::new(interpolation.text, intent);
            for ((slot, span), value) in slots.iter().zip(&interpolation.spans).zip(&values) {
                example = example.with_entity(span.start, span.end, *value, slot.entity.as_str());
            }
            out.push(example);
        }
        Ok(())
    }

    fn slot_values(
        &self,
        entity: &RequiredEntity,
        grammar: &Grammar,
    ) -> Result<SlotValues, GenerateError> {
        let ontology = &self.ddd.ontology;
        match entity {
            RequiredEntity::Sortal(sort_name) => {
                let sort = ontology.sort(sort_name)?;
                let entity = if sort.is_string_sort() {
                    "string".to_string()
                } else {
                    format!("sort:{}", sort.name)
                };
                Ok(SlotValues {
                    entity,
                    sort: sort.name.clone(),
                    candidates: self.candidates_of_sort(sort, grammar)?,
                })
            }
            RequiredEntity::Propositional(predicate_name) => {
                let predicate = ontology.predicate(predicate_name)?;
                let sort = ontology.sort(&predicate.sort)?;
                let mut candidates = self.candidates_of_sort(sort, grammar)?;
                if sort.is_string_sort() {
                    candidates.extend(
                        grammar
                            .strings_of_predicate(&predicate.name)
                            .iter()
                            .map(Candidate::literal),
                    );
                }
                Ok(SlotValues {
                    entity: format!("predicate:{}", predicate.name),
                    sort: sort.name.clone(),
                    candidates,
                })
            }
        }
    }

    fn candidates_of_sort(
        &self,
        sort: &Sort,
        grammar: &Grammar,
    ) -> Result<Vec<Candidate>, GenerateError> {
        if sort.is_builtin() {
            let samples = self.samples.builtin_sort_samples(sort)?;
            return Ok(samples.into_iter().map(Candidate::literal).collect());
        }

        let mut candidates = Vec::new();
        for individual in self.ddd.ontology.individuals_of_sort(&sort.name) {
            match grammar.entries_of_individual(individual) {
                Ok(entries) => candidates.extend(entries.iter().map(|entry| Candidate {
                    key: individual.to_string(),
                    surface: entry.clone(),
                })),
                Err(_) => warn!(
                    individual,
                    language = %self.language,
                    "individual has no grammar entries, skipped"
                ),
            }
        }
        Ok(candidates)
    }

    /// Candidate index tuples, one index per slot, in enumeration order.
    fn combinations(&self, slots: &[SlotValues], rng: &mut ChaCha8Rng) -> Vec<Vec<usize>> {
        if slots.iter().any(|slot| slot.candidates.is_empty()) {
            return Vec::new();
        }

        let limit = match self.config.max_examples_per_template {
            0 => {
                return Product::new(slots)
                    .filter(|combination| is_distinct(slots, combination))
                    .collect();
            }
            n => n,
        };
        let total = slots
            .iter()
            .try_fold(1usize, |acc, slot| acc.checked_mul(slot.candidates.len()));

        match total {
            Some(total) if total <= ENUMERATION_LIMIT => {
                let all: Vec<Vec<usize>> = Product::new(slots)
                    .filter(|combination| is_distinct(slots, combination))
                    .collect();
                if all.len() <= limit {
                    return all;
                }
                let mut picked = index::sample(rng, all.len(), limit).into_vec();
                picked.sort_unstable();
                debug!(available = all.len(), kept = limit, "sampled template combinations");
                picked.into_iter().map(|i| all[i].clone()).collect()
            }
            _ => sample_combinations(slots, limit, rng),
        }
    }
}

/// Lazy cartesian product of candidate indices, first slot outermost.
struct Product {
    sizes: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl Product {
    fn new(slots: &[SlotValues]) -> Self {
        let sizes: Vec<usize> = slots.iter().map(|slot| slot.candidates.len()).collect();
        let next = if sizes.contains(&0) {
            None
        } else {
            Some(vec![0; sizes.len()])
        };
        Product { sizes, next }
    }
}

impl Iterator for Product {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for i in (0..following.len()).rev() {
            following[i] += 1;
            if following[i] < self.sizes[i] {
                self.next = Some(following);
                break;
            }
            following[i] = 0;
        }
        Some(current)
    }
}

/// No individual fills two slots of the same sort.
fn is_distinct(slots: &[SlotValues], combination: &[usize]) -> bool {
    for (i, (a, &ai)) in slots.iter().zip(combination).enumerate() {
        for (b, &bi) in slots.iter().zip(combination).skip(i + 1) {
            if a.sort == b.sort && a.candidates[ai].key == b.candidates[bi].key {
                return false;
            }
        }
    }
    true
}

/// Random distinct combinations for products too large to enumerate,
/// returned in enumeration order. Every slot must have at least one
/// candidate.
fn sample_combinations(slots: &[SlotValues], limit: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<usize>> {
    let mut picked = BTreeSet::new();
    let max_attempts = limit.saturating_mul(20);
    let mut attempts = 0;

    while picked.len() < limit && attempts < max_attempts {
        attempts += 1;
        let combination: Vec<usize> = slots
            .iter()
            .map(|slot| rng.gen_range(0..slot.candidates.len()))
            .collect();
        if is_distinct(slots, &combination) {
            picked.insert(combination);
        }
    }
    debug!(kept = picked.len(), attempts, "sampled large template");
    picked.into_iter().collect()
}

/// Write training data as four-space-indented JSON, creating parent
/// directories.
pub fn write_data(data: &RasaData, path: &Path) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = data.to_pretty_json()?;
    fs::write(path, json).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate and write every language in parallel, one thread per language.
pub fn generate_all(
    ddd: &Ddd,
    languages: &[Language],
    config: &GeneratorConfig,
) -> Result<Vec<(Language, PathBuf)>, GenerateError> {
    let joined = crossbeam::scope(|scope| {
        let handles: Vec<_> = languages
            .iter()
            .map(|&language| {
                let handle = scope.spawn(move |_| {
                    IntentGenerator::new(ddd, language)
                        .with_config(config.clone())
                        .generate_and_write_to_file()
                });
                (language, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(language, handle)| match handle.join() {
                Ok(result) => result.map(|path| (language, path)),
                Err(_) => Err(GenerateError::WorkerPanicked(language.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
    });

    joined.map_err(|_| GenerateError::WorkerPanicked("unknown".to_string()))?
}
