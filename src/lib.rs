//! nlu-datagen - NLU Training Data Generator
//!
//! Generates intent-classification and entity-extraction training examples
//! from a Dialogue Domain Description (DDD). Every grammar template is
//! expanded with the surface forms of the values that can fill its entity
//! slots, and each example records the intent label and the character spans
//! of its entities.
//!
//! # Example
//!
//! ```rust
//! use nlu_datagen::ddd::{Ddd, Domain, Grammar, Language, Ontology, Request, Sort, Template};
//! use nlu_datagen::rasa::IntentGenerator;
//!
//! let ontology = Ontology::new()
//!     .with_sort(Sort::custom("contact"))
//!     .with_individual("contact_john", "contact")
//!     .with_action("call");
//! let grammar = Grammar::new()
//!     .with_individual("contact_john", ["John"])
//!     .with_request(Request::new("call", Template::parse("call {sort:contact}").unwrap()));
//! let ddd = Ddd::new("phone", ontology, Domain::default())
//!     .with_grammar(Language::English, grammar);
//!
//! let data = IntentGenerator::new(&ddd, Language::English).generate().unwrap();
//! let call = data.examples_of_intent("phone:action::call").next().unwrap();
//! assert_eq!(call.text, "call John");
//! assert_eq!((call.entities[0].start, call.entities[0].end), (5, 9));
//! ```
//!
//! # Modules
//!
//! - [`ddd`]: ontology, domain, grammar templates, loading and validation
//! - [`rasa`]: example generation and the RASA NLU output format
//! - [`config`]: `nlu-datagen.toml` project settings

pub mod config;
pub mod ddd;
pub mod rasa;

pub use config::{ConfigError, DatagenConfig};
pub use ddd::{Ddd, DddError, Language};
pub use rasa::{generate_all, GenerateError, GeneratorConfig, IntentGenerator, RasaData};
