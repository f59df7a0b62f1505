//! Generator Integration Tests
//!
//! Loads the `ddds/phone` DDD from disk and checks the generated training
//! data end to end.

use std::fs;
use std::path::PathBuf;

use nlu_datagen::ddd::{validate_ddd, Ddd, Language};
use nlu_datagen::rasa::{generate_all, GeneratorConfig, IntentExample, IntentGenerator, RasaData};

fn phone_ddd_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ddds").join("phone")
}

fn phone_ddd() -> Ddd {
    Ddd::load(&phone_ddd_dir()).expect("Failed to load phone DDD")
}

fn generate(language: Language) -> RasaData {
    let ddd = phone_ddd();
    let data = IntentGenerator::new(&ddd, language)
        .generate()
        .expect("Generation failed");
    data
}

fn find<'a>(data: &'a RasaData, text: &str) -> &'a IntentExample {
    data.common_examples()
        .iter()
        .find(|e| e.text == text)
        .unwrap_or_else(|| panic!("No example with text {:?}", text))
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_phone_ddd_loads_and_validates() {
    let ddd = phone_ddd();
    assert_eq!(ddd.name, "phone");
    assert_eq!(ddd.languages(), vec![Language::English, Language::Swedish]);

    let result = validate_ddd(&ddd);
    assert!(result.is_valid(), "{}", result.summary());
}

// ============================================================================
// Generated examples
// ============================================================================

#[test]
fn test_intent_counts() {
    let stats = generate(Language::English).stats();

    assert_eq!(stats.by_intent["phone:action::call"], 61);
    assert_eq!(stats.by_intent["phone:action::send_message"], 97);
    assert_eq!(stats.by_intent["phone:question::phone_number_of_contact"], 9);
    assert_eq!(stats.by_intent["phone:answer"], 26);
    assert_eq!(stats.by_intent["phone:answer_negation"], 8);
    assert_eq!(stats.total_examples, 201);
}

#[test]
fn test_two_slot_request_offsets() {
    let data = generate(Language::English);
    let example = find(&data, "call John and say hi from Lisa");

    assert_eq!(example.intent, "phone:action::call");
    assert_eq!(example.entities.len(), 2);
    assert_eq!(
        (example.entities[0].start, example.entities[0].end),
        (5, 9)
    );
    assert_eq!(example.entities[0].entity, "sort:contact");
    assert_eq!(
        (example.entities[1].start, example.entities[1].end),
        (26, 30)
    );
    assert_eq!(example.entities[1].entity, "predicate:caller");
    assert_eq!(example.entities[1].value, "Lisa");
}

#[test]
fn test_offsets_count_characters() {
    let data = generate(Language::English);
    let example = find(&data, "call 约翰");

    assert_eq!((example.entities[0].start, example.entities[0].end), (5, 7));
    assert_eq!(example.entities[0].value, "约翰");
}

#[test]
fn test_string_predicate_uses_grammar_strings() {
    let data = generate(Language::English);
    let example = find(&data, "tell Mary that I am running late");

    assert_eq!(example.intent, "phone:action::send_message");
    assert_eq!(example.entities[1].entity, "predicate:message");
    assert_eq!((example.entities[1].start, example.entities[1].end), (15, 32));
}

#[test]
fn test_answers_and_negations() {
    let data = generate(Language::English);

    let answer = find(&data, "Elizabeth");
    assert_eq!(answer.intent, "phone:answer");
    assert_eq!(answer.entities[0].entity, "sort:contact");

    let negation = find(&data, "not Elizabeth");
    assert_eq!(negation.intent, "phone:answer_negation");
    assert_eq!((negation.entities[0].start, negation.entities[0].end), (4, 13));

    // string answers carry the bare "string" entity and have no negation
    let strings: Vec<_> = data
        .examples_of_intent("phone:answer")
        .filter(|e| e.entities.iter().any(|s| s.entity == "string"))
        .collect();
    assert_eq!(strings.len(), 10);
    assert!(data
        .examples_of_intent("phone:answer_negation")
        .all(|e| e.entities[0].entity == "sort:contact"));
}

#[test]
fn test_swedish_negation_prefix() {
    let data = generate(Language::Swedish);
    let negation = find(&data, "inte Elisabet");

    assert_eq!(negation.intent, "phone:answer_negation");
    assert_eq!((negation.entities[0].start, negation.entities[0].end), (5, 13));
}

#[test]
fn test_generation_is_deterministic() {
    let ddd = phone_ddd();
    let config = GeneratorConfig {
        max_examples_per_template: 20,
        ..GeneratorConfig::default()
    };
    let run = || {
        IntentGenerator::new(&ddd, Language::English)
            .with_config(config.clone())
            .generate()
            .unwrap()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first.examples_of_intent("phone:action::send_message").count(), 21);
}

// ============================================================================
// Output files
// ============================================================================

#[test]
fn test_generate_all_writes_every_language() {
    let out = tempfile::tempdir().unwrap();
    let ddd = phone_ddd();
    let config = GeneratorConfig {
        output_dir: out.path().join("build_rasa"),
        ..GeneratorConfig::default()
    };

    let written = generate_all(&ddd, &ddd.languages(), &config).unwrap();
    assert_eq!(written.len(), 2);

    let english = out.path().join("build_rasa").join("eng").join("rasa_data.json");
    let content = fs::read_to_string(&english).unwrap();
    assert!(content.starts_with("{\n    \"rasa_nlu_data\": {\n        \"common_examples\": ["));

    let parsed: RasaData = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, generate(Language::English));
    assert!(out.path().join("build_rasa").join("sv").join("rasa_data.json").is_file());
}
