use super::*;
use crate::BestiaryError;

struct EchoProvider;

impl GenerationProvider for EchoProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        Ok(format!("ECHO: {prompt}"))
    }
}

struct FailingProvider;

impl GenerationProvider for FailingProvider {
    fn generate(&self, _prompt: &str) -> Result<String> {
        Err(BestiaryError::GenerationFailed("boom".to_string()))
    }
}

#[test]
fn prompt_contains_context_in_order_and_verbatim_question() {
    let context = vec![
        "The creature Bulbasaur is a grass and poison type.".to_string(),
        "The creature Charmander is a fire type.".to_string(),
    ];
    let prompt = build_prompt("Which creature is a fire type?", &context);

    let bulbasaur_pos = prompt
        .find("Bulbasaur")
        .expect("first document should appear");
    let charmander_pos = prompt
        .find("Charmander")
        .expect("second document should appear");
    assert!(bulbasaur_pos < charmander_pos);

    assert!(prompt.contains("based *only* on the provided context"));
    assert!(prompt.contains("Question: Which creature is a fire type?"));
}

#[test]
fn prompt_tolerates_empty_context() {
    let prompt = build_prompt("Anything there?", &[]);

    assert!(prompt.contains("---\n\n---"));
    assert!(prompt.contains("Question: Anything there?"));
}

#[test]
fn answer_forwards_prompt_to_provider() {
    let context = vec!["some context".to_string()];
    let result = answer(&EchoProvider, "a question", &context).expect("should answer");

    assert!(result.starts_with("ECHO: "));
    assert!(result.contains("some context"));
    assert!(result.contains("Question: a question"));
}

#[test]
fn answer_with_empty_context_still_calls_provider() {
    let result = answer(&EchoProvider, "a question", &[]).expect("should answer");
    assert!(result.contains("Question: a question"));
}

#[test]
fn provider_failure_propagates() {
    let result = answer(&FailingProvider, "a question", &[]);
    assert!(matches!(result, Err(BestiaryError::GenerationFailed(_))));
}
