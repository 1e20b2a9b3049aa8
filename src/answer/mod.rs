// Answer generation
// Builds the grounded prompt from retrieved documents and forwards it to a
// generative model behind the `GenerationProvider` seam.

#[cfg(test)]
mod tests;

pub mod gemini;

pub use gemini::GeminiClient;

use crate::Result;

/// A model that turns a prompt into a text completion.
pub trait GenerationProvider {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Assemble the final prompt: fixed framing, newline-joined context in
/// retrieval order, then the verbatim question.
///
/// "Answer only from the context" is an instruction to the model, not an
/// enforced guarantee. An empty context list still yields a valid prompt.
#[inline]
pub fn build_prompt(question: &str, context: &[String]) -> String {
    let context_str = context.join("\n");

    format!(
        "You are a helpful creature compendium expert. Your task is to answer the \
         user's question based *only* on the provided context.\n\
         \n\
         Here is the context retrieved from the database:\n\
         ---\n\
         {context_str}\n\
         ---\n\
         \n\
         Based on this context, please answer the following question:\n\
         Question: {question}\n"
    )
}

/// Retrieve-then-generate tail of the pipeline: one prompt, one completion.
#[inline]
pub fn answer<G: GenerationProvider>(
    provider: &G,
    question: &str,
    context: &[String],
) -> Result<String> {
    provider.generate(&build_prompt(question, context))
}
