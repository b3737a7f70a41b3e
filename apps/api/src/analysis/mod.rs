// Resume analysis: prompt building, the inference call, reply extraction and
// the two-phase job write.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
pub mod result;
