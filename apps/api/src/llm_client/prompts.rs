// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Instruction appended to every prompt that expects a structured reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences (such as ```json). \
    Do NOT include explanations or apologies.";
