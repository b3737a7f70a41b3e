// Analysis prompt templates.
// All prompts for the analysis module are defined here.

/// Placeholder the model writes when a contact field is absent from the resume.
pub const NOT_FOUND: &str = "not found";

/// Evaluation prompt. Replace `{position}`, `{requirements}`, `{schema}`,
/// `{json_only}` and `{not_found}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a senior HR specialist. Evaluate the candidate resume provided with this message against the target position and extract the key information.

TARGET POSITION: {position}
POSITION REQUIREMENTS:
{requirements}

Return a JSON object with EXACTLY this structure:
{schema}

RULES:
1. hire_recommendation is "yes" only when the candidate's core skills closely match the position requirements, otherwise "no".
2. highlights: up to 3 short strings naming the strongest matches.
3. risks: up to 3 short strings naming missing skills or career risks. Use an empty list when there are none.
4. {json_only}
5. If a field cannot be found in the resume, fill it with "{not_found}". Never omit a field."#;

/// Requested schema when contact extraction is enabled.
pub const SCHEMA_WITH_CONTACT: &str = r#"{
  "name": "candidate full name",
  "email": "email address",
  "phone": "phone number",
  "hire_recommendation": "yes" | "no",
  "match_reason": "one sentence explaining the recommendation",
  "highlights": ["match highlight 1", "match highlight 2", "match highlight 3"],
  "risks": ["missing skill or career risk 1", "risk 2"]
}"#;

/// Requested schema when only the evaluation is wanted.
pub const SCHEMA_EVALUATION_ONLY: &str = r#"{
  "hire_recommendation": "yes" | "no",
  "match_reason": "one sentence explaining the recommendation",
  "highlights": ["match highlight 1", "match highlight 2", "match highlight 3"],
  "risks": ["missing skill or career risk 1", "risk 2"]
}"#;

/// Appended after the instruction when the resume is pasted text.
pub const RESUME_TEXT_SECTION: &str = "\n\nRESUME TEXT:\n{resume_text}";
