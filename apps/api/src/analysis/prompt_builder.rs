//! Prompt Builder: composes the evaluation instruction for one candidate.
//!
//! No size limits are enforced here; callers truncate what they store.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, NOT_FOUND, RESUME_TEXT_SECTION, SCHEMA_EVALUATION_ONLY,
    SCHEMA_WITH_CONTACT,
};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{InlineAttachment, LlmRequest};

/// Media type assumed when a data URL does not declare one.
pub const DEFAULT_DOCUMENT_MIME: &str = "application/pdf";

/// What the candidate submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateContent {
    /// Pasted resume text.
    Text(String),
    /// Binary document forwarded to the model as-is.
    Document(InlineAttachment),
}

impl CandidateContent {
    pub fn is_document(&self) -> bool {
        matches!(self, CandidateContent::Document(_))
    }

    /// Wraps raw file bytes as a base64 inline document.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        CandidateContent::Document(InlineAttachment {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        })
    }
}

/// Builds the request for one analysis.
///
/// Text resumes are embedded in the instruction; documents travel as an inline
/// attachment next to it.
pub fn build_prompt(
    position: &str,
    requirements: &str,
    content: &CandidateContent,
    include_contact: bool,
) -> LlmRequest {
    let schema = if include_contact {
        SCHEMA_WITH_CONTACT
    } else {
        SCHEMA_EVALUATION_ONLY
    };

    let mut prompt = fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("{schema}", schema),
            ("{json_only}", JSON_ONLY_INSTRUCTION),
            ("{not_found}", NOT_FOUND),
            ("{position}", position),
            ("{requirements}", requirements),
        ],
    );

    match content {
        CandidateContent::Text(text) => {
            let (head, tail) = RESUME_TEXT_SECTION
                .split_once("{resume_text}")
                .unwrap_or((RESUME_TEXT_SECTION, ""));
            prompt.push_str(head);
            prompt.push_str(text);
            prompt.push_str(tail);
            LlmRequest {
                prompt,
                attachment: None,
            }
        }
        CandidateContent::Document(attachment) => LlmRequest {
            prompt,
            attachment: Some(attachment.clone()),
        },
    }
}

/// Substitutes placeholders in one left-to-right pass over `template`.
/// Substituted values are copied verbatim and never scanned again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Parses a `data:<mime>;base64,<payload>` URL into an inline attachment.
pub fn parse_data_url(data_url: &str) -> Result<InlineAttachment, AppError> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| AppError::Validation("file_data is missing its base64 payload".to_string()))?;

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(AppError::Validation(
            "file_data is missing its base64 payload".to_string(),
        ));
    }
    if STANDARD.decode(payload).is_err() {
        return Err(AppError::Validation(
            "file_data payload is not valid base64".to_string(),
        ));
    }

    let mime_type = header
        .split(';')
        .next()
        .and_then(|scheme| scheme.split_once(':'))
        .map(|(_, mime)| mime.trim())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_MIME);

    Ok(InlineAttachment {
        mime_type: mime_type.to_string(),
        data: payload.to_string(),
    })
}
