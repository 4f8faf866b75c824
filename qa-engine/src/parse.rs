//! Sanitize and parse the model's JSON-mode output.

use tracing::warn;

use crate::errors::EngineError;
use crate::prompt::REFUSAL_FALLBACK;
use crate::types::GeneratedAnswer;

/// Remove any markdown fences and pre/post-text; extract the first JSON object.
/// This is deliberately tolerant: we accept `{...}` anywhere in the string.
pub fn sanitize_json_block(s: &str) -> String {
    let no_fence = s
        .replace("```json", "")
        .replace("```", "")
        .replace('\u{feff}', "") // BOM
        .trim()
        .to_string();

    // Try to find the first '{' and the matching last '}'.
    if let (Some(start), Some(end)) = (no_fence.find('{'), no_fence.rfind('}')) {
        let candidate = &no_fence[start..=end];
        if candidate.contains(':') {
            return candidate.to_string();
        }
    }
    // Fallback: return as-is; the strict parse will report the failure.
    no_fence
}

/// Parses raw model output into a [`GeneratedAnswer`].
///
/// Missing fields or invalid JSON are a [`EngineError::GenerationParse`],
/// never coerced into a default. The single allowed repair: a refusal
/// (`puede_responder = false`) with an empty message gets the fixed polite
/// fallback text.
pub fn parse_generated(raw: &str) -> Result<GeneratedAnswer, EngineError> {
    let cleaned = sanitize_json_block(raw);
    let mut answer: GeneratedAnswer = serde_json::from_str(&cleaned).map_err(|e| {
        warn!("Model output failed schema parse: {e}");
        EngineError::GenerationParse(format!("{e}; output: {}", truncate(&cleaned, 200)))
    })?;

    if !answer.puede_responder && answer.respuesta.trim().is_empty() {
        answer.respuesta = REFUSAL_FALLBACK.to_string();
    }
    Ok(answer)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
