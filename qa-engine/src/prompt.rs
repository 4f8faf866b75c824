//! Prompt composition for the answering model.
//!
//! Both builders are pure string functions: identical input produces
//! byte-identical output, so the prompts are golden-testable without any
//! network collaborator.

use qa_store::SearchResult;

/// Shown to the user when the model refuses but sends an empty message.
pub const REFUSAL_FALLBACK: &str =
    "Lo siento, no dispongo de información suficiente para responder a tu consulta. \
     ¿Puedo ayudarte con algo más?";

/// Marker inserted when retrieval produced no evidence at all.
const NO_DOCUMENTS_MARKER: &str =
    "No se encontraron documentos relevantes para esta consulta.";

/// System prompt: role, grounding rules and the mandatory JSON schema.
pub fn system_prompt(extra_instructions: Option<&str>) -> String {
    let mut out = String::from(
        "Eres un asistente de atención al cliente. Respondes únicamente con la \
         información contenida en los documentos de referencia que se te \
         proporcionan; nunca inventas datos ni usas conocimiento externo.\n\
         \n\
         Debes responder SIEMPRE con un objeto JSON con exactamente estos dos \
         campos:\n\
         - \"puede_responder\": booleano. true solo si los documentos contienen \
         la información necesaria para responder la consulta.\n\
         - \"respuesta\": texto. La respuesta al usuario si puede_responder es \
         true; si es false, un mensaje breve y cortés indicando que no dispones \
         de esa información.\n\
         \n\
         No incluyas ningún otro campo ni texto fuera del objeto JSON.",
    );
    if let Some(extra) = extra_instructions {
        out.push_str("\n\nInstrucciones adicionales:\n");
        out.push_str(extra);
    }
    out
}

/// User prompt: the query, numbered evidence blocks and optional context.
pub fn generation_prompt(
    consulta: &str,
    results: &[SearchResult],
    contexto_previo: Option<&str>,
    contexto_actual: Option<&str>,
) -> String {
    let mut out = String::from("Consulta del usuario:\n");
    out.push_str(consulta.trim());
    out.push_str("\n\nDocumentos de referencia:\n");

    if results.is_empty() {
        out.push_str(NO_DOCUMENTS_MARKER);
        out.push('\n');
    } else {
        for (i, res) in results.iter().enumerate() {
            out.push_str(&format!(
                "Documento {}:\nPregunta: {}\nRespuesta: {}\n\n",
                i + 1,
                res.pregunta,
                res.respuesta
            ));
        }
    }

    if let Some(previo) = contexto_previo {
        out.push_str("\nContexto de conversaciones previas:\n");
        out.push_str(previo);
        out.push('\n');
    }
    if let Some(actual) = contexto_actual {
        out.push_str("\nContexto de la conversación actual:\n");
        out.push_str(actual);
        out.push('\n');
    }

    out.push_str(
        "\nResponde a la consulta usando exclusivamente los documentos de \
         referencia, en el formato JSON indicado.",
    );
    out
}
