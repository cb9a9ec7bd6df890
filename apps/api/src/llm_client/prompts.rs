// Shared prompt fragments. Each component that calls the model keeps its own
// prompts.rs next to it; only cross-cutting text lives here.

/// System prompt suffix that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction against invented content in suggestion fields.
pub const NO_FABRICATION_INSTRUCTION: &str = "If you do not have a good suggestion for a field, \
    answer with the exact text \"No suggestions\" for that field. Do not make anything up.";

/// The literal value the model uses to say a field has nothing to offer.
pub const NO_SUGGESTIONS: &str = "No suggestions";
