// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every extraction prompt.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Only report skills, achievements and gaps that the resume text supports. \
    If a field cannot be determined, return an empty list or null for it.";
