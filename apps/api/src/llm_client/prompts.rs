// Shared prompt constants for chat-completion calls.
// Per-language rewrite templates live in humanize::prompts.

/// System instruction for every rewrite call.
pub const HUMANIZER_SYSTEM: &str = "You are a professional multilingual editor specializing in \
    making AI-generated text sound human in various languages. \
    Always output only the rewritten text without any additional comments, explanations, \
    or markdown formatting.";

/// Requirements block appended after the language-specific instruction.
pub const REWRITE_REQUIREMENTS: &str = "\
Requirements:
- Preserve the original meaning and key information
- Enhance clarity, flow, and readability
- Remove AI detection patterns
- Make it sound naturally human-written
- Output only the rewritten text without any additional explanations";
