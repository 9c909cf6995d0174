//! Humanization — rewrite options, per-language prompts and the rewrite call.
//!
//! The system prompt and shared requirement list live in `llm_client::prompts`;
//! this module only decides what to ask for.

pub mod options;
pub mod prompts;
pub mod rewriter;

pub use options::{Intensity, Language, ModelId, RewriteOptions};
pub use rewriter::Rewriter;
