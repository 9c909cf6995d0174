//! User-selectable rewrite options and their fallbacks.
//!
//! Parsing never fails: unknown models, languages and intensities resolve to
//! the documented defaults so a stale form can still be processed.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifier and human-readable name of a selectable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionInfo {
    pub id: &'static str,
    pub name: &'static str,
}

/// Supported model identifiers, as accepted by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "meta-llama/llama-3.1-8b-instruct")]
    Llama31_8b,
    #[serde(rename = "meta-llama/llama-3.1-70b-instruct")]
    Llama31_70b,
    #[serde(rename = "anthropic/claude-3.5-sonnet")]
    Claude35Sonnet,
    #[serde(rename = "mistralai/mistral-7b-instruct")]
    Mistral7b,
    #[serde(rename = "openai/gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ModelId {
    pub const ALL: [ModelId; 5] = [
        ModelId::Llama31_8b,
        ModelId::Llama31_70b,
        ModelId::Claude35Sonnet,
        ModelId::Mistral7b,
        ModelId::Gpt35Turbo,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ModelId::Llama31_8b => "meta-llama/llama-3.1-8b-instruct",
            ModelId::Llama31_70b => "meta-llama/llama-3.1-70b-instruct",
            ModelId::Claude35Sonnet => "anthropic/claude-3.5-sonnet",
            ModelId::Mistral7b => "mistralai/mistral-7b-instruct",
            ModelId::Gpt35Turbo => "openai/gpt-3.5-turbo",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::Llama31_8b => "LLaMA 3.1 8B (Fast & Reliable)",
            ModelId::Llama31_70b => "LLaMA 3.1 70B (High Quality)",
            ModelId::Claude35Sonnet => "Claude 3.5 Sonnet (Premium)",
            ModelId::Mistral7b => "Mistral 7B (Fast)",
            ModelId::Gpt35Turbo => "GPT-3.5 Turbo (Balanced)",
        }
    }

    pub fn info(self) -> OptionInfo {
        OptionInfo {
            id: self.id(),
            name: self.display_name(),
        }
    }

    /// Exact-match lookup; unknown ids fall back to the default model.
    pub fn resolve(raw: &str) -> ModelId {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.id() == raw)
            .unwrap_or_else(|| {
                debug!("Unknown model '{raw}', using {}", ModelId::default().id());
                ModelId::default()
            })
    }
}

/// Target language of the rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Dutch,
    Russian,
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Dutch,
        Language::Russian,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Hindi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::German => "german",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
            Language::Dutch => "dutch",
            Language::Russian => "russian",
            Language::Chinese => "chinese",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Arabic => "arabic",
            Language::Hindi => "hindi",
        }
    }

    /// Name of the language in that language.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
            Language::French => "Français",
            Language::German => "Deutsch",
            Language::Italian => "Italiano",
            Language::Portuguese => "Português",
            Language::Dutch => "Nederlands",
            Language::Russian => "Русский",
            Language::Chinese => "中文",
            Language::Japanese => "日本語",
            Language::Korean => "한국어",
            Language::Arabic => "العربية",
            Language::Hindi => "हिन्दी",
        }
    }

    pub fn info(self) -> OptionInfo {
        OptionInfo {
            id: self.code(),
            name: self.native_name(),
        }
    }

    /// Case-insensitive lookup; unknown codes fall back to English.
    pub fn resolve(raw: &str) -> Language {
        let code = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .unwrap_or_else(|| {
                debug!("Unknown language '{raw}', using english");
                Language::default()
            })
    }
}

/// How aggressively the text is rewritten. Drives the sampling temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    #[default]
    Medium,
    Strong,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Light, Intensity::Medium, Intensity::Strong];

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Medium => "medium",
            Intensity::Strong => "strong",
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            Intensity::Light => 0.7,
            Intensity::Medium => 0.9,
            Intensity::Strong => 1.2,
        }
    }

    /// Case-insensitive lookup; unknown values fall back to medium.
    pub fn resolve(raw: &str) -> Intensity {
        let value = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == value)
            .unwrap_or_default()
    }
}

pub const DEFAULT_TONE: &str = "Professional";

/// Tones offered by the form. Any other non-empty tone is passed through as typed.
pub const SUGGESTED_TONES: &[&str] = &[
    "Professional",
    "Casual",
    "Friendly",
    "Academic",
    "Creative",
    "Persuasive",
];

/// Options chosen for one rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteOptions {
    pub tone: String,
    pub intensity: Intensity,
    pub language: Language,
    pub model: ModelId,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            tone: DEFAULT_TONE.to_string(),
            intensity: Intensity::default(),
            language: Language::default(),
            model: ModelId::default(),
        }
    }
}

impl RewriteOptions {
    /// Builds options from raw form values, applying every fallback.
    pub fn from_raw(
        tone: Option<&str>,
        intensity: Option<&str>,
        model: Option<&str>,
        language: Option<&str>,
    ) -> Self {
        let tone = tone
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TONE)
            .to_string();

        Self {
            tone,
            intensity: intensity.map(Intensity::resolve).unwrap_or_default(),
            language: language.map(Language::resolve).unwrap_or_default(),
            model: model.map(ModelId::resolve).unwrap_or_default(),
        }
    }
}
