// Per-language rewrite instructions.
// Replace `{tone}` and `{intensity}` before sending.

use crate::humanize::options::Language;
use crate::llm_client::prompts::REWRITE_REQUIREMENTS;

/// Instruction template for each supported language.
pub fn language_template(language: Language) -> &'static str {
    match language {
        Language::English => "Rewrite the following text in English to sound naturally human-written \
            with a {tone} tone and {intensity} humanization intensity.",
        Language::Spanish => "Reescribe el siguiente texto en español para que suene naturalmente humano \
            con un tono {tone} e intensidad de humanización {intensity}.",
        Language::French => "Reformulez le texte suivant en français pour qu'il semble naturellement humain \
            avec un ton {tone} et une intensité d'humanisation {intensity}.",
        Language::German => "Schreibe den folgenden Text auf Deutsch so um, dass er natürlich und menschlich \
            klingt, mit einem {tone} Ton und einer Humanisierungsintensität von {intensity}.",
        Language::Italian => "Riscrivi il seguente testo in italiano in modo che sembri scritto \
            naturalmente da una persona, con un tono {tone} e un'intensità di umanizzazione {intensity}.",
        Language::Portuguese => "Reescreva o seguinte texto em português para que soe naturalmente humano, \
            com um tom {tone} e intensidade de humanização {intensity}.",
        Language::Dutch => "Herschrijf de volgende tekst in het Nederlands zodat deze natuurlijk en menselijk \
            klinkt, met een {tone} toon en een humaniseringsintensiteit van {intensity}.",
        Language::Russian => "Перепишите следующий текст на русском языке так, чтобы он звучал естественно, \
            как написанный человеком, в тоне {tone} и с интенсивностью очеловечивания {intensity}.",
        Language::Chinese => "请用中文改写以下文本，使其读起来自然、像人类撰写的一样，\
            语气为{tone}，人性化强度为{intensity}。",
        Language::Japanese => "次の文章を日本語で、人間が書いたように自然に聞こえるよう書き直してください。\
            トーンは{tone}、人間らしさの強度は{intensity}です。",
        Language::Korean => "다음 텍스트를 한국어로 사람이 쓴 것처럼 자연스럽게 다시 작성하세요. \
            어조는 {tone}, 인간화 강도는 {intensity}입니다.",
        Language::Arabic => "أعد كتابة النص التالي باللغة العربية ليبدو مكتوبًا بشكل طبيعي بواسطة إنسان، \
            بنبرة {tone} وبشدة أنسنة {intensity}.",
        Language::Hindi => "निम्नलिखित पाठ को हिन्दी में इस तरह दोबारा लिखें कि वह स्वाभाविक रूप से \
            मनुष्य द्वारा लिखा हुआ लगे, {tone} लहजे और {intensity} मानवीकरण तीव्रता के साथ।",
    }
}

/// Full user message: language instruction, requirements, then the source text.
pub fn build_user_prompt(language: Language, tone: &str, intensity: &str, text: &str) -> String {
    let instruction = fill_template(language_template(language), tone, intensity);

    format!("{instruction}\n\n{REWRITE_REQUIREMENTS}\n\nText to humanize:\n{text}")
}

/// Substitutes both placeholders in a single left-to-right pass. Inserted values
/// are never rescanned, so a tone containing `{intensity}` stays literal.
fn fill_template(template: &str, tone: &str, intensity: &str) -> String {
    let mut out = String::with_capacity(template.len() + tone.len() + intensity.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{tone}") {
            out.push_str(tone);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{intensity}") {
            out.push_str(intensity);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_both_placeholders() {
        for language in Language::ALL {
            let template = language_template(language);
            assert!(template.contains("{tone}"), "{language:?} lacks tone");
            assert!(template.contains("{intensity}"), "{language:?} lacks intensity");
        }
    }

    #[test]
    fn test_only_english_template_is_in_english() {
        let english = language_template(Language::English);
        for language in Language::ALL.into_iter().skip(1) {
            assert_ne!(language_template(language), english, "{language:?}");
        }
    }

    #[test]
    fn test_user_prompt_embeds_options_and_text() {
        let prompt = build_user_prompt(Language::Spanish, "Casual", "strong", "Hola mundo.");
        assert!(prompt.starts_with("Reescribe el siguiente texto en español"));
        assert!(prompt.contains("tono Casual"));
        assert!(prompt.contains("intensidad de humanización strong"));
        assert!(prompt.contains("- Remove AI detection patterns"));
        assert!(prompt.ends_with("Text to humanize:\nHola mundo."));
        assert!(!prompt.contains("{tone}"));
    }

    #[test]
    fn test_placeholders_inside_tone_stay_literal() {
        let prompt = build_user_prompt(Language::English, "Witty {intensity}", "light", "Hi.");
        assert!(prompt.starts_with(
            "Rewrite the following text in English to sound naturally human-written \
             with a Witty {intensity} tone and light humanization intensity."
        ));
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        assert_eq!(
            fill_template("{x} {tone}/{intensity} {", "calm", "strong"),
            "{x} calm/strong {"
        );
    }
}
