//! Plain-text decoding with an ordered encoding fallback chain.

use tracing::debug;

/// Encodings tried, in order, when decoding a `.txt` upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1 restricted to its printable repertoire (no C1 controls).
    Latin1,
    Cp1252,
    /// Full ISO-8859-1: every byte maps to the code point of the same value.
    Iso8859_1,
}

pub const DECODE_ORDER: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Cp1252,
    TextEncoding::Iso8859_1,
];

/// Windows-1252 code points for bytes 0x80..=0x9F. `None` marks undefined bytes.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Cp1252 => "cp1252",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Strict decode; `None` when the bytes are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    return None;
                }
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            TextEncoding::Cp1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
            TextEncoding::Iso8859_1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Inverse of `decode`. `None` if a character has no byte in this encoding.
    #[cfg(test)]
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
            TextEncoding::Cp1252 => text
                .chars()
                .map(|c| {
                    if let Some(pos) = CP1252_HIGH.iter().position(|&m| m == Some(c)) {
                        return u8::try_from(pos).ok().map(|p| p + 0x80);
                    }
                    u8::try_from(u32::from(c))
                        .ok()
                        .filter(|b| !(0x80..=0x9F).contains(b))
                })
                .collect(),
        }
    }
}

/// Decodes `.txt` bytes using the first encoding in `DECODE_ORDER` that accepts them,
/// falling back to lossy UTF-8.
pub fn decode(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    for encoding in DECODE_ORDER {
        if let Some(text) = encoding.decode(bytes) {
            debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());
            return text;
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}
