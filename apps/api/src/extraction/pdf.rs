use tracing::{debug, warn};

/// Extracts text from every page of a PDF, joined by newlines and trimmed.
/// Pages without extractable text contribute nothing.
///
/// `pdf-extract` can panic on malformed fonts, so the call runs under `catch_unwind`.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            return Err(e.to_string());
        }
        Err(_panic) => {
            warn!("PDF extraction panicked, likely a malformed font or glyph table");
            return Err("PDF parser aborted on malformed content".to_string());
        }
    };

    let page_count = pages.len();
    let text = join_pages(pages);
    debug!("Extracted {} chars from {page_count} PDF pages", text.len());
    Ok(text)
}

fn join_pages(pages: Vec<String>) -> String {
    let mut text = String::new();
    for page in pages.iter().filter(|p| !p.trim().is_empty()) {
        text.push_str(page);
        text.push('\n');
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    /// One Helvetica page per entry; an empty entry yields a page with no text.
    fn fixture_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extracts_text_from_one_page_pdf() {
        let text = extract_pdf(&fixture_pdf(&["Hello PDF"])).unwrap();
        assert!(text.contains("Hello PDF"), "got {text:?}");
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_pages_keep_order_and_blank_pages_add_nothing() {
        let text = extract_pdf(&fixture_pdf(&["First page", "", "Last page"])).unwrap();
        let first = text.find("First page").unwrap();
        let last = text.find("Last page").unwrap();
        assert!(first < last, "got {text:?}");
    }

    #[test]
    fn test_textless_pdf_extracts_to_empty() {
        assert_eq!(extract_pdf(&fixture_pdf(&[""])).unwrap(), "");
    }

    #[test]
    fn test_join_pages_skips_blank_pages_and_trims() {
        let pages = vec![
            "  First page.".to_string(),
            "   ".to_string(),
            String::new(),
            "Second page.\n".to_string(),
        ];
        assert_eq!(join_pages(pages), "First page.\nSecond page.");
    }

    #[test]
    fn test_join_pages_of_nothing_is_empty() {
        assert_eq!(join_pages(Vec::new()), "");
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        assert!(extract_pdf(b"definitely not a pdf").is_err());
    }
}
