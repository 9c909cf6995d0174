use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::debug;

/// Extracts the text of every top-level paragraph, one per line.
/// Paragraphs whose text is blank after trimming are skipped.
pub fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let doc = docx_rs::read_docx(bytes).map_err(|e| format!("failed to parse DOCX: {e}"))?;

    let paragraphs: Vec<String> = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    debug!("Extracted {} DOCX paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, &mut text),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &Run, output: &mut String) {
    for run_child in &run.children {
        if let RunChild::Text(t) = run_child {
            output.push_str(&t.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::build_docx;

    #[test]
    fn test_paragraphs_joined_by_newline() {
        let bytes = build_docx("First paragraph.\nSecond paragraph.").unwrap();
        assert_eq!(
            extract_docx(&bytes).unwrap(),
            "First paragraph.\nSecond paragraph."
        );
    }

    #[test]
    fn test_blank_paragraphs_are_skipped() {
        let bytes = build_docx("Intro\n\n   \nConclusion").unwrap();
        assert_eq!(extract_docx(&bytes).unwrap(), "Intro\nConclusion");
    }

    #[test]
    fn test_multiple_runs_concatenate() {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx_rs::Docx::new()
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_text("Hello, "))
                    .add_run(docx_rs::Run::new().add_text("world")),
            )
            .build()
            .pack(&mut buf)
            .unwrap();
        assert_eq!(extract_docx(buf.get_ref()).unwrap(), "Hello, world");
    }

    #[test]
    fn test_invalid_archive_is_error() {
        let err = extract_docx(b"PK\x03\x04 truncated").unwrap_err();
        assert!(err.contains("DOCX"));
    }
}
