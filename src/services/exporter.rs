use std::io::Cursor;

use anyhow::Context;
use docx_rs::{Docx, Paragraph, Run};
use printpdf::{Mm, PdfDocument};

const PDF_PAGE_WIDTH_MM: f32 = 210.0;
const PDF_PAGE_HEIGHT_MM: f32 = 297.0;
const PDF_MARGIN_MM: f32 = 20.0;
const PDF_LINE_STEP_MM: f32 = 5.5;
const PDF_FONT_SIZE: f32 = 11.0;

// Proposals are mostly Cyrillic; the builtin PDF fonts are WinAnsi-only and
// would drop every non-Latin glyph, so a Unicode font ships with the binary.
const PDF_FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

pub fn render_docx(proposal_text: &str) -> anyhow::Result<Vec<u8>> {
    let mut docx = Docx::new();

    for line in proposal_text.split('\n') {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line).size(22)));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .context("Failed to pack DOCX archive")?;

    Ok(buffer.into_inner())
}

pub fn render_pdf(proposal_text: &str) -> anyhow::Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Adlook Proposal",
        Mm(PDF_PAGE_WIDTH_MM),
        Mm(PDF_PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_external_font(PDF_FONT_BYTES)
        .context("Failed to embed PDF font")?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PDF_PAGE_HEIGHT_MM - PDF_MARGIN_MM;

    for line in proposal_text.split('\n') {
        if y < PDF_MARGIN_MM {
            let (page, layer_index) =
                doc.add_page(Mm(PDF_PAGE_WIDTH_MM), Mm(PDF_PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_index);
            y = PDF_PAGE_HEIGHT_MM - PDF_MARGIN_MM;
        }

        if !line.trim().is_empty() {
            layer.use_text(line, PDF_FONT_SIZE, Mm(PDF_MARGIN_MM), Mm(y), &font);
        }
        y -= PDF_LINE_STEP_MM;
    }

    doc.save_to_bytes().context("Failed to serialize PDF")
}

#[cfg(test)]
mod tests {
    use super::{render_docx, render_pdf};
    use crate::services::build_proposal;

    fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn docx_bytes_are_a_zip_archive() {
        let bytes = render_docx("Subject: offer\n\nHello!").unwrap();

        // DOCX is a zip container; PK magic marks it.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn pdf_bytes_carry_the_pdf_header() {
        let bytes = render_pdf("Subject: offer\n\nHello!").unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_embeds_a_unicode_font_for_cyrillic_text() {
        let proposal = build_proposal("https://example.com", "blog", "medium", &[]);
        assert!(proposal.contains("Здравствуйте"));

        let bytes = render_pdf(&proposal).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        // The full DejaVu face rides along in the document, so Cyrillic
        // glyphs survive instead of being dropped by a WinAnsi builtin.
        assert!(contains_bytes(&bytes, b"DejaVuSans"));
        assert!(bytes.len() > 50_000);
    }

    #[test]
    fn long_text_spills_onto_extra_pdf_pages() {
        let long_text = (0..200)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");

        let bytes = render_pdf(&long_text).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_proposal_still_renders() {
        assert!(render_docx("").is_ok());
        assert!(render_pdf("").is_ok());
    }
}
