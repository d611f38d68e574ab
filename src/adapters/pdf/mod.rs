//! PDF adapter: report rendering via `printpdf`.
//!
//! Fixed A4 layout with builtin Helvetica fonts. Pure text placement: the
//! section structure comes fully assembled from the application layer.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};

use crate::ports::{RenderError, ReportContext, ReportRenderer};

/// Characters per wrapped body line at 9pt Helvetica on A4.
const WRAP_WIDTH: usize = 90;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_TOP_MM: f32 = 280.0;
const MARGIN_BOTTOM_MM: f32 = 20.0;

/// Report renderer producing A4 PDF bytes.
pub struct PdfRenderer;

impl PdfRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, report: &ReportContext) -> Result<Vec<u8>, RenderError> {
        let (doc, page1, layer1) = PdfDocument::new(
            &report.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Render(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Render(format!("font error: {e}")))?;

        let mut page = page1;
        let mut layer = doc.get_page(page).get_layer(layer1);
        let mut y = Mm(MARGIN_TOP_MM);

        // New page when the cursor runs off the bottom margin.
        let advance = |doc: &printpdf::PdfDocumentReference,
                       page: &mut printpdf::indices::PdfPageIndex,
                       layer: &mut printpdf::PdfLayerReference,
                       y: &mut Mm,
                       step: f32| {
            *y = Mm(y.0 - step);
            if y.0 < MARGIN_BOTTOM_MM {
                let (new_page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                *page = new_page;
                *layer = doc.get_page(*page).get_layer(new_layer);
                *y = Mm(MARGIN_TOP_MM);
            }
        };

        layer.use_text(&report.title, 16.0, Mm(20.0), y, &bold);
        advance(&doc, &mut page, &mut layer, &mut y, 12.0);

        for section in &report.sections {
            // Alerts render in red, everything else in black.
            if section.highlighted {
                layer.set_fill_color(Color::Rgb(Rgb::new(0.86, 0.20, 0.20, None)));
            } else {
                layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
            }
            layer.use_text(&section.heading, 11.0, Mm(20.0), y, &bold);
            advance(&doc, &mut page, &mut layer, &mut y, 6.0);

            for line in &section.lines {
                for wrapped in wrap_text(line, WRAP_WIDTH) {
                    layer.use_text(&wrapped, 9.0, Mm(25.0), y, &font);
                    advance(&doc, &mut page, &mut layer, &mut y, 4.5);
                }
            }
            advance(&doc, &mut page, &mut layer, &mut y, 4.0);
        }

        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        advance(&doc, &mut page, &mut layer, &mut y, 4.0);
        for wrapped in wrap_text(&report.footer, WRAP_WIDTH) {
            layer.use_text(&wrapped, 8.0, Mm(20.0), y, &font);
            advance(&doc, &mut page, &mut layer, &mut y, 4.0);
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| RenderError::Render(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| RenderError::Render(format!("buffer error: {e}")))
    }
}

/// Greedy word wrap; words longer than `width` get their own line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
