//! Minimal PDF 1.4 writer: Helvetica text and stroked paths.
//!
//! Coordinates are PDF user space, origin bottom-left, 1 unit = 1/72 inch.

use std::fmt::Write as _;

/// US Letter, landscape.
pub const LETTER_LANDSCAPE: (f64, f64) = (792.0, 612.0);

/// Content stream for one page.
#[derive(Debug, Default, Clone)]
pub struct Page {
    ops: String,
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, text: &str) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "BT /F1 {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape_text(text)
        );
        self
    }

    pub fn stroke_rgb(&mut self, (r, g, b): (u8, u8, u8)) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "{:.3} {:.3} {:.3} RG",
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0
        );
        self
    }

    pub fn line_width(&mut self, width: f64) -> &mut Self {
        let _ = writeln!(self.ops, "{width:.2} w");
        self
    }

    /// `Some((on, off))` for a dash pattern, `None` for solid.
    pub fn dash(&mut self, pattern: Option<(f64, f64)>) -> &mut Self {
        match pattern {
            Some((on, off)) => {
                let _ = writeln!(self.ops, "[{on:.1} {off:.1}] 0 d");
            }
            None => self.ops.push_str("[] 0 d\n"),
        }
        self
    }

    pub fn polyline(&mut self, points: &[(f64, f64)]) -> &mut Self {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return self;
        };
        if rest.is_empty() {
            // zero-length segment with a round cap so a lone point still shows
            let _ = writeln!(self.ops, "1 J {x0:.2} {y0:.2} m {x0:.2} {y0:.2} l S 0 J");
            return self;
        }
        let _ = writeln!(self.ops, "{x0:.2} {y0:.2} m");
        for &(x, y) in rest {
            let _ = writeln!(self.ops, "{x:.2} {y:.2} l");
        }
        self.ops.push_str("S\n");
        self
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64)) -> &mut Self {
        self.polyline(&[from, to])
    }

    pub fn content(&self) -> &str {
        &self.ops
    }
}

#[derive(Debug, Clone)]
pub struct PdfDocument {
    width: f64,
    height: f64,
    pages: Vec<Page>,
}

impl PdfDocument {
    pub fn new((width, height): (f64, f64)) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
        }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Serialise to PDF bytes with a correct cross-reference table.
    pub fn to_bytes(&self) -> Vec<u8> {
        let pages = if self.pages.is_empty() {
            vec![Page::new()]
        } else {
            self.pages.clone()
        };

        // 1 catalog, 2 page tree, 3 font, then (page, contents) pairs.
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
        let mut objects: Vec<String> = Vec::with_capacity(3 + 2 * pages.len());
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        for (page, &id) in pages.iter().zip(&page_ids) {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w:.0} {h:.0}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {c} 0 R >>",
                w = self.width,
                h = self.height,
                c = id + 1
            ));
            let content = page.content();
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for off in offsets {
            let _ = write!(out, "{off:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.into_bytes()
    }
}
