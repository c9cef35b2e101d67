//! Minimal PDF 1.4 writer for tabular reports.
//!
//! Callers place text and lines in millimetres measured from the top-left
//! corner of an A4 page, the way a report layout is usually described.
//! Output uses the standard Helvetica font with WinAnsi encoding, so no font
//! data is embedded. Characters outside Latin-1 are written as `?`.

use std::io::Write;

use crate::error::AdminResult;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Points per millimetre.
const K: f32 = 72.0 / 25.4;
const DEFAULT_FONT_SIZE: f32 = 16.0;
const LINE_WIDTH_PT: f32 = 0.57;

#[derive(Clone, Debug)]
pub struct PdfDocument {
    pages: Vec<Vec<u8>>,
    font_size: f32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// A document with one empty page.
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Start a new page; subsequent drawing goes there.
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    /// Draw `s` with its baseline starting at (`x`, `y`).
    pub fn text(&mut self, x: f32, y: f32, s: &str) {
        self.text_at_pt(x * K, y, s);
    }

    /// Draw `s` horizontally centered on `cx`.
    pub fn text_centered(&mut self, cx: f32, y: f32, s: &str) {
        let width = text_width(s, self.font_size);
        self.text_at_pt(cx * K - width / 2.0, y, s);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let page = self.current();
        let op = format!(
            "{LINE_WIDTH_PT:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
            x1 * K,
            flip(y1),
            x2 * K,
            flip(y2)
        );
        page.extend_from_slice(op.as_bytes());
    }

    /// Raw content stream of page `index`, for inspection.
    pub fn page_content(&self, index: usize) -> Option<&[u8]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    fn text_at_pt(&mut self, x_pt: f32, y: f32, s: &str) {
        let size = self.font_size;
        let page = self.current();
        let head = format!("BT /F1 {size:.1} Tf {x_pt:.2} {:.2} Td (", flip(y));
        page.extend_from_slice(head.as_bytes());
        page.extend_from_slice(&encode_text(s));
        page.extend_from_slice(b") Tj ET\n");
    }

    fn current(&mut self) -> &mut Vec<u8> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Serialize: catalog, page tree, shared font, one content stream per
    /// page, cross-reference table and trailer.
    pub fn to_bytes(&self) -> AdminResult<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 4 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        offsets.push(out.len());
        write!(out, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;
        offsets.push(out.len());
        write!(
            out,
            "2 0 obj\n<< /Type /Pages /Kids [{kids}] /Count {} >>\nendobj\n",
            self.pages.len()
        )?;
        offsets.push(out.len());
        write!(
            out,
            "3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n"
        )?;

        for (content, page_id) in self.pages.iter().zip(&page_ids) {
            offsets.push(out.len());
            write!(
                out,
                "{page_id} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>\nendobj\n",
                PAGE_WIDTH_MM * K,
                PAGE_HEIGHT_MM * K,
                page_id + 1
            )?;
            offsets.push(out.len());
            write!(out, "{} 0 obj\n<< /Length {} >>\nstream\n", page_id + 1, content.len())?;
            out.write_all(content)?;
            write!(out, "\nendstream\nendobj\n")?;
        }

        let xref_at = out.len();
        write!(out, "xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1)?;
        for off in &offsets {
            write!(out, "{off:010} 00000 n \n")?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            offsets.len() + 1
        )?;
        Ok(out)
    }
}

fn flip(y_mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - y_mm) * K
}

/// WinAnsi bytes for a string literal, with `(`, `)` and `\` escaped.
fn encode_text(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Rendered width in points of `s` at `size`, from Helvetica's metrics.
pub fn text_width(s: &str, size: f32) -> f32 {
    let units: u32 = s.chars().map(char_width).sum();
    units as f32 * size / 1000.0
}

fn char_width(c: char) -> u32 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
    ];
    match c as u32 {
        code @ 0x20..=0x7E => u32::from(ASCII[(code - 0x20) as usize]),
        _ => 556,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(hay: &[u8], needle: &[u8]) -> bool {
        hay.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn output_is_structured_pdf() {
        let mut doc = PdfDocument::new();
        doc.set_font_size(12.0);
        doc.text(20.0, 25.0, "Hello");
        doc.add_page();
        doc.line(20.0, 52.0, 190.0, 52.0);
        let bytes = doc.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(contains(&bytes, b"/Count 2"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica"));
        assert!(contains(&bytes, b"(Hello) Tj"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new();
        doc.text(10.0, 10.0, "x");
        let bytes = doc.to_bytes().unwrap();
        let xref = bytes.windows(5).position(|w| w == b"xref\n").unwrap();
        let table = std::str::from_utf8(&bytes[xref..]).unwrap();
        let off: usize = table.lines().nth(3).unwrap()[..10].parse().unwrap();
        assert!(bytes[off..].starts_with(b"1 0 obj"));
        let start: usize = table.lines().rev().nth(1).unwrap().parse().unwrap();
        assert_eq!(start, xref);
    }

    #[test]
    fn text_is_escaped_and_non_latin_replaced() {
        assert_eq!(encode_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(encode_text("Zoë"), vec![b'Z', b'o', 0xEB]);
        assert_eq!(encode_text("日本"), b"??".to_vec());
    }

    #[test]
    fn coordinates_are_measured_from_top() {
        let mut doc = PdfDocument::new();
        doc.set_font_size(10.0);
        doc.text(0.0, 0.0, "t");
        let page = String::from_utf8_lossy(doc.page_content(0).unwrap()).to_string();
        assert!(page.contains("0.00 841.89 Td"), "{page}");
    }

    #[test]
    fn centering_uses_font_metrics() {
        // "II" is 556 units wide at 1pt per 1000 units.
        assert!((text_width("II", 10.0) - 5.56).abs() < 1e-4);
        let mut doc = PdfDocument::new();
        doc.set_font_size(10.0);
        doc.text_centered(105.0, 15.0, "II");
        let page = String::from_utf8_lossy(doc.page_content(0).unwrap()).to_string();
        let expected = format!("{:.2}", 105.0 * K - 2.78);
        assert!(page.contains(&expected), "{page}");
    }
}
