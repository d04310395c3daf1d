//! Minimal PDF 1.4 serializer for laid-out pages.
//!
//! Only the standard Type1 fonts are referenced (WinAnsiEncoding, not embedded),
//! content streams are uncompressed, and every byte outside printable ASCII is
//! octal-escaped, so the whole file is ASCII.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::layout::{DrawOp, PageGeometry, PdfFont};
use crate::render::RenderError;

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FIRST_FONT: usize = 3;
const INFO: usize = FIRST_FONT + PdfFont::ALL.len();
const FIRST_PAGE: usize = INFO + 1;

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub created: DateTime<Utc>,
}

/// Serializes `pages` into a complete PDF file.
pub fn write_pdf(
    pages: &[Vec<DrawOp>],
    geometry: PageGeometry,
    info: &DocumentInfo,
) -> Result<Vec<u8>, RenderError> {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets: Vec<usize> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE + 2 * i).collect();

    begin_object(&mut out, &mut offsets, CATALOG)?;
    writeln!(out, "<< /Type /Catalog /Pages {PAGES} 0 R >>")?;
    end_object(&mut out);

    begin_object(&mut out, &mut offsets, PAGES)?;
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    writeln!(
        out,
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    )?;
    end_object(&mut out);

    for (i, font) in PdfFont::ALL.iter().enumerate() {
        begin_object(&mut out, &mut offsets, FIRST_FONT + i)?;
        writeln!(
            out,
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font.base_font()
        )?;
        end_object(&mut out);
    }

    begin_object(&mut out, &mut offsets, INFO)?;
    writeln!(
        out,
        "<< /Title ({}) /Producer (cvforge) /CreationDate (D:{}Z) >>",
        escape_text(&info.title),
        info.created.format("%Y%m%d%H%M%S")
    )?;
    end_object(&mut out);

    let font_resources: Vec<String> = PdfFont::ALL
        .iter()
        .enumerate()
        .map(|(i, font)| format!("/{} {} 0 R", font.resource_name(), FIRST_FONT + i))
        .collect();
    let font_resources = font_resources.join(" ");

    for (ops, page_id) in pages.iter().zip(&page_ids) {
        let content = content_stream(ops)?;
        begin_object(&mut out, &mut offsets, *page_id)?;
        writeln!(
            out,
            "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << {font_resources} >> >> >>",
            geometry.width_pt,
            geometry.height_pt,
            page_id + 1
        )?;
        end_object(&mut out);

        begin_object(&mut out, &mut offsets, page_id + 1)?;
        writeln!(out, "<< /Length {} >>\nstream\n{content}endstream", content.len())?;
        end_object(&mut out);
    }

    let xref_offset = out.len();
    writeln!(out, "xref\n0 {}", offsets.len() + 1)?;
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        writeln!(out, "{offset:010} 00000 n ")?;
    }
    writeln!(
        out,
        "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_offset}\n%%EOF",
        offsets.len() + 1
    )?;
    Ok(out.into_bytes())
}

/// Objects must be started in increasing id order with no gaps.
fn begin_object(out: &mut String, offsets: &mut Vec<usize>, id: usize) -> Result<(), RenderError> {
    debug_assert_eq!(offsets.len() + 1, id);
    offsets.push(out.len());
    writeln!(out, "{id} 0 obj")?;
    Ok(())
}

fn end_object(out: &mut String) {
    out.push_str("endobj\n");
}

fn content_stream(ops: &[DrawOp]) -> Result<String, RenderError> {
    let mut s = String::new();
    for op in ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let (r, g, b) = color.unit();
                writeln!(s, "{r:.3} {g:.3} {b:.3} rg {x:.2} {y:.2} {width:.2} {height:.2} re f")?;
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                let (r, g, b) = color.unit();
                writeln!(
                    s,
                    "{r:.3} {g:.3} {b:.3} RG {width:.2} w {x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S"
                )?;
            }
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                let (r, g, b) = color.unit();
                writeln!(
                    s,
                    "BT /{} {size:.2} Tf {r:.3} {g:.3} {b:.3} rg {x:.2} {y:.2} Td ({}) Tj ET",
                    font.resource_name(),
                    escape_text(text)
                )?;
            }
        }
    }
    Ok(s)
}

/// Encodes `text` as a WinAnsi literal-string body: delimiters are backslash-escaped
/// and bytes outside printable ASCII become octal escapes.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let byte = win_ansi_byte(c);
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

/// WinAnsiEncoding code for `c`; unmappable characters become `?`.
fn win_ansi_byte(c: char) -> u8 {
    let code = c as u32;
    match c {
        '\t' | '\n' | '\r' => b' ',
        _ if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) => code as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rgb;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Ada (CV)".to_string(),
            created: Utc::now(),
        }
    }

    fn text_op(text: &str) -> DrawOp {
        DrawOp::Text {
            x: 40.0,
            y: 700.0,
            font: PdfFont::Helvetica,
            size: 12.0,
            color: Rgb::BLACK,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_escape_text_delimiters_and_win_ansi() {
        assert_eq!(escape_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_text("2020 – 2022"), "2020 \\226 2022");
        assert_eq!(escape_text("• é"), "\\225 \\351");
        assert_eq!(escape_text("日本"), "??");
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pages = vec![vec![text_op("Hello")], vec![text_op("World")]];
        let bytes = write_pdf(&pages, PageGeometry::a4(), &info()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));

        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[startxref..].starts_with("xref\n"));

        let entries: Vec<&str> = text[startxref..]
            .lines()
            .skip(3)
            .take_while(|l| !l.starts_with("trailer"))
            .collect();
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_pdf_text_is_extractable() {
        let pages = vec![vec![text_op("Lovelace")]];
        let bytes = write_pdf(&pages, PageGeometry::letter(), &info()).unwrap();
        let extracted = pdf_extract::extract_text_from_mem(&bytes).unwrap();
        assert!(extracted.contains("Lovelace"), "extracted: {extracted:?}");
    }
}
