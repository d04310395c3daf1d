//! Paginated column flow for the fixed-geometry export.
//!
//! A [`Canvas`] owns the pages; a [`Column`] is a vertical cursor over one
//! horizontal band of every page. Columns flow independently, so a two-column
//! template lays out its sidebar and main column side by side, and whichever
//! overflows continues at the top of the same band on the next page.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, PageGeometry, PdfFont};

// ────────────────────────────────────────────────────────────────────────────
// Colors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const TEXT: Rgb = Rgb::new(0x1F, 0x29, 0x37);
    pub const MUTED: Rgb = Rgb::new(0x6B, 0x72, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#RRGGBB` or `#RGB` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Rgb::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Some(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Mixes toward white; `amount` 0.0 keeps the color, 1.0 yields white.
    pub fn tint(&self, amount: f32) -> Rgb {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
        Rgb::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Channels as PDF color operands in 0.0..=1.0.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Draw operations
// ────────────────────────────────────────────────────────────────────────────

/// One primitive painted on a page. Coordinates are PDF user space: origin at the
/// bottom-left corner, y growing upward; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: PdfFont,
        size: f32,
        color: Rgb,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
}

/// Text style of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: PdfFont,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(font: PdfFont, size: f32, color: Rgb) -> Self {
        TextStyle { font, size, color }
    }

    /// Baseline-to-baseline distance.
    pub fn leading(&self) -> f32 {
        self.size * 1.3
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Canvas {
    pub geometry: PageGeometry,
    /// Painted underneath the content of every page (sidebar fills, bands).
    background: Vec<DrawOp>,
    pages: Vec<Vec<DrawOp>>,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Canvas {
            geometry,
            background: Vec::new(),
            pages: vec![Vec::new()],
        }
    }

    pub fn paint_on_every_page(&mut self, op: DrawOp) {
        self.background.push(op);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn push(&mut self, page: usize, op: DrawOp) {
        while self.pages.len() <= page {
            self.pages.push(Vec::new());
        }
        self.pages[page].push(op);
    }

    /// Paints `op` on the first page only (header bands).
    pub fn paint_first_page(&mut self, op: DrawOp) {
        self.push(0, op);
    }

    /// Opens a column spanning `x .. x + width`, starting `top_offset` points below
    /// the content top of the first page.
    pub fn column(&self, x: f32, width: f32, top_offset: f32) -> Column {
        Column {
            x,
            width,
            page: 0,
            y: self.geometry.content_top() - top_offset,
        }
    }

    /// Consumes the canvas, returning per-page operations with the background
    /// prepended to each page.
    pub fn into_pages(self) -> Vec<Vec<DrawOp>> {
        let background = self.background;
        self.pages
            .into_iter()
            .map(|ops| background.iter().cloned().chain(ops).collect())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Column cursor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: f32,
    pub width: f32,
    pub page: usize,
    /// Top of the remaining free space on `page`.
    pub y: f32,
}

impl Column {
    /// Moves to the next page when less than `height` points remain.
    pub fn reserve(&mut self, canvas: &Canvas, height: f32) {
        let bottom = canvas.geometry.content_bottom();
        if self.y - height < bottom && self.y < canvas.geometry.content_top() {
            self.page += 1;
            self.y = canvas.geometry.content_top();
        }
    }

    pub fn gap(&mut self, points: f32) {
        self.y -= points;
    }

    /// Writes one line of text without wrapping at `indent` points from the left edge.
    pub fn line(&mut self, canvas: &mut Canvas, text: &str, style: TextStyle, indent: f32) {
        self.reserve(canvas, style.leading());
        self.y -= style.leading();
        canvas.push(
            self.page,
            DrawOp::Text {
                x: self.x + indent,
                y: self.y + (style.leading() - style.size),
                font: style.font,
                size: style.size,
                color: style.color,
                text: text.to_string(),
            },
        );
    }

    /// Greedy-wraps `text` to the column width and writes every line, breaking pages
    /// between lines as needed.
    pub fn paragraph(&mut self, canvas: &mut Canvas, text: &str, style: TextStyle, indent: f32) {
        let lines = get_metrics(style.font).wrap(text, style.size, self.width - indent);
        for line in lines {
            self.line(canvas, &line, style, indent);
        }
    }

    /// A bullet item: the marker hangs at `indent`, wrapped text aligns after it.
    pub fn bullet(&mut self, canvas: &mut Canvas, marker: &str, text: &str, style: TextStyle, indent: f32) {
        let marker_width = get_metrics(style.font).measure_pt(marker, style.size) + style.size * 0.4;
        let lines = get_metrics(style.font).wrap(text, style.size, self.width - indent - marker_width);
        for (i, line) in lines.iter().enumerate() {
            self.reserve(canvas, style.leading());
            if i == 0 {
                canvas.push(
                    self.page,
                    DrawOp::Text {
                        x: self.x + indent,
                        y: self.y - style.size,
                        font: style.font,
                        size: style.size,
                        color: style.color,
                        text: marker.to_string(),
                    },
                );
            }
            self.line(canvas, line, style, indent + marker_width);
        }
    }

    /// Text aligned to the column's right edge on the current line, which is not
    /// advanced. Pair with a following [`Column::line`] of the same style.
    pub fn right_aligned(&mut self, canvas: &mut Canvas, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        self.reserve(canvas, style.leading());
        let width = get_metrics(style.font).measure_pt(text, style.size);
        canvas.push(
            self.page,
            DrawOp::Text {
                x: self.x + self.width - width,
                y: self.y - style.size,
                font: style.font,
                size: style.size,
                color: style.color,
                text: text.to_string(),
            },
        );
    }

    /// Horizontal rule across the column.
    pub fn rule(&mut self, canvas: &mut Canvas, color: Rgb, thickness: f32) {
        self.reserve(canvas, thickness + 4.0);
        self.y -= 2.0;
        canvas.push(
            self.page,
            DrawOp::Line {
                x1: self.x,
                y1: self.y,
                x2: self.x + self.width,
                y2: self.y,
                width: thickness,
                color,
            },
        );
        self.y -= 2.0 + thickness;
    }

    /// A row of five dots, the first `filled` painted `on` and the rest `off`.
    pub fn scale(&mut self, canvas: &mut Canvas, filled: u8, on: Rgb, off: Rgb, indent: f32) {
        const DOT: f32 = 6.0;
        const STEP: f32 = 9.0;
        self.reserve(canvas, DOT + 4.0);
        self.y -= DOT + 2.0;
        for i in 0..5u8 {
            canvas.push(
                self.page,
                DrawOp::Rect {
                    x: self.x + indent + f32::from(i) * STEP,
                    y: self.y,
                    width: DOT,
                    height: DOT,
                    color: if i < filled { on } else { off },
                },
            );
        }
        self.y -= 2.0;
    }

    /// Greedy-wraps `text` and centers every line within the column.
    pub fn centered(&mut self, canvas: &mut Canvas, text: &str, style: TextStyle) {
        let metrics = get_metrics(style.font);
        for line in metrics.wrap(text, style.size, self.width) {
            let offset = (self.width - metrics.measure_pt(&line, style.size)) / 2.0;
            self.line(canvas, &line, style, offset.max(0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> TextStyle {
        TextStyle::new(PdfFont::Helvetica, 10.0, Rgb::TEXT)
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#3B82F6"), Some(Rgb::new(0x3B, 0x82, 0xF6)));
        assert_eq!(Rgb::from_hex("fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("blue"), None);
        assert_eq!(Rgb::new(0x3B, 0x82, 0xF6).to_hex(), "#3B82F6");
    }

    #[test]
    fn test_tint_toward_white() {
        assert_eq!(Rgb::BLACK.tint(1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.tint(0.0), Rgb::BLACK);
    }

    #[test]
    fn test_single_page_when_content_fits() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        let mut col = canvas.column(40.0, 300.0, 0.0);
        col.paragraph(&mut canvas, "Hello world", body(), 0.0);
        assert_eq!(canvas.page_count(), 1);
        assert!(col.y < canvas.geometry.content_top());
    }

    #[test]
    fn test_overflow_continues_on_next_page() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        let mut col = canvas.column(40.0, 300.0, 0.0);
        for i in 0..120 {
            col.line(&mut canvas, &format!("line {i}"), body(), 0.0);
        }
        assert!(canvas.page_count() >= 2);
        let pages = canvas.into_pages();
        for page in &pages {
            for op in page {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= PageGeometry::a4().content_bottom());
                }
            }
        }
    }

    #[test]
    fn test_background_painted_on_every_page() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        canvas.paint_on_every_page(DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 841.89,
            color: Rgb::MUTED,
        });
        let mut col = canvas.column(120.0, 300.0, 0.0);
        for _ in 0..150 {
            col.line(&mut canvas, "filler", body(), 0.0);
        }
        let pages = canvas.into_pages();
        assert!(pages.len() >= 2);
        for page in &pages {
            assert!(matches!(page.first(), Some(DrawOp::Rect { width, .. }) if *width == 100.0));
        }
    }

    #[test]
    fn test_centered_line_is_symmetric() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        let mut col = canvas.column(100.0, 200.0, 0.0);
        col.centered(&mut canvas, "Ada", body());
        let width = get_metrics(PdfFont::Helvetica).measure_pt("Ada", 10.0);
        let pages = canvas.into_pages();
        match &pages[0][0] {
            DrawOp::Text { x, .. } => assert!((x - (100.0 + (200.0 - width) / 2.0)).abs() < 1e-3),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_scale_paints_five_dots() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        let mut col = canvas.column(0.0, 200.0, 0.0);
        col.scale(&mut canvas, 2, Rgb::BLACK, Rgb::WHITE, 0.0);
        let pages = canvas.into_pages();
        let colors: Vec<Rgb> = pages[0]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), 5);
        assert_eq!(colors.iter().filter(|c| **c == Rgb::BLACK).count(), 2);
    }

    #[test]
    fn test_columns_flow_independently() {
        let mut canvas = Canvas::new(PageGeometry::a4());
        let mut main = canvas.column(200.0, 350.0, 0.0);
        let mut side = canvas.column(20.0, 150.0, 0.0);
        for _ in 0..100 {
            main.line(&mut canvas, "main", body(), 0.0);
        }
        side.line(&mut canvas, "side", body(), 0.0);
        assert!(main.page >= 1);
        assert_eq!(side.page, 0);
    }
}
