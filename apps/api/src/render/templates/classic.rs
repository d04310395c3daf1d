//! "Classic Elegant": serif, single column, centered header.

use crate::document::TemplateId;
use crate::layout::{Canvas, DrawOp, PdfFont, Rgb, TextStyle, SERIF};
use crate::render::preview::PreviewNode;
use crate::render::registry::Template;
use crate::render::templates::{
    export_section, export_summary, preview_contacts, preview_root, preview_section,
    preview_signature, preview_summary, Palette,
};
use crate::render::view::ResumeView;

pub struct Classic;

const MARGIN: f32 = 54.0;

impl Template for Classic {
    fn id(&self) -> TemplateId {
        TemplateId::Classic
    }

    fn display_name(&self) -> &'static str {
        "Classic Elegant"
    }

    fn default_theme_color(&self) -> &'static str {
        "#1F2937"
    }

    fn render_preview(&self, view: &ResumeView) -> PreviewNode {
        let mut header = Vec::new();
        header.extend(PreviewNode::text_el("h1", "name uppercase", &view.header.name));
        header.extend(PreviewNode::text_el("p", "role italic", &view.header.role));
        header.push(preview_contacts(view, "contacts centered"));

        let mut body: Vec<PreviewNode> = preview_summary(view, "heading ruled").into_iter().collect();
        body.extend(view.sections.iter().map(|s| preview_section(s, "heading ruled")));
        body.extend(preview_signature(view));

        preview_root(
            view,
            "template template-classic serif",
            vec![
                PreviewNode::el("header", "header centered", header),
                PreviewNode::el("main", "main", body),
            ],
        )
    }

    fn render_export(&self, view: &ResumeView, canvas: &mut Canvas) {
        let geometry = canvas.geometry;
        canvas.paint_first_page(DrawOp::Rect {
            x: 0.0,
            y: geometry.height_pt - 8.0,
            width: geometry.width_pt,
            height: 8.0,
            color: view.theme,
        });

        let palette = Palette {
            fonts: SERIF,
            heading: view.theme,
            text: Rgb::TEXT,
            muted: Rgb::MUTED,
            accent: view.theme,
            track: view.theme.tint(0.8),
            body_size: 10.5,
        };
        let mut col = canvas.column(MARGIN, geometry.width_pt - 2.0 * MARGIN, 0.0);

        col.centered(canvas, &view.header.name.to_uppercase(), TextStyle::new(PdfFont::TimesBold, 24.0, Rgb::TEXT));
        col.centered(canvas, &view.header.role, TextStyle::new(PdfFont::TimesRoman, 13.0, Rgb::MUTED));
        col.centered(canvas, &view.header.contacts.join("  •  "), palette.muted());
        col.gap(4.0);
        col.rule(canvas, view.theme, 1.5);

        export_summary(&mut col, canvas, view, &palette, true);
        for section in &view.sections {
            export_section(&mut col, canvas, section, &palette, true);
        }
        if view.header.signature_url.is_some() {
            col.gap(24.0);
            col.rule(canvas, Rgb::MUTED, 0.5);
            col.line(canvas, &view.signature_heading, palette.muted(), 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_document;
    use crate::layout::PageGeometry;
    use crate::render::labels::Locale;

    #[test]
    fn test_export_uses_serif_fonts_only() {
        let mut doc = default_document();
        doc.personal.first_name = "Grace".to_string();
        doc.personal.summary = "Compiler pioneer.".to_string();
        doc.add_skill("COBOL");
        let view = ResumeView::build(&doc, Locale::En);
        let mut canvas = Canvas::new(PageGeometry::letter());
        Classic.render_export(&view, &mut canvas);
        let fonts: Vec<PdfFont> = canvas
            .into_pages()
            .into_iter()
            .flatten()
            .filter_map(|op| match op {
                DrawOp::Text { font, .. } => Some(font),
                _ => None,
            })
            .collect();
        assert!(!fonts.is_empty());
        assert!(fonts
            .iter()
            .all(|f| matches!(f, PdfFont::TimesRoman | PdfFont::TimesBold)));
    }

    #[test]
    fn test_preview_is_single_column() {
        let view = ResumeView::build(&default_document(), Locale::En);
        let html = Classic.render_preview(&view).to_html();
        assert!(!html.contains("<aside"));
        assert!(html.contains("template-classic"));
    }
}
