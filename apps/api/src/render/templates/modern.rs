//! "Modern Professional": sans-serif, main column on the left and a tinted sidebar
//! on the right carrying the compact sections.

use crate::document::{SectionId, TemplateId};
use crate::layout::{Canvas, DrawOp, PdfFont, Rgb, TextStyle, SANS};
use crate::render::preview::PreviewNode;
use crate::render::registry::Template;
use crate::render::templates::{
    export_section, export_summary, preview_contacts, preview_photo, preview_root,
    preview_section, preview_signature, preview_summary, Palette,
};
use crate::render::view::ResumeView;

pub struct Modern;

/// Sections placed in the sidebar; everything else flows in the main column.
const SIDEBAR: [SectionId; 4] = [
    SectionId::Personal,
    SectionId::Skills,
    SectionId::Languages,
    SectionId::Certificates,
];

const MARGIN: f32 = 36.0;
const SIDEBAR_RATIO: f32 = 0.32;

impl Template for Modern {
    fn id(&self) -> TemplateId {
        TemplateId::Modern
    }

    fn display_name(&self) -> &'static str {
        "Modern Professional"
    }

    fn default_theme_color(&self) -> &'static str {
        "#3B82F6"
    }

    fn render_preview(&self, view: &ResumeView) -> PreviewNode {
        let (main_sections, side_sections) = view.partition(&SIDEBAR);

        let mut identity = Vec::new();
        identity.extend(PreviewNode::text_el("h1", "name", &view.header.name));
        identity.extend(PreviewNode::text_el("p", "role", &view.header.role));
        identity.push(preview_contacts(view, "contacts inline"));
        let mut header = vec![PreviewNode::el("div", "identity", identity)];
        header.extend(preview_photo(view, "photo rounded"));

        let mut main: Vec<PreviewNode> = preview_summary(view, "heading accent").into_iter().collect();
        main.extend(main_sections.iter().map(|s| preview_section(s, "heading accent")));
        main.extend(preview_signature(view));

        let side = side_sections
            .iter()
            .map(|s| preview_section(s, "heading small"))
            .collect();

        preview_root(
            view,
            "template template-modern",
            vec![
                PreviewNode::el("header", "header", header),
                PreviewNode::el(
                    "div",
                    "columns",
                    vec![
                        PreviewNode::el("main", "main", main),
                        PreviewNode::el("aside", "sidebar sidebar-right", side),
                    ],
                ),
            ],
        )
    }

    fn render_export(&self, view: &ResumeView, canvas: &mut Canvas) {
        let geometry = canvas.geometry;
        let side_width = (geometry.width_pt * SIDEBAR_RATIO).round();
        let side_x = geometry.width_pt - side_width;
        canvas.paint_on_every_page(DrawOp::Rect {
            x: side_x,
            y: 0.0,
            width: side_width,
            height: geometry.height_pt,
            color: view.theme.tint(0.9),
        });

        let palette = Palette {
            fonts: SANS,
            heading: view.theme,
            text: Rgb::TEXT,
            muted: Rgb::MUTED,
            accent: view.theme,
            track: view.theme.tint(0.75),
            body_size: 9.5,
        };
        let mut main = canvas.column(MARGIN, side_x - 2.0 * MARGIN, 0.0);
        let mut side = canvas.column(side_x + MARGIN / 2.0, side_width - MARGIN, 0.0);

        main.paragraph(canvas, &view.header.name, TextStyle::new(PdfFont::HelveticaBold, 24.0, Rgb::TEXT), 0.0);
        main.paragraph(canvas, &view.header.role, TextStyle::new(PdfFont::Helvetica, 13.0, view.theme), 0.0);
        main.paragraph(canvas, &view.header.contacts.join("  |  "), palette.muted(), 0.0);
        main.gap(4.0);
        main.rule(canvas, view.theme, 1.5);

        export_summary(&mut main, canvas, view, &palette, true);
        let (main_sections, side_sections) = view.partition(&SIDEBAR);
        for section in main_sections {
            export_section(&mut main, canvas, section, &palette, true);
        }
        for section in side_sections {
            export_section(&mut side, canvas, section, &palette, false);
        }
        if view.header.signature_url.is_some() {
            main.gap(24.0);
            main.rule(canvas, Rgb::MUTED, 0.5);
            main.line(canvas, &view.signature_heading, palette.muted(), 0.0);
        }
    }
}
