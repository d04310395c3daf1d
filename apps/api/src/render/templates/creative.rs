//! "Creative Visual": a solid theme-colored sidebar on the left holding the identity
//! block and compact sections, with the narrative sections to its right.

use crate::document::{SectionId, TemplateId};
use crate::layout::{Canvas, DrawOp, PdfFont, Rgb, TextStyle, SANS};
use crate::render::preview::PreviewNode;
use crate::render::registry::Template;
use crate::render::templates::{
    export_section, export_summary, preview_contacts, preview_photo, preview_root,
    preview_section, preview_signature, preview_summary, Palette,
};
use crate::render::view::ResumeView;

pub struct Creative;

const SIDEBAR: [SectionId; 3] = [SectionId::Personal, SectionId::Skills, SectionId::Languages];

const MARGIN: f32 = 32.0;
const SIDEBAR_RATIO: f32 = 0.34;

impl Template for Creative {
    fn id(&self) -> TemplateId {
        TemplateId::Creative
    }

    fn display_name(&self) -> &'static str {
        "Creative Visual"
    }

    fn default_theme_color(&self) -> &'static str {
        "#8B5CF6"
    }

    fn is_premium(&self) -> bool {
        true
    }

    fn render_preview(&self, view: &ResumeView) -> PreviewNode {
        let (main_sections, side_sections) = view.partition(&SIDEBAR);

        let mut side: Vec<PreviewNode> = preview_photo(view, "photo circle").into_iter().collect();
        side.extend(PreviewNode::text_el("h1", "name", &view.header.name));
        side.extend(PreviewNode::text_el("p", "role", &view.header.role));
        side.push(preview_contacts(view, "contacts stacked"));
        side.extend(side_sections.iter().map(|s| preview_section(s, "heading on-color")));

        let mut main: Vec<PreviewNode> = preview_summary(view, "heading bar").into_iter().collect();
        main.extend(main_sections.iter().map(|s| preview_section(s, "heading bar")));
        main.extend(preview_signature(view));

        preview_root(
            view,
            "template template-creative",
            vec![
                PreviewNode::el("aside", "sidebar sidebar-left filled", side)
                    .with_attr("data-fill", view.theme.to_hex()),
                PreviewNode::el("main", "main", main),
            ],
        )
    }

    fn render_export(&self, view: &ResumeView, canvas: &mut Canvas) {
        let geometry = canvas.geometry;
        let side_width = (geometry.width_pt * SIDEBAR_RATIO).round();
        canvas.paint_on_every_page(DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: side_width,
            height: geometry.height_pt,
            color: view.theme,
        });

        let on_color = Palette {
            fonts: SANS,
            heading: Rgb::WHITE,
            text: Rgb::WHITE,
            muted: view.theme.tint(0.7),
            accent: Rgb::WHITE,
            track: view.theme.tint(0.4),
            body_size: 9.5,
        };
        let palette = Palette {
            fonts: SANS,
            heading: Rgb::TEXT,
            text: Rgb::TEXT,
            muted: Rgb::MUTED,
            accent: view.theme,
            track: view.theme.tint(0.75),
            body_size: 9.5,
        };
        let mut side = canvas.column(MARGIN / 1.5, side_width - 2.0 * MARGIN / 1.5, 0.0);
        let mut main = canvas.column(side_width + MARGIN, geometry.width_pt - side_width - 2.0 * MARGIN, 0.0);

        side.paragraph(canvas, &view.header.name, TextStyle::new(PdfFont::HelveticaBold, 20.0, Rgb::WHITE), 0.0);
        side.paragraph(canvas, &view.header.role, TextStyle::new(PdfFont::Helvetica, 11.0, Rgb::WHITE), 0.0);
        side.gap(6.0);
        for contact in &view.header.contacts {
            side.paragraph(canvas, contact, on_color.muted(), 0.0);
        }

        let (main_sections, side_sections) = view.partition(&SIDEBAR);
        for section in side_sections {
            export_section(&mut side, canvas, section, &on_color, false);
        }
        export_summary(&mut main, canvas, view, &palette, true);
        for section in main_sections {
            export_section(&mut main, canvas, section, &palette, true);
        }
        if view.header.signature_url.is_some() {
            main.gap(24.0);
            main.rule(canvas, Rgb::MUTED, 0.5);
            main.line(canvas, &view.signature_heading, palette.muted(), 0.0);
        }
    }
}
