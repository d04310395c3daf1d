//! Template strategies and the building blocks they share.
//!
//! Templates differ in arrangement and styling only; every value they print comes
//! from the [`ResumeView`] they are handed.

pub mod classic;
pub mod creative;
pub mod modern;

pub use classic::Classic;
pub use creative::Creative;
pub use modern::Modern;

use crate::layout::{Canvas, Column, FontPair, Rgb, TextStyle};
use crate::render::preview::PreviewNode;
use crate::render::view::{DescriptionLine, EntryView, ResumeView, SectionBody, SectionView};

/// Marker printed in front of bullet items in both outputs.
pub const BULLET: &str = "•";

// ────────────────────────────────────────────────────────────────────────────
// Preview building blocks
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn preview_root(view: &ResumeView, class: &str, children: Vec<PreviewNode>) -> PreviewNode {
    PreviewNode::el("div", class, children)
        .with_attr("id", "cv-template")
        .with_attr("style", format!("--theme-color: {}", view.theme.to_hex()))
        .with_attr("data-template", view.template.as_str())
}

pub(crate) fn preview_photo(view: &ResumeView, class: &'static str) -> Option<PreviewNode> {
    view.header
        .photo_url
        .as_deref()
        .map(|src| PreviewNode::image(src, &view.header.name, class))
}

pub(crate) fn preview_contacts(view: &ResumeView, class: &str) -> PreviewNode {
    PreviewNode::el(
        "ul",
        class,
        view.header
            .contacts
            .iter()
            .map(|c| PreviewNode::el("li", "", vec![PreviewNode::text(c.as_str())]))
            .collect(),
    )
}

pub(crate) fn preview_summary(view: &ResumeView, heading_class: &str) -> Option<PreviewNode> {
    let body = PreviewNode::text_el("p", "summary", &view.header.summary)?;
    Some(PreviewNode::el(
        "section",
        "section summary",
        vec![
            PreviewNode::el("h2", heading_class, vec![PreviewNode::text(view.summary_heading.as_str())]),
            body,
        ],
    ))
}

pub(crate) fn preview_signature(view: &ResumeView) -> Option<PreviewNode> {
    let src = view.header.signature_url.as_deref()?;
    Some(PreviewNode::el(
        "div",
        "signature",
        vec![
            PreviewNode::image(src, &view.signature_heading, "signature-image"),
            PreviewNode::el("span", "signature-label", vec![PreviewNode::text(view.signature_heading.as_str())]),
        ],
    ))
}

pub(crate) fn preview_section(section: &SectionView, heading_class: &str) -> PreviewNode {
    let heading = PreviewNode::el("h2", heading_class, vec![PreviewNode::text(section.heading.as_str())]);
    let body = match &section.body {
        SectionBody::Details(details) => PreviewNode::el(
            "dl",
            "details",
            details
                .iter()
                .flat_map(|(label, value)| {
                    [
                        PreviewNode::el("dt", "", vec![PreviewNode::text(label.as_str())]),
                        PreviewNode::el("dd", "", vec![PreviewNode::text(value.as_str())]),
                    ]
                })
                .collect(),
        ),
        SectionBody::Entries(entries) => {
            PreviewNode::el("div", "entries", entries.iter().map(preview_entry).collect())
        }
        SectionBody::Tags(tags) => PreviewNode::el(
            "ul",
            "tags",
            tags.iter()
                .map(|t| PreviewNode::el("li", "tag", vec![PreviewNode::text(t.as_str())]))
                .collect(),
        ),
        SectionBody::Languages(languages) => PreviewNode::el(
            "ul",
            "languages",
            languages
                .iter()
                .map(|l| {
                    let dots = (1..=5u8)
                        .map(|i| PreviewNode::el("i", if i <= l.scale { "dot filled" } else { "dot" }, Vec::new()))
                        .collect();
                    PreviewNode::el(
                        "li",
                        "language",
                        vec![
                            PreviewNode::el("span", "language-name", vec![PreviewNode::text(l.language.as_str())]),
                            PreviewNode::el("span", "scale", dots)
                                .with_attr("data-scale", l.scale.to_string())
                                .with_attr("title", l.proficiency.as_str()),
                        ],
                    )
                })
                .collect(),
        ),
    };
    PreviewNode::el("section", "section", vec![heading, body]).with_attr("data-section", section.id.as_str())
}

fn preview_entry(entry: &EntryView) -> PreviewNode {
    let mut children = Vec::new();
    let mut head = Vec::new();
    head.extend(PreviewNode::text_el("h3", "entry-title", &entry.title));
    head.extend(PreviewNode::text_el("span", "entry-dates", &entry.dates));
    children.push(PreviewNode::el("div", "entry-head", head));
    children.extend(PreviewNode::text_el("p", "entry-subtitle", &entry.subtitle));
    for detail in &entry.details {
        children.extend(PreviewNode::text_el("p", "entry-detail", detail));
    }
    if !entry.description.is_empty() {
        children.push(PreviewNode::el(
            "div",
            "description",
            entry
                .description
                .iter()
                .map(|line| match line {
                    DescriptionLine::Bullet(text) => PreviewNode::el(
                        "div",
                        "hanging-indent",
                        vec![PreviewNode::text(format!("{BULLET} {text}"))],
                    ),
                    DescriptionLine::Text(text) => {
                        PreviewNode::el("div", "line", vec![PreviewNode::text(text.as_str())])
                    }
                })
                .collect(),
        ));
    }
    PreviewNode::el("article", "entry", children)
}

// ────────────────────────────────────────────────────────────────────────────
// Export building blocks
// ────────────────────────────────────────────────────────────────────────────

/// Colors and fonts for one column of an export.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub fonts: FontPair,
    pub heading: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    /// Unfilled dots of proficiency scales.
    pub track: Rgb,
    pub body_size: f32,
}

impl Palette {
    pub fn body(&self) -> TextStyle {
        TextStyle::new(self.fonts.regular, self.body_size, self.text)
    }

    pub fn muted(&self) -> TextStyle {
        TextStyle::new(self.fonts.regular, self.body_size - 1.0, self.muted)
    }

    pub fn strong(&self) -> TextStyle {
        TextStyle::new(self.fonts.bold, self.body_size + 0.5, self.text)
    }

    pub fn heading(&self) -> TextStyle {
        TextStyle::new(self.fonts.bold, self.body_size + 3.0, self.heading)
    }
}

pub(crate) fn export_heading(col: &mut Column, canvas: &mut Canvas, text: &str, palette: &Palette, rule: bool) {
    let style = palette.heading();
    // Keep a heading with at least the first lines of its body.
    col.reserve(canvas, style.leading() + palette.body().leading() * 3.0);
    col.gap(6.0);
    col.line(canvas, &text.to_uppercase(), style, 0.0);
    if rule {
        col.rule(canvas, palette.accent, 0.8);
    }
    col.gap(2.0);
}

pub(crate) fn export_summary(col: &mut Column, canvas: &mut Canvas, view: &ResumeView, palette: &Palette, rule: bool) {
    if view.header.summary.is_empty() {
        return;
    }
    export_heading(col, canvas, &view.summary_heading, palette, rule);
    for paragraph in view.header.summary.lines().filter(|l| !l.trim().is_empty()) {
        col.paragraph(canvas, paragraph, palette.body(), 0.0);
    }
}

pub(crate) fn export_section(
    col: &mut Column,
    canvas: &mut Canvas,
    section: &SectionView,
    palette: &Palette,
    rule: bool,
) {
    export_heading(col, canvas, &section.heading, palette, rule);
    match &section.body {
        SectionBody::Details(details) => {
            for (label, value) in details {
                col.paragraph(canvas, label, palette.muted(), 0.0);
                col.paragraph(canvas, value, palette.body(), 0.0);
                col.gap(2.0);
            }
        }
        SectionBody::Entries(entries) => {
            for entry in entries {
                export_entry(col, canvas, entry, palette);
                col.gap(6.0);
            }
        }
        SectionBody::Tags(tags) => {
            for tag in tags {
                col.bullet(canvas, BULLET, tag, palette.body(), 0.0);
            }
        }
        SectionBody::Languages(languages) => {
            for language in languages {
                col.paragraph(canvas, &language.language, palette.body(), 0.0);
                col.scale(canvas, language.scale, palette.accent, palette.track, 0.0);
                col.gap(2.0);
            }
        }
    }
}

fn export_entry(col: &mut Column, canvas: &mut Canvas, entry: &EntryView, palette: &Palette) {
    let strong = palette.strong();
    let muted = palette.muted();
    let dates_width = crate::layout::get_metrics(muted.font).measure_pt(&entry.dates, muted.size);
    let fits_beside = dates_width + 12.0 < col.width * 0.45;

    if fits_beside && !entry.title.is_empty() {
        col.right_aligned(canvas, &entry.dates, muted);
        let title_lines = crate::layout::get_metrics(strong.font).wrap(
            &entry.title,
            strong.size,
            col.width - dates_width - 12.0,
        );
        for line in title_lines {
            col.line(canvas, &line, strong, 0.0);
        }
    } else {
        col.paragraph(canvas, &entry.title, strong, 0.0);
        col.paragraph(canvas, &entry.dates, muted, 0.0);
    }
    col.paragraph(canvas, &entry.subtitle, TextStyle { color: palette.accent, ..palette.body() }, 0.0);
    for detail in &entry.details {
        col.paragraph(canvas, detail, muted, 0.0);
    }
    for line in &entry.description {
        match line {
            DescriptionLine::Bullet(text) => col.bullet(canvas, BULLET, text, palette.body(), 4.0),
            DescriptionLine::Text(text) => col.paragraph(canvas, text, palette.body(), 0.0),
        }
    }
}
