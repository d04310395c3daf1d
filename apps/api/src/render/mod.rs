//! Preview and export renderers.
//!
//! Both entry points build one [`ResumeView`] from the document snapshot, dispatch
//! to the template's strategy and return the decisions the view carried.

pub mod labels;
pub mod parity;
pub mod pdf;
pub mod preview;
pub mod registry;
pub mod templates;
pub mod view;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::document::ResumeDocument;
use crate::layout::{Canvas, PageGeometry};

pub use labels::Locale;
pub use parity::RenderDecisions;
pub use preview::{PreviewNode, PreviewTree};
pub use registry::{listing, lookup, Template, TemplateInfo};
pub use view::ResumeView;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] std::fmt::Error),
}

/// A finished export: the PDF bytes and the decisions they were laid out from.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub decisions: RenderDecisions,
    /// Suggested download name, e.g. `ada-lovelace-cv.pdf`.
    pub file_name: String,
}

pub fn render_preview(doc: &ResumeDocument, locale: Locale) -> PreviewTree {
    let view = ResumeView::build(doc, locale);
    let template = registry::lookup(view.template);
    PreviewTree {
        decisions: view.decisions(),
        root: template.render_preview(&view),
    }
}

pub fn render_export(
    doc: &ResumeDocument,
    locale: Locale,
    geometry: PageGeometry,
) -> Result<ExportArtifact, RenderError> {
    let view = ResumeView::build(doc, locale);
    let template = registry::lookup(view.template);
    let mut canvas = Canvas::new(geometry);
    template.render_export(&view, &mut canvas);

    let pages = canvas.into_pages();
    let title = if view.header.name.is_empty() {
        "Resume".to_string()
    } else {
        view.header.name.clone()
    };
    let bytes = pdf::write_pdf(
        &pages,
        geometry,
        &pdf::DocumentInfo {
            title,
            created: Utc::now(),
        },
    )?;
    debug!(template = %view.template, pages = pages.len(), bytes = bytes.len(), "Export rendered");

    Ok(ExportArtifact {
        page_count: pages.len(),
        bytes,
        decisions: view.decisions(),
        file_name: file_name(&view.header.name),
    })
}

fn file_name(name: &str) -> String {
    let slug: Vec<String> = name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect();
    if slug.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{}-cv.pdf", slug.join("-"))
    }
}
