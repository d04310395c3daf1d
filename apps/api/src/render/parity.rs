//! Document-derived decisions both renderers must agree on.
//!
//! Preview and export never compute these themselves: they consume a
//! [`crate::render::ResumeView`], which is built exclusively from the functions
//! in this module.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::document::{ResumeDocument, SectionId, TemplateId};
use crate::layout::Rgb;
use crate::render::labels::{Labels, Locale};
use crate::render::registry;

/// `endDate` values meaning "ongoing", compared case-insensitively.
pub const PRESENT_SENTINELS: [&str; 3] = ["present", "atualmente", "current"];

/// Proficiency used for labels outside the known vocabulary.
pub const DEFAULT_PROFICIENCY: u8 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Section visibility
// ────────────────────────────────────────────────────────────────────────────

/// `sectionOrder` filtered to sections with something to show, order preserved.
///
/// `personal` counts as non-empty only when a biographical detail is set; name,
/// contact and summary belong to the header, which every template always shows.
pub fn visible_sections(doc: &ResumeDocument) -> Vec<SectionId> {
    doc.section_order
        .iter()
        .filter(|id| section_has_content(doc, *id))
        .collect()
}

fn section_has_content(doc: &ResumeDocument, id: SectionId) -> bool {
    match id {
        SectionId::Personal => doc.personal.has_details(),
        SectionId::Experience => !doc.experience.is_empty(),
        SectionId::Internships => !doc.internships.is_empty(),
        SectionId::Education => !doc.education.is_empty(),
        SectionId::Skills => !doc.skills.is_empty(),
        SectionId::Languages => !doc.languages.is_empty(),
        SectionId::Certificates => !doc.certificates.is_empty(),
        SectionId::References => !doc.references.is_empty(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

pub fn is_present_marker(value: &str) -> bool {
    let value = value.trim();
    PRESENT_SENTINELS
        .iter()
        .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
}

/// `start – end`, `start – Present` for open ranges, empty when both are absent.
pub fn format_date_range(start: &str, end: &str) -> String {
    format_date_range_in(start, end, Locale::En.labels())
}

/// [`format_date_range`] with localized month names and "present" wording.
pub fn format_date_range_in(start: &str, end: &str, labels: &Labels) -> String {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() && end.is_empty() {
        return String::new();
    }
    let end = if end.is_empty() || is_present_marker(end) {
        labels.present.to_string()
    } else {
        format_month(end, labels)
    };
    if start.is_empty() {
        return end;
    }
    format!("{} – {}", format_month(start, labels), end)
}

/// `YYYY-MM` becomes `Mon YYYY`; anything else is shown as typed.
pub fn format_month(value: &str, labels: &Labels) -> String {
    let value = value.trim();
    if is_present_marker(value) {
        return labels.present.to_string();
    }
    match NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        Ok(date) if value.len() == 7 => {
            format!("{} {}", labels.months[date.month0() as usize], date.year())
        }
        _ => value.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Proficiency
// ────────────────────────────────────────────────────────────────────────────

/// Maps a free-text proficiency label to the 1..=5 visual scale.
pub fn proficiency_to_scale(level: &str) -> u8 {
    match level.trim().to_lowercase().as_str() {
        "native" | "nativo" | "c2" => 5,
        "fluent" | "fluente" | "advanced" | "avançado" | "c1" => 4,
        "upper-intermediate" | "intermediate" | "intermediário" | "b2" | "b1" => 3,
        "pre-intermediate" | "elementary" | "basic" | "básico" | "a2" => 2,
        "beginner" | "iniciante" | "a1" => 1,
        _ => DEFAULT_PROFICIENCY,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme color
// ────────────────────────────────────────────────────────────────────────────

/// `metadata.themeColor` when it is set to a parseable color, otherwise the
/// registry default for the document's template.
pub fn resolve_theme_color(doc: &ResumeDocument) -> Rgb {
    Rgb::from_hex(&doc.metadata.theme_color)
        .unwrap_or_else(|| template_default_color(doc.metadata.template_id))
}

fn template_default_color(id: TemplateId) -> Rgb {
    Rgb::from_hex(registry::lookup(id).default_theme_color()).unwrap_or(Rgb::BLACK)
}

// ────────────────────────────────────────────────────────────────────────────
// Decision record
// ────────────────────────────────────────────────────────────────────────────

/// Every parity-relevant value a render used, in the order it used them. Both
/// renderer outputs carry one so that agreement can be asserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDecisions {
    pub template: TemplateId,
    pub theme_color: String,
    pub visible_sections: Vec<SectionId>,
    pub date_ranges: Vec<String>,
    pub proficiency_scales: Vec<u8>,
}
