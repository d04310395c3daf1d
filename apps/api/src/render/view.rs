//! Renderer-neutral view of a document.
//!
//! Built once per render from a document snapshot and handed to the template's
//! preview or export strategy. Every parity-relevant value in here comes from
//! [`crate::render::parity`].

use serde::Serialize;

use crate::document::{ResumeDocument, SectionId, TemplateId};
use crate::layout::Rgb;
use crate::reflow;
use crate::render::labels::{Labels, Locale};
use crate::render::parity::{
    format_date_range_in, format_month, proficiency_to_scale, resolve_theme_color,
    visible_sections, RenderDecisions,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub name: String,
    pub role: String,
    pub contacts: Vec<String>,
    pub summary: String,
    pub photo_url: Option<String>,
    pub signature_url: Option<String>,
}

/// One line of a multi-line description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum DescriptionLine {
    /// Marker stripped; rendered with a hanging indent.
    Bullet(String),
    Text(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub title: String,
    pub subtitle: String,
    pub dates: String,
    pub details: Vec<String>,
    pub description: Vec<DescriptionLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageView {
    pub language: String,
    pub proficiency: String,
    pub scale: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "camelCase")]
pub enum SectionBody {
    /// Label/value pairs of biographical details.
    Details(Vec<(String, String)>),
    Entries(Vec<EntryView>),
    Tags(Vec<String>),
    Languages(Vec<LanguageView>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: SectionId,
    pub heading: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub template: TemplateId,
    pub locale: Locale,
    pub theme: Rgb,
    pub summary_heading: String,
    pub signature_heading: String,
    pub header: HeaderView,
    pub sections: Vec<SectionView>,
}

impl ResumeView {
    pub fn build(doc: &ResumeDocument, locale: Locale) -> Self {
        let labels = locale.labels();
        let sections = visible_sections(doc)
            .into_iter()
            .map(|id| SectionView {
                id,
                heading: labels.heading(id).to_string(),
                body: section_body(doc, id, labels),
            })
            .collect();

        ResumeView {
            template: doc.metadata.template_id,
            locale,
            theme: resolve_theme_color(doc),
            summary_heading: labels.summary.to_string(),
            signature_heading: labels.signature.to_string(),
            header: header(doc, labels),
            sections,
        }
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Visible sections in order, split by whether `in_sidebar` claims them.
    pub fn partition(&self, in_sidebar: &[SectionId]) -> (Vec<&SectionView>, Vec<&SectionView>) {
        self.sections
            .iter()
            .partition(|s| !in_sidebar.contains(&s.id))
    }

    pub fn decisions(&self) -> RenderDecisions {
        let mut date_ranges = Vec::new();
        let mut proficiency_scales = Vec::new();
        for section in &self.sections {
            match &section.body {
                SectionBody::Entries(entries) => {
                    date_ranges.extend(entries.iter().map(|e| e.dates.clone()));
                }
                SectionBody::Languages(languages) => {
                    proficiency_scales.extend(languages.iter().map(|l| l.scale));
                }
                SectionBody::Details(_) | SectionBody::Tags(_) => {}
            }
        }
        RenderDecisions {
            template: self.template,
            theme_color: self.theme.to_hex(),
            visible_sections: self.sections.iter().map(|s| s.id).collect(),
            date_ranges,
            proficiency_scales,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn header(doc: &ResumeDocument, labels: &Labels) -> HeaderView {
    let p = &doc.personal;
    let role = non_empty(&p.role).unwrap_or_else(|| labels.role_placeholder.to_string());
    HeaderView {
        name: p.full_name(),
        role,
        contacts: [&p.email, &p.phone, &p.website]
            .into_iter()
            .filter_map(|v| non_empty(v))
            .collect(),
        summary: p.summary.trim().to_string(),
        photo_url: non_empty(&p.photo_url),
        signature_url: non_empty(&p.signature_url),
    }
}

fn section_body(doc: &ResumeDocument, id: SectionId, labels: &Labels) -> SectionBody {
    match id {
        SectionId::Personal => {
            let p = &doc.personal;
            let details = [
                (labels.birth_date, &p.birth_date),
                (labels.civil_status, &p.civil_status),
                (labels.gender, &p.gender),
                (labels.nationality, &p.nationality),
            ]
            .into_iter()
            .filter_map(|(label, value)| non_empty(value).map(|v| (label.to_string(), v)))
            .collect();
            SectionBody::Details(details)
        }
        SectionId::Experience | SectionId::Internships => {
            let items = if id == SectionId::Experience {
                &doc.experience
            } else {
                &doc.internships
            };
            SectionBody::Entries(
                items
                    .iter()
                    .map(|e| EntryView {
                        title: e.role.trim().to_string(),
                        subtitle: e.company.trim().to_string(),
                        dates: format_date_range_in(&e.start_date, &e.end_date, labels),
                        details: Vec::new(),
                        description: description_lines(&e.description),
                    })
                    .collect(),
            )
        }
        SectionId::Education => SectionBody::Entries(
            doc.education
                .iter()
                .map(|e| EntryView {
                    title: e.school.trim().to_string(),
                    subtitle: e.degree.trim().to_string(),
                    dates: format_date_range_in(&e.start_date, &e.end_date, labels),
                    details: Vec::new(),
                    description: description_lines(&e.description),
                })
                .collect(),
        ),
        SectionId::Skills => SectionBody::Tags(doc.skills.clone()),
        SectionId::Languages => SectionBody::Languages(
            doc.languages
                .iter()
                .map(|l| LanguageView {
                    language: l.language.trim().to_string(),
                    proficiency: l.proficiency.trim().to_string(),
                    scale: proficiency_to_scale(&l.proficiency),
                })
                .collect(),
        ),
        SectionId::Certificates => SectionBody::Entries(
            doc.certificates
                .iter()
                .map(|c| EntryView {
                    title: c.name.trim().to_string(),
                    subtitle: c.issuer.trim().to_string(),
                    dates: format_month(&c.date, labels),
                    details: non_empty(&c.url).into_iter().collect(),
                    description: Vec::new(),
                })
                .collect(),
        ),
        SectionId::References => SectionBody::Entries(
            doc.references
                .iter()
                .map(|r| {
                    let subtitle = [&r.position, &r.company]
                        .into_iter()
                        .filter_map(|v| non_empty(v))
                        .collect::<Vec<_>>()
                        .join(", ");
                    EntryView {
                        title: r.name.trim().to_string(),
                        subtitle,
                        dates: String::new(),
                        details: [&r.email, &r.phone]
                            .into_iter()
                            .filter_map(|v| non_empty(v))
                            .collect(),
                        description: Vec::new(),
                    }
                })
                .collect(),
        ),
    }
}

/// Splits a description into lines; lines starting with a bullet marker become
/// bullet items. Blank lines are dropped.
pub fn description_lines(text: &str) -> Vec<DescriptionLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if reflow::is_bullet_line(line) {
                DescriptionLine::Bullet(reflow::bullet_text(line).to_string())
            } else {
                DescriptionLine::Text(line.trim().to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{default_document, CollectionKind};
    use serde_json::json;

    fn sample() -> ResumeDocument {
        let mut doc = default_document();
        doc.personal.first_name = "Ada".to_string();
        doc.personal.last_name = "Lovelace".to_string();
        doc.personal.email = "ada@example.com".to_string();
        let id = doc.experience[0].id.clone();
        let kind = CollectionKind::Experience;
        doc.update_entity(kind, &id, "role", json!("Analyst")).unwrap();
        doc.update_entity(kind, &id, "startDate", json!("2021-03")).unwrap();
        doc.update_entity(kind, &id, "description", json!("Led team\n• Built engine\n\n- Wrote notes"))
            .unwrap();
        let lang = doc.add_entity(CollectionKind::Languages);
        doc.update_entity(CollectionKind::Languages, &lang, "proficiency", json!("C2"))
            .unwrap();
        doc
    }

    #[test]
    fn test_description_lines_classifies_bullets() {
        assert_eq!(
            description_lines("Intro\n  • one\n\n* two"),
            vec![
                DescriptionLine::Text("Intro".to_string()),
                DescriptionLine::Bullet("one".to_string()),
                DescriptionLine::Bullet("two".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_uses_parity_derivations() {
        let view = ResumeView::build(&sample(), Locale::En);
        assert_eq!(view.header.name, "Ada Lovelace");
        assert_eq!(view.header.contacts, vec!["ada@example.com"]);
        let decisions = view.decisions();
        assert_eq!(decisions.visible_sections, vec![SectionId::Experience, SectionId::Languages]);
        assert_eq!(decisions.date_ranges, vec!["Mar 2021 – Present"]);
        assert_eq!(decisions.proficiency_scales, vec![5]);
        assert_eq!(decisions.theme_color, "#3B82F6");
    }

    #[test]
    fn test_header_role_placeholder_when_blank() {
        let view = ResumeView::build(&default_document(), Locale::Pt);
        assert_eq!(view.header.role, "Cargo Profissional");
        assert!(view.header.photo_url.is_none());
    }

    #[test]
    fn test_partition_respects_order() {
        let view = ResumeView::build(&sample(), Locale::En);
        let (main, side) = view.partition(&[SectionId::Languages]);
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].id, SectionId::Experience);
        assert_eq!(side[0].id, SectionId::Languages);
    }
}
