//! The closed template table.
//!
//! Each [`TemplateId`] maps to exactly one static strategy; lookups are typed and
//! unknown names are resolved to the default before they get here, so nothing in
//! this module can fail.

use serde::Serialize;

use crate::document::TemplateId;
use crate::layout::Canvas;
use crate::render::preview::PreviewNode;
use crate::render::templates::{Classic, Creative, Modern};
use crate::render::view::ResumeView;

/// One template: a preview strategy, an export strategy and a default color.
pub trait Template: Send + Sync {
    fn id(&self) -> TemplateId;

    fn display_name(&self) -> &'static str;

    /// `#RRGGBB` used when the document carries no theme color.
    fn default_theme_color(&self) -> &'static str;

    fn is_premium(&self) -> bool {
        false
    }

    fn render_preview(&self, view: &ResumeView) -> PreviewNode;

    /// Lays the view out onto `canvas`, adding pages as content overflows.
    fn render_export(&self, view: &ResumeView, canvas: &mut Canvas);
}

static MODERN: Modern = Modern;
static CLASSIC: Classic = Classic;
static CREATIVE: Creative = Creative;

pub fn lookup(id: TemplateId) -> &'static dyn Template {
    match id {
        TemplateId::Modern => &MODERN,
        TemplateId::Classic => &CLASSIC,
        TemplateId::Creative => &CREATIVE,
    }
}

/// Resolves a raw identifier; unknown names get the default template.
pub fn lookup_name(name: &str) -> &'static dyn Template {
    lookup(TemplateId::resolve(name))
}

/// Registry row as exposed to the template picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: &'static str,
    pub is_premium: bool,
    pub default_theme_color: &'static str,
    pub is_default: bool,
}

pub fn listing() -> Vec<TemplateInfo> {
    TemplateId::ALL
        .into_iter()
        .map(|id| {
            let template = lookup(id);
            TemplateInfo {
                id,
                name: template.display_name(),
                is_premium: template.is_premium(),
                default_theme_color: template.default_theme_color(),
                is_default: id == TemplateId::default(),
            }
        })
        .collect()
}
