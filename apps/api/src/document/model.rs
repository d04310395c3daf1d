//! The `ResumeDocument` schema and its default-value factory.
//!
//! Every record keeps unrecognized keys in a flattened `extra` map so that documents
//! written by a newer build survive a round trip through this one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::document::lenient;
use crate::document::section::{SectionId, SectionOrder};
use crate::document::DocumentError;

// ────────────────────────────────────────────────────────────────────────────
// Template identifier
// ────────────────────────────────────────────────────────────────────────────

/// Identifier of a registered template. Unknown identifiers deserialize to the
/// designated default ([`TemplateId::Modern`]) instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Modern, TemplateId::Classic, TemplateId::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Creative => "creative",
        }
    }

    /// Resolves any identifier, falling back to the default for unknown names.
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(template = name, "Unknown template identifier, using default");
            TemplateId::default()
        })
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DocumentError::UnknownTemplate(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::value_to_string(Value::deserialize(deserializer)?);
        Ok(TemplateId::resolve(&raw))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Singleton records
// ────────────────────────────────────────────────────────────────────────────

/// Default theme color of the default template; the factory seeds new documents with it.
pub const DEFAULT_THEME_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub template_id: TemplateId,
    /// Empty means "use the template's default".
    #[serde(default, deserialize_with = "lenient::string")]
    pub theme_color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            template_id: TemplateId::default(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            extra: Map::new(),
        }
    }
}

/// Identity, contact and biographical fields plus the two media references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub birth_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub civil_status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nationality: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub photo_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub signature_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// True when any biographical detail is filled in.
    pub fn has_details(&self) -> bool {
        [
            &self.birth_date,
            &self.civil_status,
            &self.gender,
            &self.nationality,
        ]
        .iter()
        .any(|v| !v.trim().is_empty())
    }

    pub fn media_url(&self, slot: MediaSlot) -> &str {
        match slot {
            MediaSlot::Photo => &self.photo_url,
            MediaSlot::Signature => &self.signature_url,
        }
    }

    pub fn media_url_mut(&mut self, slot: MediaSlot) -> &mut String {
        match slot {
            MediaSlot::Photo => &mut self.photo_url,
            MediaSlot::Signature => &mut self.signature_url,
        }
    }
}

/// Media-bearing fields of [`PersonalInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSlot {
    Photo,
    Signature,
}

impl MediaSlot {
    pub const ALL: [MediaSlot; 2] = [MediaSlot::Photo, MediaSlot::Signature];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSlot::Photo => "photo",
            MediaSlot::Signature => "signature",
        }
    }

    /// Name of the backing field in the persisted `personal` record.
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaSlot::Photo => "photoUrl",
            MediaSlot::Signature => "signatureUrl",
        }
    }
}

impl fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaSlot {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s || slot.field_name() == s)
            .ok_or_else(|| DocumentError::UnknownMediaSlot(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entity ids and collections
// ────────────────────────────────────────────────────────────────────────────

/// Locally-unique entity id. Older documents used millisecond timestamps, so numeric
/// ids are accepted and preserved; new ids are random UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(u64),
    Text(String),
}

impl EntityId {
    pub fn generate() -> Self {
        EntityId::Text(Uuid::new_v4().to_string())
    }

    /// Reads an id from persisted JSON. Returns `None` for missing or unusable values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(
                n.as_u64()
                    .map(EntityId::Numeric)
                    .unwrap_or_else(|| EntityId::Text(n.to_string())),
            ),
            Value::String(s) if !s.trim().is_empty() => Some(EntityId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Numeric(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// All-digit strings parse as numeric ids so that legacy ids match from a URL path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u64>()
            .map(EntityId::Numeric)
            .unwrap_or_else(|_| EntityId::Text(s.to_string())))
    }
}

/// The six ordered-entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Experience,
    Internships,
    Education,
    Languages,
    Certificates,
    References,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 6] = [
        CollectionKind::Experience,
        CollectionKind::Internships,
        CollectionKind::Education,
        CollectionKind::Languages,
        CollectionKind::Certificates,
        CollectionKind::References,
    ];

    pub fn as_str(&self) -> &'static str {
        self.section().as_str()
    }

    pub fn section(&self) -> SectionId {
        match self {
            CollectionKind::Experience => SectionId::Experience,
            CollectionKind::Internships => SectionId::Internships,
            CollectionKind::Education => SectionId::Education,
            CollectionKind::Languages => SectionId::Languages,
            CollectionKind::Certificates => SectionId::Certificates,
            CollectionKind::References => SectionId::References,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DocumentError::UnknownCollection(s.to_string()))
    }
}

/// Behaviour shared by the entities of every ordered collection.
pub trait Entity: Serialize + serde::de::DeserializeOwned + Clone + PartialEq {
    fn id(&self) -> &EntityId;
    /// A zero-valued entity carrying `id`.
    fn blank(id: EntityId) -> Self;
}

macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident),* $(,)? }
        $(, defaults { $($dfield:ident : $dval:expr),* $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub id: EntityId,
            $(
                #[serde(default, deserialize_with = "lenient::string")]
                pub $field: String,
            )*
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }

        impl Entity for $name {
            fn id(&self) -> &EntityId {
                &self.id
            }

            #[allow(unused_mut)]
            fn blank(id: EntityId) -> Self {
                let mut entity = $name {
                    id,
                    $($field: String::new(),)*
                    extra: Map::new(),
                };
                $($(entity.$dfield = $dval.to_string();)*)?
                entity
            }
        }
    };
}

entity!(
    /// A position held: used by both `experience` and `internships`.
    WorkEntry { company, role, start_date, end_date, description }
);

entity!(EducationEntry { school, degree, start_date, end_date, description });

entity!(
    LanguageEntry { language, proficiency },
    defaults { proficiency: "intermediate" }
);

entity!(CertificateEntry { name, issuer, date, url });

entity!(ReferenceEntry { name, position, company, email, phone });

impl WorkEntry {
    pub fn is_blank(&self) -> bool {
        [
            &self.company,
            &self.role,
            &self.start_date,
            &self.end_date,
            &self.description,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
            && self.extra.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Root document
// ────────────────────────────────────────────────────────────────────────────

/// The root of one editing session's data. Serializes to the persisted wire shape.
///
/// There is deliberately no `Deserialize` impl: all external input goes through
/// [`crate::document::load_document`], which merges with the default factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub metadata: Metadata,
    pub personal: PersonalInfo,
    pub experience: Vec<WorkEntry>,
    pub internships: Vec<WorkEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub languages: Vec<LanguageEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub references: Vec<ReferenceEntry>,
    pub section_order: SectionOrder,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Default factory: one empty `experience` entry, everything else empty, canonical
/// section order.
pub fn default_document() -> ResumeDocument {
    ResumeDocument {
        metadata: Metadata::default(),
        personal: PersonalInfo::default(),
        experience: vec![WorkEntry::blank(EntityId::generate())],
        internships: Vec::new(),
        education: Vec::new(),
        skills: Vec::new(),
        languages: Vec::new(),
        certificates: Vec::new(),
        references: Vec::new(),
        section_order: SectionOrder::default(),
        extra: Map::new(),
    }
}

impl Default for ResumeDocument {
    fn default() -> Self {
        default_document()
    }
}

impl ResumeDocument {
    /// True when the document carries nothing beyond what the default factory produces
    /// (entity ids aside).
    pub fn is_pristine(&self) -> bool {
        self.metadata == Metadata::default()
            && self.personal == PersonalInfo::default()
            && self.experience.iter().all(WorkEntry::is_blank)
            && self.internships.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.languages.is_empty()
            && self.certificates.is_empty()
            && self.references.is_empty()
            && self.section_order == SectionOrder::default()
            && self.extra.is_empty()
    }

    pub fn collection_len(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Experience => self.experience.len(),
            CollectionKind::Internships => self.internships.len(),
            CollectionKind::Education => self.education.len(),
            CollectionKind::Languages => self.languages.len(),
            CollectionKind::Certificates => self.certificates.len(),
            CollectionKind::References => self.references.len(),
        }
    }

    pub fn to_value(&self) -> Result<Value, DocumentError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_document_shape() {
        let doc = default_document();
        assert_eq!(doc.experience.len(), 1);
        assert!(doc.experience[0].is_blank());
        assert!(doc.education.is_empty());
        assert_eq!(doc.metadata.template_id, TemplateId::Modern);
        assert_eq!(doc.metadata.theme_color, DEFAULT_THEME_COLOR);
        assert!(doc.is_pristine());
    }

    #[test]
    fn test_default_document_serializes_wire_names() {
        let value = default_document().to_value().unwrap();
        assert!(value["metadata"]["templateId"].is_string());
        assert!(value["personal"]["photoUrl"].is_string());
        assert!(value["personal"]["signatureUrl"].is_string());
        assert_eq!(value["sectionOrder"].as_array().unwrap().len(), 8);
        assert_eq!(value["sectionOrder"][0], json!("personal"));
        assert!(value["experience"][0]["startDate"].is_string());
    }

    #[test]
    fn test_unknown_template_falls_back_to_default() {
        let meta: Metadata =
            serde_json::from_value(json!({"templateId": "brutalist", "themeColor": "#000"}))
                .unwrap();
        assert_eq!(meta.template_id, TemplateId::Modern);
        assert_eq!(meta.theme_color, "#000");
    }

    #[test]
    fn test_language_blank_defaults_to_intermediate() {
        let lang = LanguageEntry::blank(EntityId::generate());
        assert_eq!(lang.proficiency, "intermediate");
        assert!(lang.language.is_empty());
    }

    #[test]
    fn test_entity_id_accepts_legacy_numbers() {
        let entry: WorkEntry =
            serde_json::from_value(json!({"id": 1712345678901u64, "company": "Acme"})).unwrap();
        assert_eq!(entry.id, EntityId::Numeric(1_712_345_678_901));
        assert_eq!("1712345678901".parse::<EntityId>().unwrap(), entry.id);
    }

    #[test]
    fn test_entity_extra_fields_survive_round_trip() {
        let raw = json!({"id": "a", "company": "Acme", "location": "Lisbon"});
        let entry: WorkEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.extra.get("location"), Some(&json!("Lisbon")));
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["location"], json!("Lisbon"));
    }

    #[test]
    fn test_lenient_numeric_phone() {
        let personal: PersonalInfo = serde_json::from_value(json!({"phone": 5551234})).unwrap();
        assert_eq!(personal.phone, "5551234");
    }

    #[test]
    fn test_media_slot_parses_field_names() {
        assert_eq!("photo".parse::<MediaSlot>().unwrap(), MediaSlot::Photo);
        assert_eq!("signatureUrl".parse::<MediaSlot>().unwrap(), MediaSlot::Signature);
        assert!("avatar".parse::<MediaSlot>().is_err());
    }

    #[test]
    fn test_is_pristine_detects_edits() {
        let mut doc = default_document();
        doc.personal.first_name = "Ada".to_string();
        assert!(!doc.is_pristine());
    }
}
