//! Discrete update operations on a [`ResumeDocument`].
//!
//! Each operation returns whether the document actually changed, which is what the
//! synchronizer uses to decide whether to raise the dirty flag.

use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::document::model::{CollectionKind, Entity, EntityId, MediaSlot, ResumeDocument};
use crate::document::section::{SectionId, SectionOrder};
use crate::document::DocumentError;

/// The singleton records that accept shallow partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSection {
    Metadata,
    Personal,
}

impl FromStr for RecordSection {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metadata" => Ok(RecordSection::Metadata),
            "personal" => Ok(RecordSection::Personal),
            other => match other.parse::<SectionId>() {
                Ok(_) => Err(DocumentError::NotARecord {
                    section: other.to_string(),
                }),
                Err(e) => Err(e),
            },
        }
    }
}

macro_rules! on_collection {
    ($doc:expr, $kind:expr, $items:ident => $body:expr) => {
        match $kind {
            CollectionKind::Experience => {
                let $items = &mut $doc.experience;
                $body
            }
            CollectionKind::Internships => {
                let $items = &mut $doc.internships;
                $body
            }
            CollectionKind::Education => {
                let $items = &mut $doc.education;
                $body
            }
            CollectionKind::Languages => {
                let $items = &mut $doc.languages;
                $body
            }
            CollectionKind::Certificates => {
                let $items = &mut $doc.certificates;
                $body
            }
            CollectionKind::References => {
                let $items = &mut $doc.references;
                $body
            }
        }
    };
}

impl ResumeDocument {
    /// Shallow-merges `partial` into `metadata` or `personal`. Keys the schema does not
    /// know are kept in the record's extra map.
    pub fn update_section(
        &mut self,
        section: RecordSection,
        partial: Map<String, Value>,
    ) -> Result<bool, DocumentError> {
        match section {
            RecordSection::Metadata => merge_record(&mut self.metadata, partial),
            RecordSection::Personal => merge_record(&mut self.personal, partial),
        }
    }

    /// Appends a zero-valued entity with a fresh id and returns that id.
    pub fn add_entity(&mut self, kind: CollectionKind) -> EntityId {
        on_collection!(self, kind, items => push_blank(items))
    }

    /// Sets one field of one entity. Returns `Ok(false)` when no entity has `id`.
    pub fn update_entity(
        &mut self,
        kind: CollectionKind,
        id: &EntityId,
        field: &str,
        value: Value,
    ) -> Result<bool, DocumentError> {
        if field == "id" {
            return Err(DocumentError::ImmutableField(field.to_string()));
        }
        on_collection!(self, kind, items => {
            match items.iter_mut().find(|e| e.id() == id) {
                Some(entity) => set_field(entity, field, value),
                None => Ok(false),
            }
        })
    }

    /// Finds the id whose textual form is `raw`. Path segments carry no type, so a
    /// digit string matches both legacy numeric ids and digit-only text ids.
    pub fn find_entity_id(&self, kind: CollectionKind, raw: &str) -> Option<EntityId> {
        fn find<E: Entity>(items: &[E], raw: &str) -> Option<EntityId> {
            items
                .iter()
                .map(Entity::id)
                .find(|id| id.to_string() == raw)
                .cloned()
        }
        match kind {
            CollectionKind::Experience => find(&self.experience, raw),
            CollectionKind::Internships => find(&self.internships, raw),
            CollectionKind::Education => find(&self.education, raw),
            CollectionKind::Languages => find(&self.languages, raw),
            CollectionKind::Certificates => find(&self.certificates, raw),
            CollectionKind::References => find(&self.references, raw),
        }
    }

    /// Removes the entity with `id`. Removing an absent id is a no-op returning `false`.
    pub fn remove_entity(&mut self, kind: CollectionKind, id: &EntityId) -> bool {
        on_collection!(self, kind, items => {
            let before = items.len();
            items.retain(|e| e.id() != id);
            items.len() != before
        })
    }

    /// Replaces the skill list, dropping exact duplicates (first occurrence wins).
    pub fn set_skills(&mut self, skills: Vec<String>) -> bool {
        let mut deduped: Vec<String> = Vec::with_capacity(skills.len());
        for skill in skills {
            if !deduped.contains(&skill) {
                deduped.push(skill);
            }
        }
        if deduped == self.skills {
            return false;
        }
        self.skills = deduped;
        true
    }

    /// Appends a trimmed, non-empty label unless it is already present.
    pub fn add_skill(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.skills.iter().any(|s| s == label) {
            return false;
        }
        self.skills.push(label.to_string());
        true
    }

    pub fn remove_skill(&mut self, label: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != label);
        self.skills.len() != before
    }

    /// Replaces the section order. Anything but a permutation of the known sections
    /// is rejected untouched.
    pub fn reorder_sections(&mut self, order: Vec<SectionId>) -> Result<bool, DocumentError> {
        let order = SectionOrder::try_new(order)?;
        if order == self.section_order {
            return Ok(false);
        }
        self.section_order = order;
        Ok(true)
    }

    pub fn set_media_url(&mut self, slot: MediaSlot, url: String) -> bool {
        let field = self.personal.media_url_mut(slot);
        if *field == url {
            return false;
        }
        *field = url;
        true
    }

    /// Blanks media fields holding session-local preview references.
    pub fn strip_ephemeral_media(&mut self) -> bool {
        let mut changed = false;
        for slot in MediaSlot::ALL {
            let field = self.personal.media_url_mut(slot);
            if is_ephemeral_media(field) {
                field.clear();
                changed = true;
            }
        }
        changed
    }

    /// Wire form for the stores: never carries ephemeral media references.
    pub fn persisted_value(&self) -> Result<Value, DocumentError> {
        let mut doc = self.clone();
        doc.strip_ephemeral_media();
        doc.to_value()
    }
}

/// Prefix of preview references that only mean something inside one session.
pub const EPHEMERAL_MEDIA_PREFIX: &str = "blob:";

pub fn is_ephemeral_media(url: &str) -> bool {
    url.starts_with(EPHEMERAL_MEDIA_PREFIX)
}

/// A fresh ephemeral reference for `slot`: `blob:pending/<slot>/<uuid>`.
pub fn ephemeral_media_ref(slot: MediaSlot) -> String {
    format!("{EPHEMERAL_MEDIA_PREFIX}pending/{slot}/{}", uuid::Uuid::new_v4())
}

fn push_blank<E: Entity>(items: &mut Vec<E>) -> EntityId {
    let id = fresh_id(items);
    items.push(E::blank(id.clone()));
    id
}

/// A generated id that no entity in `items` carries yet.
pub(crate) fn fresh_id<E: Entity>(items: &[E]) -> EntityId {
    loop {
        let id = EntityId::generate();
        if !items.iter().any(|e| e.id() == &id) {
            return id;
        }
    }
}

fn set_field<E: Entity>(entity: &mut E, field: &str, value: Value) -> Result<bool, DocumentError> {
    let mut partial = Map::new();
    partial.insert(field.to_string(), value);
    merge_record(entity, partial)
}

/// Overlays `partial` onto the serialized form of `record` and reads it back.
fn merge_record<T>(record: &mut T, partial: Map<String, Value>) -> Result<bool, DocumentError>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let mut fields = match serde_json::to_value(&*record)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.extend(partial);
    let merged: T = serde_json::from_value(Value::Object(fields))?;
    if merged == *record {
        return Ok(false);
    }
    *record = merged;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{default_document, TemplateId};
    use serde_json::json;

    fn partial(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test helper expects an object"),
        }
    }

    #[test]
    fn test_update_section_personal_merges_shallowly() {
        let mut doc = default_document();
        doc.personal.email = "ada@example.com".to_string();
        let changed = doc
            .update_section(
                RecordSection::Personal,
                partial(json!({"firstName": "Ada", "pronouns": "she/her"})),
            )
            .unwrap();
        assert!(changed);
        assert_eq!(doc.personal.first_name, "Ada");
        assert_eq!(doc.personal.email, "ada@example.com");
        assert_eq!(doc.personal.extra.get("pronouns"), Some(&json!("she/her")));
    }

    #[test]
    fn test_ephemeral_media_never_reaches_persisted_value() {
        let mut doc = default_document();
        let preview = ephemeral_media_ref(MediaSlot::Photo);
        assert!(preview.starts_with("blob:pending/photo/"));
        doc.set_media_url(MediaSlot::Photo, preview);
        doc.set_media_url(MediaSlot::Signature, "https://cdn.example/sig.png".to_string());

        let value = doc.persisted_value().unwrap();
        assert_eq!(value["personal"]["photoUrl"], json!(""));
        assert_eq!(value["personal"]["signatureUrl"], json!("https://cdn.example/sig.png"));
        assert!(is_ephemeral_media(&doc.personal.photo_url));

        assert!(doc.strip_ephemeral_media());
        assert!(!doc.strip_ephemeral_media());
        assert!(doc.personal.photo_url.is_empty());
    }

    #[test]
    fn test_update_section_metadata_switches_template() {
        let mut doc = default_document();
        doc.update_section(RecordSection::Metadata, partial(json!({"templateId": "classic"})))
            .unwrap();
        assert_eq!(doc.metadata.template_id, TemplateId::Classic);
    }

    #[test]
    fn test_update_section_without_change_reports_false() {
        let mut doc = default_document();
        let changed = doc
            .update_section(RecordSection::Personal, partial(json!({"firstName": ""})))
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_record_section_rejects_collections() {
        assert!(matches!(
            "experience".parse::<RecordSection>(),
            Err(DocumentError::NotARecord { .. })
        ));
        assert!(matches!(
            "hobbies".parse::<RecordSection>(),
            Err(DocumentError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_add_entity_assigns_unique_ids() {
        let mut doc = default_document();
        let a = doc.add_entity(CollectionKind::Education);
        let b = doc.add_entity(CollectionKind::Education);
        assert_ne!(a, b);
        assert_eq!(doc.education.len(), 2);
        assert!(doc.education[0].school.is_empty());
    }

    #[test]
    fn test_update_entity_sets_field() {
        let mut doc = default_document();
        let id = doc.experience[0].id.clone();
        let changed = doc
            .update_entity(CollectionKind::Experience, &id, "company", json!("Acme"))
            .unwrap();
        assert!(changed);
        assert_eq!(doc.experience[0].company, "Acme");
    }

    #[test]
    fn test_update_entity_missing_id_is_reported() {
        let mut doc = default_document();
        let changed = doc
            .update_entity(
                CollectionKind::Experience,
                &EntityId::Text("nope".into()),
                "company",
                json!("Acme"),
            )
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_update_entity_in_every_collection() {
        let mut doc = default_document();
        for (kind, field) in [
            (CollectionKind::Internships, "company"),
            (CollectionKind::Education, "school"),
            (CollectionKind::Languages, "language"),
            (CollectionKind::Certificates, "issuer"),
            (CollectionKind::References, "position"),
        ] {
            let id = doc.add_entity(kind);
            assert!(doc.update_entity(kind, &id, field, json!("Set")).unwrap(), "{kind}");
            assert!(!doc.update_entity(kind, &id, field, json!("Set")).unwrap(), "{kind}");
        }
        assert_eq!(doc.education[0].school, "Set");
        assert_eq!(doc.languages[0].proficiency, "intermediate");
    }

    #[test]
    fn test_find_entity_id_matches_textual_form() {
        let mut doc = crate::document::load_document(json!({
            "education": [
                {"id": "1712345678901", "school": "MIT"},
                {"id": 1712345678902u64, "school": "ETH"},
                {"id": "007", "school": "Bond"}
            ]
        }));
        let kind = CollectionKind::Education;
        assert_eq!(
            doc.find_entity_id(kind, "1712345678901"),
            Some(EntityId::Text("1712345678901".into()))
        );
        assert_eq!(
            doc.find_entity_id(kind, "1712345678902"),
            Some(EntityId::Numeric(1712345678902))
        );
        assert_eq!(doc.find_entity_id(kind, "7"), None);
        assert_eq!(doc.find_entity_id(CollectionKind::References, "007"), None);

        let id = doc.find_entity_id(kind, "007").unwrap();
        assert!(doc.remove_entity(kind, &id));
        assert_eq!(doc.education.len(), 2);
    }

    #[test]
    fn test_update_entity_refuses_id_field() {
        let mut doc = default_document();
        let id = doc.experience[0].id.clone();
        assert!(matches!(
            doc.update_entity(CollectionKind::Experience, &id, "id", json!("x")),
            Err(DocumentError::ImmutableField(_))
        ));
    }

    #[test]
    fn test_remove_entity_is_idempotent() {
        let mut doc = default_document();
        let id = doc.add_entity(CollectionKind::References);
        assert!(doc.remove_entity(CollectionKind::References, &id));
        let after_once = doc.clone();
        assert!(!doc.remove_entity(CollectionKind::References, &id));
        assert_eq!(doc, after_once);
    }

    #[test]
    fn test_set_skills_deduplicates_exact_labels() {
        let mut doc = default_document();
        doc.set_skills(vec![
            "Rust".into(),
            "Go".into(),
            "Rust".into(),
            "rust".into(),
        ]);
        assert_eq!(doc.skills, vec!["Rust", "Go", "rust"]);
    }

    #[test]
    fn test_add_skill_trims_and_ignores_duplicates() {
        let mut doc = default_document();
        assert!(doc.add_skill("  SQL "));
        assert!(!doc.add_skill("SQL"));
        assert!(!doc.add_skill("   "));
        assert_eq!(doc.skills, vec!["SQL"]);
        assert!(doc.remove_skill("SQL"));
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_reorder_sections_rejects_invalid_without_mutation() {
        let mut doc = default_document();
        let before = doc.section_order.clone();
        let err = doc.reorder_sections(vec![SectionId::Skills, SectionId::Skills]);
        assert!(err.is_err());
        assert_eq!(doc.section_order, before);
    }

    #[test]
    fn test_example_scenario_add_remove_rotate() {
        let mut doc = default_document();
        let first = doc.add_entity(CollectionKind::Education);
        let second = doc.add_entity(CollectionKind::Education);
        doc.remove_entity(CollectionKind::Education, &first);
        assert_eq!(doc.education.len(), 1);
        assert_eq!(doc.education[0].id, second);
        assert_eq!(doc.section_order, SectionOrder::default());

        let mut rotated = doc.section_order.as_slice().to_vec();
        rotated.rotate_left(1);
        doc.reorder_sections(rotated.clone()).unwrap();
        assert_eq!(doc.section_order.as_slice(), rotated.as_slice());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::document::model::default_document;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        RemoveFirst(usize),
        Reorder(Vec<usize>),
        Skills(Vec<String>),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6).prop_map(Op::Add),
            (0usize..6).prop_map(Op::RemoveFirst),
            proptest::collection::vec(0usize..8, 0..12).prop_map(Op::Reorder),
            proptest::collection::vec("[a-c]{1,2}", 0..6).prop_map(Op::Skills),
        ]
    }

    proptest! {
        #[test]
        fn prop_section_order_stays_a_permutation(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut doc = default_document();
            for op in ops {
                match op {
                    Op::Add(k) => { doc.add_entity(CollectionKind::ALL[k]); }
                    Op::RemoveFirst(k) => {
                        let kind = CollectionKind::ALL[k];
                        let id = match kind {
                            CollectionKind::Experience => doc.experience.first().map(|e| e.id.clone()),
                            CollectionKind::Education => doc.education.first().map(|e| e.id.clone()),
                            _ => None,
                        };
                        if let Some(id) = id {
                            doc.remove_entity(kind, &id);
                        }
                    }
                    Op::Reorder(indices) => {
                        let order: Vec<SectionId> = indices.into_iter().map(|i| SectionId::ALL[i]).collect();
                        let _ = doc.reorder_sections(order);
                    }
                    Op::Skills(skills) => { doc.set_skills(skills); }
                }
                let order = doc.section_order.as_slice();
                prop_assert_eq!(order.len(), SectionId::ALL.len());
                for id in SectionId::ALL {
                    prop_assert_eq!(order.iter().filter(|s| **s == id).count(), 1);
                }
            }
        }

        #[test]
        fn prop_entity_ids_unique_after_adds(adds in proptest::collection::vec(0usize..6, 0..30)) {
            let mut doc = default_document();
            for k in adds {
                doc.add_entity(CollectionKind::ALL[k]);
            }
            let mut ids: Vec<String> = doc.education.iter().map(|e| e.id.to_string()).collect();
            let len = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
        }
    }
}
