//! Merge-with-defaults loading of persisted documents.
//!
//! Whatever a store hands back (an older schema, a partial object, arrays flattened
//! into index-keyed objects) is folded onto the default factory field by field and
//! collection by collection. Missing fields take defaults, unknown fields are kept,
//! and nothing here is fatal.

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::document::lenient;
use crate::document::model::{default_document, Entity, EntityId, ResumeDocument};
use crate::document::section::SectionOrder;

/// Builds a complete document from raw persisted JSON.
pub fn load_document(raw: Value) -> ResumeDocument {
    let mut doc = default_document();
    let mut fields = match raw {
        Value::Object(fields) => fields,
        Value::Null => return doc,
        other => {
            warn!(
                kind = json_kind(&other),
                "Persisted document is not an object, starting from defaults"
            );
            return doc;
        }
    };

    if let Some(value) = fields.remove("metadata") {
        doc.metadata = load_record(value, doc.metadata, "metadata");
    }
    if let Some(value) = fields.remove("personal") {
        doc.personal = load_record(value, doc.personal, "personal");
    }
    if let Some(items) = fields.remove("experience").and_then(|v| load_collection(v, "experience")) {
        doc.experience = items;
    }
    if let Some(items) = fields.remove("internships").and_then(|v| load_collection(v, "internships")) {
        doc.internships = items;
    }
    if let Some(items) = fields.remove("education").and_then(|v| load_collection(v, "education")) {
        doc.education = items;
    }
    if let Some(items) = fields.remove("languages").and_then(|v| load_collection(v, "languages")) {
        doc.languages = items;
    }
    if let Some(items) = fields.remove("certificates").and_then(|v| load_collection(v, "certificates")) {
        doc.certificates = items;
    }
    if let Some(items) = fields.remove("references").and_then(|v| load_collection(v, "references")) {
        doc.references = items;
    }
    if let Some(value) = fields.remove("skills") {
        doc.skills = load_skills(value);
    }
    if let Some(value) = fields.remove("sectionOrder") {
        doc.section_order = SectionOrder::from_value(&value);
    }

    doc.extra = fields;
    doc
}

/// Overlays a persisted record onto `default`.
fn load_record<T>(value: Value, default: T, name: &str) -> T
where
    T: Serialize + DeserializeOwned,
{
    let partial = match value {
        Value::Object(partial) => partial,
        Value::Null => return default,
        other => {
            warn!(
                record = name,
                kind = json_kind(&other),
                "Persisted record is not an object, using defaults"
            );
            return default;
        }
    };
    let mut fields = match serde_json::to_value(&default) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };
    fields.extend(partial);
    match serde_json::from_value(Value::Object(fields)) {
        Ok(record) => record,
        Err(e) => {
            warn!(record = name, error = %e, "Persisted record is unreadable, using defaults");
            default
        }
    }
}

/// Reads one entity collection. Returns `None` when the stored value is not a
/// collection at all, in which case the caller keeps the factory default.
///
/// Each entry is overlaid onto a blank entity. Missing or duplicated ids are
/// replaced with fresh ones so that ids stay unique.
fn load_collection<E: Entity>(value: Value, name: &str) -> Option<Vec<E>> {
    let Some(items) = lenient::array_items(value) else {
        warn!(collection = name, "Persisted collection is not a list, using defaults");
        return None;
    };

    let mut seen: HashSet<EntityId> = HashSet::with_capacity(items.len());
    let mut entities: Vec<E> = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut fields) = item else {
            warn!(collection = name, "Skipping non-object entry");
            continue;
        };
        let id = match fields.get("id").and_then(EntityId::from_value) {
            Some(id) if !seen.contains(&id) => id,
            _ => {
                let mut id = EntityId::generate();
                while seen.contains(&id) {
                    id = EntityId::generate();
                }
                warn!(collection = name, new_id = %id, "Repaired missing or duplicate entity id");
                id
            }
        };
        fields.remove("id");
        let mut merged = match serde_json::to_value(E::blank(id.clone())) {
            Ok(Value::Object(blank)) => blank,
            _ => Map::new(),
        };
        merged.extend(fields);
        let entity: E = match serde_json::from_value(Value::Object(merged)) {
            Ok(entity) => entity,
            Err(e) => {
                warn!(collection = name, error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        seen.insert(id);
        entities.push(entity);
    }
    Some(entities)
}

fn load_skills(value: Value) -> Vec<String> {
    let Some(items) = lenient::array_items(value) else {
        return Vec::new();
    };
    let mut skills: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let label = match item {
            Value::String(s) => s,
            Value::Object(mut fields) => match fields.remove("name") {
                Some(name) => lenient::value_to_string(name),
                None => continue,
            },
            Value::Null => continue,
            other => lenient::value_to_string(other),
        };
        if !label.is_empty() && !skills.contains(&label) {
            skills.push(label);
        }
    }
    skills
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
