//! Section identifiers and the always-a-permutation section order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::document::DocumentError;

/// Recognized resume sections.
///
/// The wire names are stable and must never be renumbered or renamed; persisted
/// documents from every earlier version refer to sections by these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Personal,
    Experience,
    Internships,
    Education,
    Skills,
    Languages,
    Certificates,
    References,
}

impl SectionId {
    /// Every known section, in default display order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Personal,
        SectionId::Experience,
        SectionId::Internships,
        SectionId::Education,
        SectionId::Skills,
        SectionId::Languages,
        SectionId::Certificates,
        SectionId::References,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Personal => "personal",
            SectionId::Experience => "experience",
            SectionId::Internships => "internships",
            SectionId::Education => "education",
            SectionId::Skills => "skills",
            SectionId::Languages => "languages",
            SectionId::Certificates => "certificates",
            SectionId::References => "references",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DocumentError::UnknownSection(s.to_string()))
    }
}

/// The user-controlled display order of sections.
///
/// Invariant: always exactly a permutation of [`SectionId::ALL`]. The only ways to
/// build one are [`SectionOrder::default`], [`SectionOrder::try_new`] (strict) and
/// [`SectionOrder::normalize`] (lenient, for persisted input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionOrder(Vec<SectionId>);

impl Default for SectionOrder {
    fn default() -> Self {
        SectionOrder(SectionId::ALL.to_vec())
    }
}

impl SectionOrder {
    /// Accepts `order` only if it is a permutation of the known identifier set.
    pub fn try_new(order: Vec<SectionId>) -> Result<Self, DocumentError> {
        if is_permutation(&order) {
            Ok(SectionOrder(order))
        } else {
            Err(DocumentError::InvalidSectionOrder(order))
        }
    }

    /// Repairs an order read from storage: unknown names and duplicates are dropped,
    /// known sections that are missing are appended in default order.
    pub fn normalize<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order: Vec<SectionId> = Vec::with_capacity(SectionId::ALL.len());
        for name in raw {
            match name.as_ref().parse::<SectionId>() {
                Ok(id) if !order.contains(&id) => order.push(id),
                Ok(id) => warn!(section = %id, "Dropping duplicate section in persisted order"),
                Err(_) => warn!(
                    section = name.as_ref(),
                    "Dropping unrecognized section in persisted order"
                ),
            }
        }
        for id in SectionId::ALL {
            if !order.contains(&id) {
                order.push(id);
            }
        }
        SectionOrder(order)
    }

    /// Lenient construction from an arbitrary JSON value; non-arrays yield the default.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                SectionOrder::normalize(items.iter().filter_map(|v| v.as_str()))
            }
            _ => SectionOrder::default(),
        }
    }

    pub fn as_slice(&self) -> &[SectionId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.0.iter().copied()
    }

    /// Position of `id` in the order. Always `Some` because of the permutation invariant.
    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.0.iter().position(|s| *s == id)
    }
}

impl<'de> Deserialize<'de> for SectionOrder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(SectionOrder::from_value(&value))
    }
}

fn is_permutation(order: &[SectionId]) -> bool {
    if order.len() != SectionId::ALL.len() {
        return false;
    }
    SectionId::ALL.iter().all(|id| order.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_order_is_canonical() {
        assert_eq!(SectionOrder::default().as_slice(), &SectionId::ALL);
    }

    #[test]
    fn test_try_new_accepts_rotation() {
        let mut rotated = SectionId::ALL.to_vec();
        rotated.rotate_left(1);
        let order = SectionOrder::try_new(rotated.clone()).unwrap();
        assert_eq!(order.as_slice(), rotated.as_slice());
    }

    #[test]
    fn test_try_new_rejects_subset() {
        let subset = SectionId::ALL[..7].to_vec();
        assert!(matches!(
            SectionOrder::try_new(subset),
            Err(DocumentError::InvalidSectionOrder(_))
        ));
    }

    #[test]
    fn test_try_new_rejects_duplicates() {
        let mut dup = SectionId::ALL.to_vec();
        dup[1] = SectionId::Personal;
        assert!(SectionOrder::try_new(dup).is_err());
    }

    #[test]
    fn test_normalize_appends_missing_sections() {
        // An older document that predates internships and references.
        let order = SectionOrder::normalize(["education", "personal", "experience"]);
        assert_eq!(
            order.as_slice()[..3].to_vec(),
            vec![
                SectionId::Education,
                SectionId::Personal,
                SectionId::Experience
            ]
        );
        assert_eq!(order.as_slice().len(), 8);
        assert!(order.position(SectionId::Internships).is_some());
        assert!(order.position(SectionId::References).is_some());
    }

    #[test]
    fn test_normalize_drops_unknown_and_duplicates() {
        let order = SectionOrder::normalize(["skills", "hobbies", "skills", "personal"]);
        assert_eq!(order.as_slice()[0], SectionId::Skills);
        assert_eq!(order.as_slice()[1], SectionId::Personal);
        assert_eq!(order.as_slice().len(), 8);
    }

    #[test]
    fn test_deserialize_non_array_falls_back_to_default() {
        let order: SectionOrder = serde_json::from_value(json!("personal")).unwrap();
        assert_eq!(order, SectionOrder::default());
    }

    #[test]
    fn test_section_id_round_trips_through_str() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
        }
        assert!("hobbies".parse::<SectionId>().is_err());
    }
}
