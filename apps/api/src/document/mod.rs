//! Document Model: the `ResumeDocument` schema, its default factory, the discrete
//! update operations and the merge-with-defaults loader.

pub mod lenient;
pub mod load;
pub mod model;
pub mod ops;
pub mod section;

use thiserror::Error;

pub use load::load_document;
pub use model::{
    default_document, CertificateEntry, CollectionKind, EducationEntry, Entity, EntityId,
    LanguageEntry, MediaSlot, Metadata, PersonalInfo, ReferenceEntry, ResumeDocument, TemplateId,
    WorkEntry,
};
pub use ops::{ephemeral_media_ref, is_ephemeral_media, RecordSection};
pub use section::{SectionId, SectionOrder};

/// Rejections at the Document Model boundary. These indicate caller bugs rather than
/// user-facing conditions; the UI is expected never to trigger them.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("section order must be a permutation of the known sections, got {0:?}")]
    InvalidSectionOrder(Vec<SectionId>),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("unknown media slot '{0}'")]
    UnknownMediaSlot(String),

    #[error("'{section}' cannot be updated as a record; only metadata and personal can")]
    NotARecord { section: String },

    #[error("field '{0}' is immutable")]
    ImmutableField(String),

    #[error("document (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
