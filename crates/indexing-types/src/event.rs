//! Event payloads delivered by the data store's event handlers.
//!
//! The raw payload is loosely typed JSON; [`ObjectEvent`] is the
//! validated form the engine matches on.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::identity::Avu;
use crate::target::INDEXING_ATTRIBUTE;

/// Raw event parameters as delivered by an event handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventParameters {
    /// Event name (e.g., "PUT", "METADATA"), matched case-insensitively
    #[serde(default)]
    pub event: Option<String>,

    /// Logical path of the affected object
    #[serde(default, alias = "obj_path")]
    pub logical_path: Option<String>,

    /// Metadata applied by a metadata event
    #[serde(default)]
    pub metadata: Option<MetadataPayload>,

    /// Metadata that satisfied the handler's conditional
    #[serde(default)]
    pub conditional_metadata: Option<MetadataPayload>,
}

/// Metadata section of an event payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataPayload {
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
}

impl MetadataPayload {
    /// True when the attribute is the indexing marker.
    pub fn is_indexing_marker(&self) -> bool {
        self.attribute.as_deref() == Some(INDEXING_ATTRIBUTE)
    }

    /// Triple with attribute and value required; missing units become empty.
    pub fn avu(&self) -> Result<Avu, PolicyError> {
        match (&self.attribute, &self.value) {
            (Some(a), Some(v)) => Ok(Avu::new(
                a.clone(),
                v.clone(),
                self.units.clone().unwrap_or_default(),
            )),
            _ => Err(self.incomplete()),
        }
    }

    /// Triple with attribute, value and units all required.
    pub fn complete_avu(&self) -> Result<Avu, PolicyError> {
        if self.units.is_none() {
            return Err(self.incomplete());
        }
        self.avu()
    }

    fn incomplete(&self) -> PolicyError {
        PolicyError::InvalidInput(format!(
            "metadata is not complete [{}]",
            serde_json::to_string(self).unwrap_or_default()
        ))
    }
}

/// Data store event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Put,
    Write,
    Metadata,
    Unlink,
    Unregister,
}

impl EventKind {
    /// Case-insensitive parse; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "PUT" => Some(EventKind::Put),
            "WRITE" => Some(EventKind::Write),
            "METADATA" => Some(EventKind::Metadata),
            "UNLINK" => Some(EventKind::Unlink),
            "UNREGISTER" => Some(EventKind::Unregister),
            _ => None,
        }
    }
}

/// Kind of catalog entry a metadata event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    DataObject,
    Collection,
}

impl EntityType {
    pub fn parse(name: &str) -> Result<Self, PolicyError> {
        match name {
            "data_object" => Ok(EntityType::DataObject),
            "collection" => Ok(EntityType::Collection),
            other => Err(PolicyError::Unsupported(format!(
                "entity_type is not supported [{}]",
                other
            ))),
        }
    }
}

/// Operation performed by a metadata event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOperation {
    Add,
    Set,
    Remove,
    Other(String),
}

impl MetadataOperation {
    pub fn parse(name: &str) -> Self {
        match name {
            "add" => MetadataOperation::Add,
            "set" => MetadataOperation::Set,
            "rm" => MetadataOperation::Remove,
            other => MetadataOperation::Other(other.to_string()),
        }
    }

    /// Add and set create index documents.
    pub fn is_index(&self) -> bool {
        matches!(self, MetadataOperation::Add | MetadataOperation::Set)
    }

    pub fn is_purge(&self) -> bool {
        matches!(self, MetadataOperation::Remove)
    }
}

/// A validated event on one logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectEvent {
    Put,
    Write,
    Unlink,
    Unregister,
    Metadata {
        operation: MetadataOperation,
        avu: Avu,
        entity_type: EntityType,
    },
}

impl ObjectEvent {
    /// True when a metadata event applies the indexing marker itself.
    pub fn touches_marker(&self) -> bool {
        matches!(self, ObjectEvent::Metadata { avu, .. } if avu.attribute == INDEXING_ATTRIBUTE)
    }
}

/// An event resolved to its logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEvent {
    pub logical_path: String,
    pub event: ObjectEvent,
}

impl PathEvent {
    /// Validate raw parameters.
    ///
    /// Returns `Ok(None)` for missing or unrecognized event names, which
    /// callers treat as nothing to do.
    pub fn from_parameters(params: &EventParameters) -> Result<Option<Self>, PolicyError> {
        let Some(kind) = params.event.as_deref().and_then(EventKind::parse) else {
            return Ok(None);
        };

        let event = match kind {
            EventKind::Put => ObjectEvent::Put,
            EventKind::Write => ObjectEvent::Write,
            EventKind::Unlink => ObjectEvent::Unlink,
            EventKind::Unregister => ObjectEvent::Unregister,
            EventKind::Metadata => {
                let md = params.metadata.as_ref().ok_or_else(|| {
                    PolicyError::InvalidInput("metadata object is missing".to_string())
                })?;
                let entity_type = md.entity_type.as_deref().ok_or_else(|| {
                    PolicyError::InvalidInput("metadata entity_type is missing".to_string())
                })?;
                ObjectEvent::Metadata {
                    operation: MetadataOperation::parse(md.operation.as_deref().unwrap_or("")),
                    avu: md.avu()?,
                    entity_type: EntityType::parse(entity_type)?,
                }
            }
        };

        let logical_path = params
            .logical_path
            .clone()
            .or_else(|| params.metadata.as_ref().and_then(|md| md.entity.clone()))
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PolicyError::InvalidInput("logical path is missing".to_string()))?;

        Ok(Some(Self {
            logical_path,
            event,
        }))
    }
}
