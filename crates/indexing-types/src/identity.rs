//! Catalog identities and attribute/value/units triples.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::target::INDEXER_SEPARATOR;

/// Stable, store-unique identifier of a collection or data object.
///
/// Document ids are built by appending the separator to this value, so
/// an identity may never contain the separator itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectIdentity(String);

impl ObjectIdentity {
    /// Validate a raw catalog id.
    pub fn new(id: impl Into<String>) -> Result<Self, PolicyError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PolicyError::InvalidInput(
                "catalog returned an empty object id".to_string(),
            ));
        }
        if id.contains(INDEXER_SEPARATOR) {
            return Err(PolicyError::InvalidInput(format!(
                "object id [{}] contains the reserved separator [{}]",
                id, INDEXER_SEPARATOR
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attribute/value/units triple attached to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avu {
    pub attribute: String,
    pub value: String,
    #[serde(default)]
    pub units: String,
}

impl Avu {
    pub fn new(
        attribute: impl Into<String>,
        value: impl Into<String>,
        units: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            units: units.into(),
        }
    }
}

impl std::fmt::Display for Avu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] [{}] [{}]", self.attribute, self.value, self.units)
    }
}
