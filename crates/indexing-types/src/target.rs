//! Index targets parsed from the indexing marker.
//!
//! A collection or object opts into indexing by carrying the marker
//! triple `irods::indexing::index` = `<index name>::<index type>` with
//! units `elasticsearch`.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::event::{EventParameters, MetadataPayload};

/// Separator between an object id and its document suffix, and between
/// index name and index type in the marker value.
pub const INDEXER_SEPARATOR: &str = "::";

/// Attribute name of the indexing marker.
pub const INDEXING_ATTRIBUTE: &str = "irods::indexing::index";

/// Units value of the indexing marker.
pub const ELASTICSEARCH_UNITS: &str = "elasticsearch";

/// Kind of index a marker requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// One document per attribute/value/units triple
    Metadata,
    /// Object content split into chunk documents
    FullText,
}

impl IndexType {
    /// Parse the type token of a marker value.
    pub fn parse(token: &str) -> Result<Self, PolicyError> {
        match token {
            "metadata" => Ok(IndexType::Metadata),
            "full_text" => Ok(IndexType::FullText),
            other => Err(PolicyError::InvalidInput(format!(
                "indexing invoked with invalid type [{}]",
                other
            ))),
        }
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexType::Metadata => write!(f, "metadata"),
            IndexType::FullText => write!(f, "full_text"),
        }
    }
}

/// Name and type of the search index an operation writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub name: String,
    pub index_type: IndexType,
}

impl IndexTarget {
    /// Parse `<name>::<type>`, splitting on the last separator.
    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let (name, token) = value.rsplit_once(INDEXER_SEPARATOR).ok_or_else(|| {
            PolicyError::InvalidInput(format!(
                "[{}] does not include an index separator",
                value
            ))
        })?;
        if name.is_empty() {
            return Err(PolicyError::InvalidInput(format!(
                "[{}] does not include an index name",
                value
            )));
        }
        Ok(Self {
            name: name.to_string(),
            index_type: IndexType::parse(token)?,
        })
    }

    /// Extract the target from the marker carried by the event.
    ///
    /// The applied metadata wins over the conditional metadata; one of
    /// them must be the indexing marker.
    pub fn from_parameters(params: &EventParameters) -> Result<Self, PolicyError> {
        let marker = [params.metadata.as_ref(), params.conditional_metadata.as_ref()]
            .into_iter()
            .flatten()
            .find(|md| md.is_indexing_marker())
            .ok_or_else(|| {
                PolicyError::InvalidInput(
                    "metadata did not include indexing configuration".to_string(),
                )
            })?;

        Self::from_marker(marker)
    }

    fn from_marker(md: &MetadataPayload) -> Result<Self, PolicyError> {
        let avu = md.complete_avu()?;
        if avu.units != ELASTICSEARCH_UNITS {
            return Err(PolicyError::InvalidInput(format!(
                "metadata did not include elasticsearch configuration {}",
                avu
            )));
        }
        Self::parse(&avu.value)
    }
}

impl std::fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.name, INDEXER_SEPARATOR, self.index_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(value: &str, units: &str) -> MetadataPayload {
        MetadataPayload {
            attribute: Some(INDEXING_ATTRIBUTE.to_string()),
            value: Some(value.to_string()),
            units: Some(units.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_target() {
        let target = IndexTarget::parse("books::full_text").unwrap();
        assert_eq!(target.name, "books");
        assert_eq!(target.index_type, IndexType::FullText);
        assert_eq!(target.to_string(), "books::full_text");
    }

    #[test]
    fn test_parse_splits_on_last_separator() {
        let target = IndexTarget::parse("lab::books::metadata").unwrap();
        assert_eq!(target.name, "lab::books");
        assert_eq!(target.index_type, IndexType::Metadata);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = IndexTarget::parse("books::vector").unwrap_err();
        assert!(err.to_string().contains("invalid type [vector]"));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(IndexTarget::parse("books").is_err());
        assert!(IndexTarget::parse("::metadata").is_err());
    }

    #[test]
    fn test_applied_metadata_wins() {
        let params = EventParameters {
            metadata: Some(marker("applied::metadata", ELASTICSEARCH_UNITS)),
            conditional_metadata: Some(marker("conditional::full_text", ELASTICSEARCH_UNITS)),
            ..Default::default()
        };
        let target = IndexTarget::from_parameters(&params).unwrap();
        assert_eq!(target.name, "applied");
    }

    #[test]
    fn test_conditional_metadata_used_when_applied_is_not_marker() {
        let params = EventParameters {
            metadata: Some(MetadataPayload {
                attribute: Some("author".to_string()),
                value: Some("jane".to_string()),
                ..Default::default()
            }),
            conditional_metadata: Some(marker("library::full_text", ELASTICSEARCH_UNITS)),
            ..Default::default()
        };
        let target = IndexTarget::from_parameters(&params).unwrap();
        assert_eq!(target.name, "library");
        assert_eq!(target.index_type, IndexType::FullText);
    }

    #[test]
    fn test_marker_requires_elasticsearch_units() {
        let params = EventParameters {
            conditional_metadata: Some(marker("library::full_text", "solr")),
            ..Default::default()
        };
        assert!(matches!(
            IndexTarget::from_parameters(&params),
            Err(PolicyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_marker_is_invalid_input() {
        let params = EventParameters::default();
        let err = IndexTarget::from_parameters(&params).unwrap_err();
        assert!(err.to_string().contains("indexing configuration"));
    }
}
