//! Search document identifiers.
//!
//! Chunk documents are `<object id>::<n>`; metadata documents are
//! `<object id>::<hex sha256 of attribute, value and units>`. Object ids
//! never contain the separator, so a document id always splits back into
//! its object id.

use sha2::{Digest, Sha256};

use indexing_types::{ObjectIdentity, INDEXER_SEPARATOR};

/// Document id of the `n`th content chunk of an object.
pub fn chunk_id(object_id: &ObjectIdentity, n: u64) -> String {
    format!("{}{}{}", object_id, INDEXER_SEPARATOR, n)
}

/// Document id of one metadata triple on an object.
///
/// The three fields are hashed back to back with no delimiter.
pub fn metadata_id(object_id: &ObjectIdentity, attribute: &str, value: &str, units: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(attribute.as_bytes());
    hasher.update(value.as_bytes());
    hasher.update(units.as_bytes());
    format!(
        "{}{}{}",
        object_id,
        INDEXER_SEPARATOR,
        hex::encode(hasher.finalize())
    )
}
