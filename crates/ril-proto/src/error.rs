//! Codec error types

use thiserror::Error;

use crate::codec::Schema;

/// Errors from the payload codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes did not parse as the named schema.
    #[error("malformed payload for {schema:?}: {source}")]
    Malformed {
        schema: Schema,
        #[source]
        source: serde_json::Error,
    },

    /// The body handed to `encode` is not the shape the schema names.
    #[error("body does not match schema {schema:?}")]
    SchemaMismatch { schema: Schema },
}
