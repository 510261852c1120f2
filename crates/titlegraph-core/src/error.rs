use thiserror::Error;

/// Top-level error type for the titlegraph core.
///
/// Every variant is data returned to the caller; no error here may leave the
/// graph partially mutated, and no tract's failure affects another tract.
/// Unresolved ownership and undated instruments are typed report items in
/// titlegraph-resolve, not errors.
#[derive(Error, Debug)]
pub enum TitleError {
    #[error("Unresolved legal description (no spatial-key grammar matched): {text}")]
    UnresolvedSpatialKey { text: String },

    #[error("Identity conflict for {entity} {key}: {detail}")]
    IdentityConflict {
        entity: &'static str,
        key: String,
        detail: String,
    },

    #[error("Orphan conveyance: instrument {instrument_id} has no tract coverage")]
    OrphanConveyance { instrument_id: String },

    #[error("Invalid interest fraction {raw:?}: {reason}")]
    InvalidFraction { raw: String, reason: String },

    #[error("Unknown party: {key}")]
    UnknownParty { key: String },

    #[error("Unknown instrument: {id}")]
    UnknownInstrument { id: String },

    #[error("Unknown tract: {key}")]
    UnknownTract { key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
