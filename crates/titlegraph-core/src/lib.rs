//! titlegraph-core: Shared types, configuration, and error handling for titlegraph.
//!
//! This crate provides the foundational types used across all titlegraph components:
//! - Node types (Party, Instrument, Tract, Section) for the ownership graph
//! - Relationship types (Conveyance, Coverage, Reference) between nodes
//! - The extraction-record input contract consumed at the ingestion boundary
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod records;
pub mod types;

pub use config::{ResolveSettings, TitlegraphConfig};
pub use error::TitleError;
pub use records::{
    CoverageRecord, DatesRecord, DocumentRecord, InterestRecord, PartyRecord, PartyRole,
    RecordingRecord, ReferenceRecord,
};
pub use types::{
    Conveyance, Coverage, DocumentKind, EntityKind, Fraction, Instrument, InterestType, Party,
    Reference, ReferenceKind, Section, SpatialKey, Tract,
};
