//! titlegraph-store: the in-process ownership graph.
//!
//! Node tables (parties, instruments, tracts, sections) and edge tables
//! (conveyances, coverage, references) behind a single `RwLock`. All
//! mutations are merges: re-submitting the same document is a no-op, and
//! conflicting re-submissions fail without partial writes. Reads take one
//! lock acquisition and return owned snapshots, so resolver runs never see
//! a half-applied document.

pub mod ingest;
pub mod queries;
pub mod schedule;
pub mod store;

pub use ingest::{ingest_document, IngestReport};
pub use queries::{ChainEntry, GraphStats, TractSnapshot};
pub use store::{GraphStore, IntegrityWarning};
