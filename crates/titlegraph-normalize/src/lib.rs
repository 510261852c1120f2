//! titlegraph-normalize: Identity normalization for the titlegraph ownership graph.
//!
//! Pure functions mapping raw extraction strings to stable canonical keys:
//! - legal description text → spatial key (`ND-WILLIAMS-15-154N-97W-NW4`)
//! - party name → identity key (`Smith Oil, LLC` → `SMITH OIL`)
//! - recording references (`Bk 450/Pg 123`) and interest fraction strings
//!
//! The same tract or party recorded in different documents must come out of
//! here with the same key, or not at all; a partial spatial key would make
//! unrelated tracts collide, so resolution is all-or-nothing.

pub mod party;
pub mod recording;
pub mod spatial;

pub use party::{normalize_party_name, NormalizedParty};
pub use recording::{format_recording_ref, parse_fraction, parse_recording_ref, RecordingRef};
pub use spatial::{parse_legal_description, require_legal_description};
