//! The extraction-record input contract.
//!
//! External collaborators (document splitting, OCR, body-field extraction,
//! exhibit table extraction) hand this core one [`DocumentRecord`] per
//! recorded document. This module only defines the shape; normalization and
//! graph construction happen in titlegraph-normalize and titlegraph-store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::ReferenceKind;

/// A normalized per-document extraction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable instrument identifier. Generated at ingestion when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// Free-text document kind from the extractor ("Warranty Deed", ...).
    pub document_kind: String,

    #[serde(default)]
    pub parties: Vec<PartyRecord>,

    #[serde(default)]
    pub dates: DatesRecord,

    #[serde(default)]
    pub recording: RecordingRecord,

    #[serde(default)]
    pub interest: InterestRecord,

    /// Tract-coverage entries: one per legal description the document covers.
    #[serde(default)]
    pub coverage: Vec<CoverageRecord>,

    /// References to other instruments (assignments, releases, ...).
    #[serde(default)]
    pub references: Vec<ReferenceRecord>,

    /// Overall extraction confidence (0.0–1.0).
    #[serde(default)]
    pub confidence: f64,
}

/// A party as extracted, with its transaction role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRecord {
    /// Raw name as it appears in the document.
    pub name: String,
    pub role: PartyRole,
    /// Extractor's entity-kind hint, if any ("llc", "trust", ...).
    #[serde(default)]
    pub entity_kind: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    /// Grantor / assignor / lessor side.
    Grantor,
    /// Grantee / assignee / lessee side.
    Grantee,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatesRecord {
    pub execution: Option<NaiveDate>,
    pub recording: Option<NaiveDate>,
    pub effective: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingRecord {
    pub book: Option<String>,
    pub page: Option<String>,
    pub document_number: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

/// Interest conveyed/reserved, as free text plus fraction strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterestRecord {
    pub conveyed: Option<String>,
    /// Fraction string: "1/2", "50%", "0.5". Defaults to the whole when absent.
    pub conveyed_fraction: Option<String>,
    pub reserved: Option<String>,
    pub reserved_fraction: Option<String>,
    /// Free text: "mineral", "working interest", "ORRI", ...
    pub interest_type: Option<String>,
}

/// One tract the instrument covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// Raw legal description text.
    pub legal_description: String,
    #[serde(default)]
    pub acres: Option<f64>,
    /// County/state fallbacks when the description itself omits them
    /// (common for schedule-style exhibit rows).
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub target_instrument_id: String,
    pub kind: ReferenceKind,
}
