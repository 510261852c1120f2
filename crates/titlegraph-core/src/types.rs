//! Core domain types for the titlegraph ownership graph.
//!
//! Nodes carry content-derived natural keys (spatial key, party identity key)
//! or caller-supplied stable identifiers (instrument id); there are no global
//! id counters. Interest fractions are exact rationals throughout; computed
//! ownership feeds legal/financial consumers, so float drift is not acceptable.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use num_rational::Ratio;
use serde::{Deserialize, Serialize};

/// Exact interest fraction. Always in (0, 1] on a conveyance edge.
pub type Fraction = Ratio<i64>;

// ── Spatial identity ──────────────────────────────────────────────

/// Decomposed components of a canonical tract key.
///
/// Canonical form: `STATE-COUNTY-SECTION-TOWNSHIP-RANGE[-ALIQUOT]`,
/// e.g. `ND-WILLIAMS-15-154N-97W-NW4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialKey {
    pub state: String,
    pub county: String,
    pub section: String,
    pub township: String,
    pub range: String,
    pub aliquot: Option<String>,
}

impl SpatialKey {
    /// The full canonical key string.
    pub fn canonical(&self) -> String {
        let mut key = format!(
            "{}-{}-{}-{}-{}",
            self.state, self.county, self.section, self.township, self.range
        );
        if let Some(aliquot) = &self.aliquot {
            key.push('-');
            key.push_str(aliquot);
        }
        key
    }

    /// The aggregation key one level coarser: same square mile, no aliquot.
    pub fn section_key(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.state, self.county, self.section, self.township, self.range
        )
    }
}

impl fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

// ── Node types ────────────────────────────────────────────────────

/// An entity capable of holding or conveying an interest.
///
/// Two raw names normalizing to the same identity key are the same Party.
/// Aliases accumulate the distinct raw spellings seen for this key; two or
/// more aliases means the identity merge was heuristic and downstream
/// results should carry an identity-uncertain flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    /// Canonical identity key derived from the normalized name.
    pub key: String,
    pub display_name: String,
    pub kind: EntityKind,
    /// Distinct raw name spellings that mapped to this key.
    pub aliases: BTreeSet<String>,
}

/// A recorded legal instrument (deed, lease, assignment, etc.).
///
/// Immutable after creation except for confidence/metadata corrections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    /// Caller-supplied stable identifier, or a generated UUID.
    pub id: String,
    pub kind: DocumentKind,
    pub county: Option<String>,
    pub state: Option<String>,
    pub book: Option<String>,
    pub page: Option<String>,
    pub document_number: Option<String>,
    pub execution_date: Option<NaiveDate>,
    pub recording_date: Option<NaiveDate>,
    /// Source extraction confidence (0.0–1.0).
    pub confidence: f64,
}

impl Instrument {
    /// True when the recording date precedes the execution date.
    /// Such an instrument is reported, never silently repaired.
    pub fn recording_precedes_execution(&self) -> bool {
        match (self.recording_date, self.execution_date) {
            (Some(rec), Some(exec)) => rec < exec,
            _ => false,
        }
    }
}

/// A specific parcel of land, identified by its canonical spatial key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tract {
    pub spatial_key: SpatialKey,
    pub acres: Option<f64>,
    /// Raw legal description text, kept for audit.
    pub raw_description: Option<String>,
}

/// Aggregation of tracts: the full square mile, no aliquot.
/// Derived from tract keys, never independently authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub state: String,
    pub county: String,
    pub section: String,
    pub township: String,
    pub range: String,
}

impl Section {
    pub fn from_spatial_key(sk: &SpatialKey) -> Self {
        Self {
            key: sk.section_key(),
            state: sk.state.clone(),
            county: sk.county.clone(),
            section: sk.section.clone(),
            township: sk.township.clone(),
            range: sk.range.clone(),
        }
    }
}

// ── Relationship types ────────────────────────────────────────────

/// Ownership transfer between two parties, owned by an instrument.
///
/// Multiple conveyances between the same pair are legal (repeated dealings);
/// de-duplication is by the full logical tuple, see [`Conveyance::dedup_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conveyance {
    /// Grantor party identity key.
    pub grantor: String,
    /// Grantee party identity key.
    pub grantee: String,
    pub instrument_id: String,
    pub interest_type: InterestType,
    /// Fraction of the grantor's interest conveyed, in (0, 1].
    pub fraction: Fraction,
    pub reservations: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Conveyance {
    /// The identity tuple used for idempotent merges.
    pub fn dedup_key(&self) -> (String, String, String, Fraction, InterestType) {
        (
            self.grantor.clone(),
            self.grantee.clone(),
            self.instrument_id.clone(),
            self.fraction,
            self.interest_type,
        )
    }
}

/// An instrument covers a tract; one instrument may cover many tracts
/// with different conveyed/reserved terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coverage {
    pub instrument_id: String,
    /// Canonical spatial key of the covered tract.
    pub tract_key: String,
    pub conveyed: Option<String>,
    pub reserved: Option<String>,
}

/// One instrument references another (audit trail only; the resolver
/// never traverses these).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub from_id: String,
    pub to_id: String,
    pub kind: ReferenceKind,
}

// ── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Individual,
    Corporation,
    Llc,
    Partnership,
    Trust,
    Estate,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Deed,
    MineralDeed,
    Assignment,
    Lease,
    Release,
    Ratification,
    Mortgage,
    Probate,
    Unknown,
}

impl DocumentKind {
    /// Map a free-text extractor label onto a kind. Unrecognized labels
    /// become `Unknown` rather than failing the record.
    pub fn from_label(label: &str) -> Self {
        let l = label.to_uppercase();
        if l.contains("MINERAL") && l.contains("DEED") {
            Self::MineralDeed
        } else if l.contains("DEED") {
            Self::Deed
        } else if l.contains("ASSIGN") {
            Self::Assignment
        } else if l.contains("RELEASE") {
            // Checked before LEASE, which it contains.
            Self::Release
        } else if l.contains("LEASE") {
            Self::Lease
        } else if l.contains("RATIF") {
            Self::Ratification
        } else if l.contains("MORTGAGE") {
            Self::Mortgage
        } else if l.contains("PROBATE") || l.contains("ESTATE") {
            Self::Probate
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    Fee,
    Mineral,
    Leasehold,
    Royalty,
    OverridingRoyalty,
}

impl InterestType {
    pub fn from_label(label: &str) -> Self {
        let l = label.to_uppercase();
        if l.contains("OVERRIDING") || l.contains("ORRI") {
            Self::OverridingRoyalty
        } else if l.contains("ROYALTY") || l.contains("NRI") {
            Self::Royalty
        } else if l.contains("LEASE") || l.contains("WORKING") {
            Self::Leasehold
        } else if l.contains("MINERAL") {
            Self::Mineral
        } else {
            Self::Fee
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Assigns,
    Releases,
    Ratifies,
    Amends,
}
