//! Report types for ownership resolution and gap detection.

use serde::{Deserialize, Serialize};

use titlegraph_core::Fraction;

/// One party's computed share of a tract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipShare {
    pub party_key: String,
    pub display_name: String,
    /// Exact fractional interest.
    pub fraction: Fraction,
    /// The party key absorbed two or more distinct raw spellings, so the
    /// identity merge behind this share is heuristic.
    pub identity_uncertain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipStatus {
    Resolved,
    /// Computed totals are internally inconsistent. The shares are still
    /// reported for whatever portion could be computed.
    Unresolved,
}

/// Result of resolving current ownership for one tract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipReport {
    pub tract_key: String,
    pub status: OwnershipStatus,
    /// Why the status is Unresolved, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved_reason: Option<String>,
    /// Shares ordered by fraction descending, then party key ascending.
    pub shares: Vec<OwnershipShare>,
    /// Sum of all reported shares.
    pub total: Fraction,
    /// The gap detector found a broken hand-off in this tract's chain.
    pub discontinuous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Adjacent instruments whose parties do not connect.
    BrokenChain,
    /// Instrument with no recording date; it cannot be placed in the chain.
    Undated,
}

/// One discontinuity in a tract's instrument history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    /// The earlier instrument of the broken pair. Absent for undated items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_instrument_id: Option<String>,
    pub instrument_id: String,
    pub kind: GapKind,
    pub reason: String,
}
