//! Chain-gap detection for one tract.
//!
//! A provability check, deliberately independent of the resolver's fraction
//! math: order the tract's instruments by recording date and verify that each
//! instrument's conveying party matches some receiving party of the one
//! before it. A direct hand-off is sufficient; amounts are not compared.

use std::collections::HashSet;

use titlegraph_core::Instrument;
use titlegraph_store::TractSnapshot;

use crate::types::{GapKind, GapReport};

/// Detect discontinuities in a tract's instrument history.
///
/// Undated instruments cannot be placed in the order; each produces its own
/// report item and is excluded from the adjacency walk, which continues over
/// the dated instruments.
pub fn detect_gaps(snapshot: &TractSnapshot) -> Vec<GapReport> {
    let mut reports = Vec::new();

    let mut dated: Vec<&Instrument> = Vec::new();
    for instrument in &snapshot.instruments {
        if instrument.recording_date.is_some() {
            dated.push(instrument);
        } else {
            reports.push(GapReport {
                prior_instrument_id: None,
                instrument_id: instrument.id.clone(),
                kind: GapKind::Undated,
                reason: "no recording date; instrument cannot be ordered".to_string(),
            });
        }
    }
    // Same-day recordings are routine; the id tie-break keeps the walk
    // independent of submission order.
    dated.sort_by(|a, b| {
        a.recording_date
            .cmp(&b.recording_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    for pair in dated.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);

        let grantees: HashSet<&str> = snapshot
            .conveyances
            .iter()
            .filter(|c| c.instrument_id == earlier.id)
            .map(|c| c.grantee.as_str())
            .collect();
        let connected = snapshot
            .conveyances
            .iter()
            .filter(|c| c.instrument_id == later.id)
            .any(|c| grantees.contains(c.grantor.as_str()));

        if !connected {
            tracing::debug!(
                earlier = %earlier.id,
                later = %later.id,
                "Chain hand-off not provable"
            );
            reports.push(GapReport {
                prior_instrument_id: Some(earlier.id.clone()),
                instrument_id: later.id.clone(),
                kind: GapKind::BrokenChain,
                reason: "no grantor of the later instrument matches a grantee of the earlier"
                    .to_string(),
            });
        }
    }

    reports
}
