//! Current-ownership computation for one tract.
//!
//! All-paths DFS from each chain root, multiplying edge fractions along each
//! path and summing path products per party. A party's share is its summed
//! arrival fraction times whatever portion it never conveyed onward. The
//! computed total is checked against the interest established by the
//! earliest recorded instrument; an excess means the chain contradicts
//! itself and the result is reported as unresolved rather than guessed.

use std::collections::HashSet;

use num_traits::{One, Zero};

use titlegraph_core::config::ResolveSettings;
use titlegraph_core::Fraction;
use titlegraph_store::TractSnapshot;

use crate::graph::TractGraph;
use crate::types::{OwnershipReport, OwnershipShare, OwnershipStatus};

struct DfsState {
    node: usize,
    product: Fraction,
    visited: HashSet<usize>,
    depth: usize,
}

/// Resolve current ownership from a tract snapshot.
///
/// Never fails: inconsistent or uncomputable chains come back as
/// `OwnershipStatus::Unresolved` with whatever shares could be computed.
/// The `discontinuous` flag is left false; the engine fills it from the
/// gap detector, which is independent of this fraction math.
pub fn resolve_ownership(snapshot: &TractSnapshot, limits: &ResolveSettings) -> OwnershipReport {
    let tract_key = snapshot.tract.spatial_key.canonical();
    let graph = TractGraph::from_snapshot(snapshot);

    if graph.node_count() == 0 {
        return unresolved(tract_key, "no conveyances scoped to this tract");
    }

    let roots = graph.roots();
    if roots.is_empty() {
        // Every party already received from another: a cycle with no origin.
        return unresolved(tract_key, "cyclic conveyance structure with no root party");
    }

    // arrival[i] = Σ over root-paths reaching i of Π edge fractions.
    let mut arrival = vec![Fraction::zero(); graph.node_count()];
    let mut paths_expanded = 0usize;
    let mut truncated = false;

    for &root in &roots {
        arrival[root] += Fraction::one();

        let mut stack = vec![DfsState {
            node: root,
            product: Fraction::one(),
            visited: [root].into_iter().collect(),
            depth: 0,
        }];

        'dfs: while let Some(state) = stack.pop() {
            for edge in &graph.adjacency[state.node] {
                if state.visited.contains(&edge.target) {
                    continue;
                }
                if state.depth >= limits.max_depth {
                    truncated = true;
                    continue;
                }
                paths_expanded += 1;
                if paths_expanded > limits.max_paths {
                    truncated = true;
                    break 'dfs;
                }

                let product = state.product * edge.fraction;
                arrival[edge.target] += product;

                let mut visited = state.visited.clone();
                visited.insert(edge.target);
                stack.push(DfsState {
                    node: edge.target,
                    product,
                    visited,
                    depth: state.depth + 1,
                });
            }
        }
    }

    if truncated {
        tracing::warn!(
            tract_key = %tract_key,
            max_depth = limits.max_depth,
            max_paths = limits.max_paths,
            "Traversal budget exhausted"
        );
        return unresolved(tract_key, "conveyance traversal exceeded configured budget");
    }

    let root_set: HashSet<usize> = roots.iter().copied().collect();
    let mut shares = Vec::new();
    let mut total = Fraction::zero();

    for node in &graph.nodes {
        // A root's retained interest predates the scoped instrument set;
        // only received interest is credited here.
        if root_set.contains(&node.index) {
            continue;
        }
        let out = graph.out_fraction_sum(node.index);
        let retained = if out >= Fraction::one() {
            Fraction::zero()
        } else {
            Fraction::one() - out
        };
        let share = arrival[node.index] * retained;
        if share.is_zero() {
            continue;
        }
        total += share;
        shares.push(OwnershipShare {
            party_key: node.key.clone(),
            display_name: node.display_name.clone(),
            fraction: share,
            identity_uncertain: node.alias_count >= 2,
        });
    }

    shares.sort_by(|a, b| {
        b.fraction
            .cmp(&a.fraction)
            .then_with(|| a.party_key.cmp(&b.party_key))
    });

    let bound = established_interest(snapshot, &graph);
    let status = if total > bound {
        OwnershipStatus::Unresolved
    } else {
        OwnershipStatus::Resolved
    };
    let unresolved_reason = (status == OwnershipStatus::Unresolved).then(|| {
        format!(
            "computed total {total} exceeds the {bound} established by the earliest instrument"
        )
    });

    OwnershipReport {
        tract_key,
        status,
        unresolved_reason,
        shares,
        total,
        discontinuous: false,
    }
}

/// The total interest established by the earliest recorded instrument:
/// the sum of that instrument's conveyed fractions, capped at the whole.
/// Nominally 1, unless the root grant conveys less than the whole.
fn established_interest(snapshot: &TractSnapshot, graph: &TractGraph) -> Fraction {
    let earliest = snapshot
        .instruments
        .iter()
        .filter(|i| i.recording_date.is_some())
        .min_by(|a, b| {
            a.recording_date
                .cmp(&b.recording_date)
                .then_with(|| a.id.cmp(&b.id))
        });
    let Some(earliest) = earliest else {
        return Fraction::one();
    };

    let conveyed: Fraction = graph
        .adjacency
        .iter()
        .flatten()
        .filter(|e| e.instrument_id == earliest.id)
        .map(|e| e.fraction)
        .fold(Fraction::zero(), |acc, f| acc + f);

    if conveyed.is_zero() || conveyed > Fraction::one() {
        Fraction::one()
    } else {
        conveyed
    }
}

fn unresolved(tract_key: String, reason: &str) -> OwnershipReport {
    OwnershipReport {
        tract_key,
        status: OwnershipStatus::Unresolved,
        unresolved_reason: Some(reason.to_string()),
        shares: Vec::new(),
        total: Fraction::zero(),
        discontinuous: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use titlegraph_core::{
        Conveyance, DocumentKind, Instrument, InterestType, SpatialKey, Tract,
    };
    use titlegraph_store::TractSnapshot;

    fn instrument(id: &str, year: i32) -> Instrument {
        Instrument {
            id: id.to_string(),
            kind: DocumentKind::MineralDeed,
            county: None,
            state: None,
            book: None,
            page: None,
            document_number: None,
            execution_date: None,
            recording_date: NaiveDate::from_ymd_opt(year, 6, 1),
            confidence: 1.0,
        }
    }

    fn conveyance(grantor: &str, grantee: &str, instrument: &str, num: i64, den: i64) -> Conveyance {
        Conveyance {
            grantor: grantor.to_string(),
            grantee: grantee.to_string(),
            instrument_id: instrument.to_string(),
            interest_type: InterestType::Mineral,
            fraction: Fraction::new(num, den),
            reservations: None,
            date: None,
        }
    }

    fn snapshot(instruments: Vec<Instrument>, conveyances: Vec<Conveyance>) -> TractSnapshot {
        TractSnapshot {
            tract: Tract {
                spatial_key: SpatialKey {
                    state: "ND".to_string(),
                    county: "WILLIAMS".to_string(),
                    section: "15".to_string(),
                    township: "154N".to_string(),
                    range: "97W".to_string(),
                    aliquot: Some("NW4".to_string()),
                },
                acres: None,
                raw_description: None,
            },
            instruments,
            conveyances,
            parties: Vec::new(),
        }
    }

    fn limits() -> ResolveSettings {
        ResolveSettings::default()
    }

    #[test]
    fn two_step_chain_splits_between_holder_and_grantee() {
        // I1 (1920): A conveys the whole to B. I2 (1950): B conveys half to C.
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 1),
                    conveyance("BOB", "CAROL", "I2", 1, 2),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Resolved);
        assert!(!report.discontinuous);
        assert_eq!(report.shares.len(), 2);
        assert_eq!(report.shares[0].party_key, "BOB");
        assert_eq!(report.shares[0].fraction, Fraction::new(1, 2));
        assert_eq!(report.shares[1].party_key, "CAROL");
        assert_eq!(report.shares[1].fraction, Fraction::new(1, 2));
        assert_eq!(report.total, Fraction::one());
    }

    #[test]
    fn linear_full_conveyances_yield_single_owner() {
        let report = resolve_ownership(
            &snapshot(
                vec![
                    instrument("I1", 1920),
                    instrument("I2", 1950),
                    instrument("I3", 1970),
                ],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 1),
                    conveyance("BOB", "CAROL", "I2", 1, 1),
                    conveyance("CAROL", "DAN", "I3", 1, 1),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Resolved);
        assert_eq!(report.shares.len(), 1);
        assert_eq!(report.shares[0].party_key, "DAN");
        assert_eq!(report.shares[0].fraction, Fraction::one());
    }

    #[test]
    fn branching_conserves_the_whole() {
        // A splits the whole between B and C; C passes a quarter of
        // their half to D.
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 2),
                    conveyance("ALICE", "CAROL", "I1", 1, 2),
                    conveyance("CAROL", "DAN", "I2", 1, 4),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Resolved);
        assert_eq!(report.total, Fraction::one());
        let by_key = |k: &str| {
            report
                .shares
                .iter()
                .find(|s| s.party_key == k)
                .map(|s| s.fraction)
        };
        assert_eq!(by_key("BOB"), Some(Fraction::new(1, 2)));
        assert_eq!(by_key("CAROL"), Some(Fraction::new(3, 8)));
        assert_eq!(by_key("DAN"), Some(Fraction::new(1, 8)));
    }

    #[test]
    fn merging_grantee_sums_contributions() {
        // B and C each pass their halves to D.
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 2),
                    conveyance("ALICE", "CAROL", "I1", 1, 2),
                    conveyance("BOB", "DAN", "I2", 1, 1),
                    conveyance("CAROL", "DAN", "I2", 1, 1),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Resolved);
        assert_eq!(report.shares.len(), 1);
        assert_eq!(report.shares[0].party_key, "DAN");
        assert_eq!(report.shares[0].fraction, Fraction::one());
    }

    #[test]
    fn disconnected_grantor_overclaims_and_is_unresolved() {
        // I2's grantor D never received anything, so the computed claims
        // exceed what I1 established.
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 1),
                    conveyance("DAN", "CAROL", "I2", 1, 2),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Unresolved);
        assert!(report.unresolved_reason.is_some());
        // Partial answer still reported.
        assert!(report.shares.iter().any(|s| s.party_key == "BOB"));
        assert!(report.shares.iter().any(|s| s.party_key == "CAROL"));
    }

    #[test]
    fn cycle_without_root_is_unresolved_with_no_shares() {
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 1),
                    conveyance("BOB", "ALICE", "I2", 1, 1),
                ],
            ),
            &limits(),
        );
        assert_eq!(report.status, OwnershipStatus::Unresolved);
        assert!(report.shares.is_empty());
    }

    #[test]
    fn partial_root_grant_bounds_the_total() {
        // The root grant conveys only a quarter; the chain below it is
        // consistent within that quarter.
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1950)],
                vec![
                    conveyance("ALICE", "BOB", "I1", 1, 4),
                    conveyance("BOB", "CAROL", "I2", 1, 1),
                ],
            ),
            &limits(),
        );

        assert_eq!(report.status, OwnershipStatus::Resolved);
        assert_eq!(report.total, Fraction::new(1, 4));
        assert_eq!(report.shares[0].party_key, "CAROL");
    }

    #[test]
    fn tied_earliest_instruments_bound_deterministically() {
        // I1 and I2 carry the same recording date; the bound comes from the
        // lower id, whatever order the snapshot lists the instruments in.
        let conveyances = vec![
            conveyance("ALICE", "BOB", "I2", 1, 1),
            conveyance("BOB", "CAROL", "I1", 1, 2),
        ];

        let forward = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920), instrument("I2", 1920)],
                conveyances.clone(),
            ),
            &limits(),
        );
        let reversed = resolve_ownership(
            &snapshot(
                vec![instrument("I2", 1920), instrument("I1", 1920)],
                conveyances,
            ),
            &limits(),
        );

        // Bound is I1's conveyed half; the computed total of 1 exceeds it.
        assert_eq!(forward.status, OwnershipStatus::Unresolved);
        assert_eq!(reversed.status, OwnershipStatus::Unresolved);
        assert_eq!(forward.total, reversed.total);
        assert_eq!(forward.unresolved_reason, reversed.unresolved_reason);
    }

    #[test]
    fn reporting_order_breaks_ties_by_key() {
        let report = resolve_ownership(
            &snapshot(
                vec![instrument("I1", 1920)],
                vec![
                    conveyance("ALICE", "ZED NORTH", "I1", 1, 2),
                    conveyance("ALICE", "BOB", "I1", 1, 2),
                ],
            ),
            &limits(),
        );
        assert_eq!(report.shares[0].party_key, "BOB");
        assert_eq!(report.shares[1].party_key, "ZED NORTH");
    }

    #[test]
    fn empty_snapshot_is_unresolved() {
        let report = resolve_ownership(&snapshot(Vec::new(), Vec::new()), &limits());
        assert_eq!(report.status, OwnershipStatus::Unresolved);
        assert!(report.shares.is_empty());
    }
}
