//! In-memory conveyance graph for one tract.
//!
//! Converts a [`TractSnapshot`] into a compact adjacency list over dense
//! party indices. The snapshot is already restricted to the instruments
//! covering the tract, so traversal cost is proportional to the conveyances
//! touching that tract, never the whole store.

use std::collections::HashMap;

use num_traits::Zero;
use titlegraph_core::Fraction;
use titlegraph_store::TractSnapshot;

/// Compact party metadata for traversal.
#[derive(Debug, Clone)]
pub struct PartyNode {
    /// Dense index (0..N-1).
    pub index: usize,
    /// Canonical identity key.
    pub key: String,
    pub display_name: String,
    /// Distinct raw spellings merged into this key.
    pub alias_count: usize,
}

/// One restricted conveyance edge.
#[derive(Debug, Clone)]
pub struct ConveyanceEdge {
    /// Grantee's dense index.
    pub target: usize,
    /// Fraction of the grantor's interest conveyed.
    pub fraction: Fraction,
    pub instrument_id: String,
}

/// The restricted conveyance graph for a tract.
pub struct TractGraph {
    pub nodes: Vec<PartyNode>,
    /// `adjacency[i]` = outgoing conveyances from party `i`.
    pub adjacency: Vec<Vec<ConveyanceEdge>>,
    /// Party key → dense index.
    pub node_index: HashMap<String, usize>,
    /// Incoming restricted-edge count per party.
    incoming: Vec<usize>,
}

impl TractGraph {
    pub fn from_snapshot(snapshot: &TractSnapshot) -> Self {
        let mut node_index: HashMap<String, usize> = HashMap::new();
        let mut nodes: Vec<PartyNode> = Vec::new();

        let party_records: HashMap<&str, _> = snapshot
            .parties
            .iter()
            .map(|p| (p.key.as_str(), p))
            .collect();

        let mut intern = |key: &str, nodes: &mut Vec<PartyNode>,
                          node_index: &mut HashMap<String, usize>| {
            if let Some(&i) = node_index.get(key) {
                return i;
            }
            let index = nodes.len();
            let (display_name, alias_count) = match party_records.get(key) {
                Some(p) => (p.display_name.clone(), p.aliases.len()),
                None => (key.to_string(), 1),
            };
            nodes.push(PartyNode {
                index,
                key: key.to_string(),
                display_name,
                alias_count,
            });
            node_index.insert(key.to_string(), index);
            index
        };

        let mut edges = Vec::with_capacity(snapshot.conveyances.len());
        for conveyance in &snapshot.conveyances {
            let src = intern(&conveyance.grantor, &mut nodes, &mut node_index);
            let tgt = intern(&conveyance.grantee, &mut nodes, &mut node_index);
            edges.push((src, tgt, conveyance.fraction, conveyance.instrument_id.clone()));
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![0usize; nodes.len()];
        for (src, tgt, fraction, instrument_id) in edges {
            adjacency[src].push(ConveyanceEdge {
                target: tgt,
                fraction,
                instrument_id,
            });
            // A self-conveyance (ratification) neither roots nor terminates
            // a party, so it does not count as incoming.
            if src != tgt {
                incoming[tgt] += 1;
            }
        }

        Self {
            nodes,
            adjacency,
            node_index,
            incoming,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parties with no incoming restricted edge: the chain's origins.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.incoming[i] == 0)
            .collect()
    }

    /// Parties with no outgoing restricted edge: current-owner candidates.
    pub fn terminals(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.adjacency[i].iter().all(|e| e.target == i))
            .collect()
    }

    /// Sum of outgoing conveyed fractions, self-conveyances excluded.
    pub fn out_fraction_sum(&self, index: usize) -> Fraction {
        self.adjacency[index]
            .iter()
            .filter(|e| e.target != index)
            .map(|e| e.fraction)
            .fold(Fraction::zero(), |acc, f| acc + f)
    }
}
