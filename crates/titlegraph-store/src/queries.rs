//! Read operations over the ownership graph.
//!
//! Every query takes the read lock once and returns owned data, so callers
//! (the resolver in particular) always work from a consistent snapshot even
//! while ingestion continues on other threads.

use std::collections::HashSet;

use serde::Serialize;

use titlegraph_core::{Conveyance, Instrument, Party, TitleError, Tract};

use crate::store::{GraphStore, GraphState};

/// Everything the resolver needs for one tract, captured atomically:
/// the instrument set scoped to the tract and the conveyances restricted
/// to that set, plus the party records behind them.
#[derive(Debug, Clone, Serialize)]
pub struct TractSnapshot {
    pub tract: Tract,
    /// Instruments covering the tract.
    pub instruments: Vec<Instrument>,
    /// Conveyances whose instrument is in `instruments`.
    pub conveyances: Vec<Conveyance>,
    /// Parties appearing as grantor or grantee in `conveyances`.
    pub parties: Vec<Party>,
}

/// One step in a chain-of-title listing.
#[derive(Debug, Clone, Serialize)]
pub struct ChainEntry {
    pub instrument: Instrument,
    pub conveyances: Vec<Conveyance>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphStats {
    pub parties: usize,
    pub instruments: usize,
    pub tracts: usize,
    pub sections: usize,
    pub conveyances: usize,
    pub coverages: usize,
    pub references: usize,
    pub warnings: usize,
}

impl GraphStore {
    /// Capture the tract-scoped snapshot used by ownership resolution.
    pub fn tract_snapshot(&self, tract_key: &str) -> Result<TractSnapshot, TitleError> {
        let state = self.state.read();
        let &slot = state
            .tract_index
            .get(tract_key)
            .ok_or_else(|| TitleError::UnknownTract {
                key: tract_key.to_string(),
            })?;

        let instrument_ids = covering_instrument_ids(&state, tract_key);
        let instruments: Vec<Instrument> = state
            .instruments
            .iter()
            .filter(|i| instrument_ids.contains(i.id.as_str()))
            .cloned()
            .collect();

        let conveyances: Vec<Conveyance> = state
            .conveyances
            .iter()
            .filter(|c| instrument_ids.contains(c.instrument_id.as_str()))
            .cloned()
            .collect();

        let party_keys: HashSet<&str> = conveyances
            .iter()
            .flat_map(|c| [c.grantor.as_str(), c.grantee.as_str()])
            .collect();
        let parties: Vec<Party> = state
            .parties
            .iter()
            .filter(|p| party_keys.contains(p.key.as_str()))
            .cloned()
            .collect();

        Ok(TractSnapshot {
            tract: state.tracts[slot].clone(),
            instruments,
            conveyances,
            parties,
        })
    }

    /// Chain of title for a tract: covering instruments in recording-date
    /// order (undated last), each with its conveyances.
    pub fn chain_of_title(&self, tract_key: &str) -> Result<Vec<ChainEntry>, TitleError> {
        let snapshot = self.tract_snapshot(tract_key)?;

        let mut entries: Vec<ChainEntry> = snapshot
            .instruments
            .into_iter()
            .map(|instrument| {
                let conveyances = snapshot
                    .conveyances
                    .iter()
                    .filter(|c| c.instrument_id == instrument.id)
                    .cloned()
                    .collect();
                ChainEntry {
                    instrument,
                    conveyances,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            match (a.instrument.recording_date, b.instrument.recording_date) {
                (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.instrument.id.cmp(&b.instrument.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.instrument.id.cmp(&b.instrument.id),
            }
        });
        Ok(entries)
    }

    /// Instruments covering any tract inside a section (square mile).
    pub fn instruments_for_section(&self, section_key: &str) -> Vec<Instrument> {
        let state = self.state.read();
        let Some(tract_keys) = state.section_tracts.get(section_key) else {
            return Vec::new();
        };

        let mut ids: HashSet<&str> = HashSet::new();
        for tract_key in tract_keys {
            ids.extend(covering_instrument_ids(&state, tract_key));
        }
        state
            .instruments
            .iter()
            .filter(|i| ids.contains(i.id.as_str()))
            .cloned()
            .collect()
    }

    /// Instruments in which a party appears as grantor or grantee.
    pub fn party_instruments(&self, party_key: &str) -> Result<Vec<Instrument>, TitleError> {
        let state = self.state.read();
        if !state.party_index.contains_key(party_key) {
            return Err(TitleError::UnknownParty {
                key: party_key.to_string(),
            });
        }

        let ids: HashSet<&str> = state
            .conveyances
            .iter()
            .filter(|c| c.grantor == party_key || c.grantee == party_key)
            .map(|c| c.instrument_id.as_str())
            .collect();
        Ok(state
            .instruments
            .iter()
            .filter(|i| ids.contains(i.id.as_str()))
            .cloned()
            .collect())
    }

    pub fn stats(&self) -> GraphStats {
        let state = self.state.read();
        GraphStats {
            parties: state.parties.len(),
            instruments: state.instruments.len(),
            tracts: state.tracts.len(),
            sections: state.sections.len(),
            conveyances: state.conveyances.len(),
            coverages: state.coverages.len(),
            references: state.references.len(),
            warnings: state.warnings.len(),
        }
    }
}

fn covering_instrument_ids<'a>(state: &'a GraphState, tract_key: &str) -> HashSet<&'a str> {
    state
        .coverages
        .iter()
        .filter(|c| c.tract_key == tract_key)
        .map(|c| c.instrument_id.as_str())
        .collect()
}
