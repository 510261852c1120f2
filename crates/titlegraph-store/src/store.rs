//! Graph state and merge (upsert) mutations.
//!
//! All writes use merge semantics keyed by natural identity: party identity
//! key, instrument id, canonical tract key. Re-merging identical data is a
//! no-op; merging new detail onto an existing node fills missing fields and
//! accumulates aliases; contradicting an immutable field is a conflict and
//! the whole call fails without touching state.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::Serialize;

use titlegraph_core::{
    Conveyance, Coverage, DocumentKind, EntityKind, Fraction, Instrument, InterestType, Party,
    Reference, ReferenceKind, Section, SpatialKey, TitleError, Tract,
};
use titlegraph_normalize::NormalizedParty;

/// A data-quality observation recorded during a merge.
///
/// Warnings never block the merge; they accumulate and surface through
/// [`GraphStore::warnings`] for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityWarning {
    pub instrument_id: String,
    pub detail: String,
}

type ConveyanceKey = (String, String, String, Fraction, InterestType);

/// The node and edge tables. Nodes live in slot vectors with natural-key →
/// slot index maps; edges carry de-dup key sets so merges stay idempotent.
#[derive(Default)]
pub(crate) struct GraphState {
    pub(crate) parties: Vec<Party>,
    pub(crate) party_index: HashMap<String, usize>,

    pub(crate) instruments: Vec<Instrument>,
    pub(crate) instrument_index: HashMap<String, usize>,

    pub(crate) tracts: Vec<Tract>,
    pub(crate) tract_index: HashMap<String, usize>,

    pub(crate) sections: Vec<Section>,
    pub(crate) section_index: HashMap<String, usize>,
    /// Section key → canonical tract keys inside it.
    pub(crate) section_tracts: HashMap<String, Vec<String>>,

    pub(crate) conveyances: Vec<Conveyance>,
    conveyance_keys: HashSet<ConveyanceKey>,

    pub(crate) coverages: Vec<Coverage>,
    coverage_keys: HashSet<(String, String)>,
    /// Instrument id → number of tracts it covers. Drives the orphan check.
    coverage_counts: HashMap<String, usize>,

    pub(crate) references: Vec<Reference>,
    reference_keys: HashSet<(String, String, ReferenceKind)>,

    pub(crate) warnings: Vec<IntegrityWarning>,
}

impl GraphState {
    pub(crate) fn merge_party(&mut self, normalized: &NormalizedParty) -> Result<usize, TitleError> {
        if normalized.key.is_empty() {
            return Err(TitleError::IdentityConflict {
                entity: "party",
                key: normalized.original.clone(),
                detail: "name normalizes to an empty identity key".to_string(),
            });
        }

        if let Some(&slot) = self.party_index.get(&normalized.key) {
            let party = &mut self.parties[slot];
            party.aliases.insert(normalized.original.clone());
            // Longer raw spelling is usually the more complete one.
            if normalized.original.len() > party.display_name.len() {
                party.display_name = normalized.original.clone();
            }
            if party.kind == EntityKind::Unknown && normalized.kind != EntityKind::Unknown {
                party.kind = normalized.kind;
            }
            return Ok(slot);
        }

        let slot = self.parties.len();
        self.parties.push(Party {
            key: normalized.key.clone(),
            display_name: normalized.original.clone(),
            kind: normalized.kind,
            aliases: [normalized.original.clone()].into_iter().collect(),
        });
        self.party_index.insert(normalized.key.clone(), slot);
        tracing::debug!(key = %normalized.key, "Created party");
        Ok(slot)
    }

    /// Reject before mutating: called by the ingest path so a conflicting
    /// document fails before any of its parts are applied.
    pub(crate) fn check_instrument_conflict(&self, incoming: &Instrument) -> Result<(), TitleError> {
        let Some(&slot) = self.instrument_index.get(&incoming.id) else {
            return Ok(());
        };
        let existing = &self.instruments[slot];

        let conflict = |field: &str| TitleError::IdentityConflict {
            entity: "instrument",
            key: incoming.id.clone(),
            detail: format!("{field} disagrees with previously merged value"),
        };

        fn differs<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
            matches!((a, b), (Some(x), Some(y)) if x != y)
        }

        if differs(&existing.book, &incoming.book) {
            return Err(conflict("book"));
        }
        if differs(&existing.page, &incoming.page) {
            return Err(conflict("page"));
        }
        if differs(&existing.document_number, &incoming.document_number) {
            return Err(conflict("document_number"));
        }
        if differs(&existing.recording_date, &incoming.recording_date) {
            return Err(conflict("recording_date"));
        }
        if differs(&existing.execution_date, &incoming.execution_date) {
            return Err(conflict("execution_date"));
        }
        Ok(())
    }

    pub(crate) fn merge_instrument(&mut self, incoming: &Instrument) -> Result<usize, TitleError> {
        self.check_instrument_conflict(incoming)?;

        if let Some(&slot) = self.instrument_index.get(&incoming.id) {
            let existing = &mut self.instruments[slot];
            // Conflict check passed, so differing fields are None-vs-Some:
            // fill the gaps, keep everything already known.
            existing.book = existing.book.take().or_else(|| incoming.book.clone());
            existing.page = existing.page.take().or_else(|| incoming.page.clone());
            existing.document_number = existing
                .document_number
                .take()
                .or_else(|| incoming.document_number.clone());
            existing.county = existing.county.take().or_else(|| incoming.county.clone());
            existing.state = existing.state.take().or_else(|| incoming.state.clone());
            existing.execution_date = existing.execution_date.or(incoming.execution_date);
            existing.recording_date = existing.recording_date.or(incoming.recording_date);
            if existing.kind == DocumentKind::Unknown {
                existing.kind = incoming.kind;
            }
            if incoming.confidence > existing.confidence {
                existing.confidence = incoming.confidence;
            }
            return Ok(slot);
        }

        if incoming.recording_precedes_execution() {
            self.warnings.push(IntegrityWarning {
                instrument_id: incoming.id.clone(),
                detail: "recording date precedes execution date".to_string(),
            });
            tracing::warn!(
                instrument_id = %incoming.id,
                "Recording date precedes execution date"
            );
        }

        let slot = self.instruments.len();
        self.instruments.push(incoming.clone());
        self.instrument_index.insert(incoming.id.clone(), slot);
        tracing::debug!(instrument_id = %incoming.id, kind = ?incoming.kind, "Created instrument");
        Ok(slot)
    }

    pub(crate) fn merge_tract(&mut self, tract: &Tract) -> usize {
        let key = tract.spatial_key.canonical();
        if let Some(&slot) = self.tract_index.get(&key) {
            let existing = &mut self.tracts[slot];
            if existing.acres.is_none() {
                existing.acres = tract.acres;
            }
            if existing.raw_description.is_none() {
                existing.raw_description = tract.raw_description.clone();
            }
            return slot;
        }

        let slot = self.tracts.len();
        self.tracts.push(tract.clone());
        self.tract_index.insert(key.clone(), slot);
        tracing::debug!(tract_key = %key, "Created tract");

        self.link_section(&tract.spatial_key, &key);
        slot
    }

    /// Ensure the Section aggregation node exists and lists this tract.
    fn link_section(&mut self, sk: &SpatialKey, tract_key: &str) {
        let section_key = sk.section_key();
        if !self.section_index.contains_key(&section_key) {
            let slot = self.sections.len();
            self.sections.push(Section::from_spatial_key(sk));
            self.section_index.insert(section_key.clone(), slot);
        }
        let members = self.section_tracts.entry(section_key).or_default();
        if !members.iter().any(|k| k == tract_key) {
            members.push(tract_key.to_string());
        }
    }

    pub(crate) fn add_coverage(&mut self, coverage: Coverage) -> Result<(), TitleError> {
        if !self.instrument_index.contains_key(&coverage.instrument_id) {
            return Err(TitleError::UnknownInstrument {
                id: coverage.instrument_id,
            });
        }
        if !self.tract_index.contains_key(&coverage.tract_key) {
            return Err(TitleError::UnknownTract {
                key: coverage.tract_key,
            });
        }

        let dedup = (coverage.instrument_id.clone(), coverage.tract_key.clone());
        if !self.coverage_keys.insert(dedup) {
            return Ok(());
        }
        *self
            .coverage_counts
            .entry(coverage.instrument_id.clone())
            .or_insert(0) += 1;
        self.coverages.push(coverage);
        Ok(())
    }

    pub(crate) fn covers_any_tract(&self, instrument_id: &str) -> bool {
        self.coverage_counts
            .get(instrument_id)
            .is_some_and(|&n| n > 0)
    }

    pub(crate) fn add_conveyance(&mut self, conveyance: Conveyance) -> Result<(), TitleError> {
        if !self.party_index.contains_key(&conveyance.grantor) {
            return Err(TitleError::UnknownParty {
                key: conveyance.grantor,
            });
        }
        if !self.party_index.contains_key(&conveyance.grantee) {
            return Err(TitleError::UnknownParty {
                key: conveyance.grantee,
            });
        }
        if !self.instrument_index.contains_key(&conveyance.instrument_id) {
            return Err(TitleError::UnknownInstrument {
                id: conveyance.instrument_id,
            });
        }
        // A conveyance with no covered tract could never be scoped to any
        // resolution, so it is rejected rather than stored dangling.
        if !self.covers_any_tract(&conveyance.instrument_id) {
            return Err(TitleError::OrphanConveyance {
                instrument_id: conveyance.instrument_id,
            });
        }

        if self.conveyance_keys.insert(conveyance.dedup_key()) {
            self.conveyances.push(conveyance);
        }
        Ok(())
    }

    pub(crate) fn add_reference(&mut self, reference: Reference) -> Result<(), TitleError> {
        if !self.instrument_index.contains_key(&reference.from_id) {
            return Err(TitleError::UnknownInstrument {
                id: reference.from_id,
            });
        }
        // Forward references to not-yet-merged instruments are allowed;
        // the edge is audit trail, nothing traverses it.
        if !self.instrument_index.contains_key(&reference.to_id) {
            tracing::debug!(
                from = %reference.from_id,
                to = %reference.to_id,
                "Reference targets an instrument not yet merged"
            );
        }

        let dedup = (
            reference.from_id.clone(),
            reference.to_id.clone(),
            reference.kind,
        );
        if self.reference_keys.insert(dedup) {
            self.references.push(reference);
        }
        Ok(())
    }
}

/// The shared ownership graph.
///
/// One write lock per mutation call: merges are key-serialized and
/// all-or-nothing from the caller's point of view.
#[derive(Default)]
pub struct GraphStore {
    pub(crate) state: RwLock<GraphState>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_party(&self, normalized: &NormalizedParty) -> Result<(), TitleError> {
        self.state.write().merge_party(normalized).map(|_| ())
    }

    pub fn merge_instrument(&self, instrument: &Instrument) -> Result<(), TitleError> {
        self.state.write().merge_instrument(instrument).map(|_| ())
    }

    pub fn merge_tract(&self, tract: &Tract) {
        self.state.write().merge_tract(tract);
    }

    pub fn add_coverage(&self, coverage: Coverage) -> Result<(), TitleError> {
        self.state.write().add_coverage(coverage)
    }

    pub fn add_conveyance(&self, conveyance: Conveyance) -> Result<(), TitleError> {
        self.state.write().add_conveyance(conveyance)
    }

    pub fn add_reference(&self, reference: Reference) -> Result<(), TitleError> {
        self.state.write().add_reference(reference)
    }

    /// Accumulated data-quality warnings, oldest first.
    pub fn warnings(&self) -> Vec<IntegrityWarning> {
        self.state.read().warnings.clone()
    }
}
