//! Document ingestion: extraction record → graph merge.
//!
//! One [`DocumentRecord`] becomes one instrument plus its parties, tracts,
//! coverage, and conveyances. The record is fully normalized and validated
//! before the write lock is taken, so a rejected document leaves no partial
//! state behind.

use num_traits::One;
use serde::Serialize;
use uuid::Uuid;

use titlegraph_core::{
    Conveyance, Coverage, DocumentKind, DocumentRecord, Fraction, Instrument, InterestType,
    PartyRole, Reference, SpatialKey, TitleError, Tract,
};
use titlegraph_normalize::{
    normalize_party_name, parse_fraction, parse_legal_description, NormalizedParty,
};

use crate::store::GraphStore;

/// What happened to one ingested document.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub instrument_id: String,
    pub parties_merged: usize,
    pub tracts_merged: usize,
    pub coverages_added: usize,
    pub conveyances_added: usize,
    /// Conveyances dropped because no legal description resolved.
    pub conveyances_skipped: usize,
    /// Legal descriptions that could not be resolved to a spatial key.
    pub unresolved_descriptions: Vec<String>,
    /// Party names that normalized to an empty identity key.
    pub skipped_parties: Vec<String>,
}

struct DocumentPlan {
    instrument: Instrument,
    grantors: Vec<NormalizedParty>,
    grantees: Vec<NormalizedParty>,
    tracts: Vec<Tract>,
    coverages: Vec<Coverage>,
    conveyances: Vec<Conveyance>,
    references: Vec<Reference>,
    unresolved_descriptions: Vec<String>,
    skipped_parties: Vec<String>,
}

/// Ingest one extraction record into the graph.
///
/// Unresolved legal descriptions and unusable party names are excluded and
/// reported, never fatal; a conflicting instrument identity is fatal and
/// rejects the whole document.
pub fn ingest_document(
    store: &GraphStore,
    record: &DocumentRecord,
) -> Result<IngestReport, TitleError> {
    let mut plan = build_plan(record)?;

    let mut state = store.state.write();

    // Validate before applying anything.
    state.check_instrument_conflict(&plan.instrument)?;

    let mut conveyances_skipped = 0;
    if plan.coverages.is_empty() && !state.covers_any_tract(&plan.instrument.id) {
        // No tract to scope them to: drop rather than store dangling.
        conveyances_skipped = plan.conveyances.len();
        if conveyances_skipped > 0 {
            tracing::warn!(
                instrument_id = %plan.instrument.id,
                dropped = conveyances_skipped,
                "No legal description resolved; conveyances dropped"
            );
        }
        plan.conveyances.clear();
    }

    for party in plan.grantors.iter().chain(&plan.grantees) {
        state.merge_party(party)?;
    }
    state.merge_instrument(&plan.instrument)?;
    for tract in &plan.tracts {
        state.merge_tract(tract);
    }
    let mut coverages_added = 0;
    for coverage in plan.coverages {
        state.add_coverage(coverage)?;
        coverages_added += 1;
    }
    let mut conveyances_added = 0;
    for conveyance in plan.conveyances {
        state.add_conveyance(conveyance)?;
        conveyances_added += 1;
    }
    for reference in plan.references {
        state.add_reference(reference)?;
    }
    drop(state);

    tracing::info!(
        instrument_id = %plan.instrument.id,
        coverages = coverages_added,
        conveyances = conveyances_added,
        unresolved = plan.unresolved_descriptions.len(),
        "Ingested document"
    );

    Ok(IngestReport {
        instrument_id: plan.instrument.id,
        parties_merged: plan.grantors.len() + plan.grantees.len(),
        tracts_merged: plan.tracts.len(),
        coverages_added,
        conveyances_added,
        conveyances_skipped,
        unresolved_descriptions: plan.unresolved_descriptions,
        skipped_parties: plan.skipped_parties,
    })
}

fn build_plan(record: &DocumentRecord) -> Result<DocumentPlan, TitleError> {
    let instrument_id = record
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let instrument = Instrument {
        id: instrument_id.clone(),
        kind: DocumentKind::from_label(&record.document_kind),
        county: record.recording.county.clone(),
        state: record.recording.state.clone(),
        book: record.recording.book.clone(),
        page: record.recording.page.clone(),
        document_number: record.recording.document_number.clone(),
        execution_date: record.dates.execution,
        recording_date: record.dates.recording,
        confidence: record.confidence,
    };

    let mut grantors = Vec::new();
    let mut grantees = Vec::new();
    let mut skipped_parties = Vec::new();
    for party in &record.parties {
        let normalized = normalize_party_name(&party.name);
        if normalized.key.is_empty() {
            tracing::warn!(name = %party.name, "Party name normalizes to nothing; skipped");
            skipped_parties.push(party.name.clone());
            continue;
        }
        match party.role {
            PartyRole::Grantor => grantors.push(normalized),
            PartyRole::Grantee => grantees.push(normalized),
        }
    }

    let mut tracts = Vec::new();
    let mut coverages = Vec::new();
    let mut unresolved_descriptions = Vec::new();
    for entry in &record.coverage {
        match resolve_description(entry.legal_description.as_str(), entry.county.as_deref(), entry.state.as_deref()) {
            Some(spatial_key) => {
                let tract_key = spatial_key.canonical();
                tracts.push(Tract {
                    spatial_key,
                    acres: entry.acres,
                    raw_description: Some(entry.legal_description.clone()),
                });
                coverages.push(Coverage {
                    instrument_id: instrument_id.clone(),
                    tract_key,
                    conveyed: record.interest.conveyed.clone(),
                    reserved: record.interest.reserved.clone(),
                });
            }
            None => {
                tracing::warn!(
                    description = %entry.legal_description,
                    "Legal description did not resolve to a spatial key"
                );
                unresolved_descriptions.push(entry.legal_description.clone());
            }
        }
    }

    let fraction = match &record.interest.conveyed_fraction {
        Some(raw) => parse_fraction(raw)?,
        None => Fraction::one(),
    };
    let interest_type = record
        .interest
        .interest_type
        .as_deref()
        .map(InterestType::from_label)
        .unwrap_or(InterestType::Fee);
    let date = record.dates.execution.or(record.dates.effective);

    let mut conveyances = Vec::new();
    for grantor in &grantors {
        for grantee in &grantees {
            conveyances.push(Conveyance {
                grantor: grantor.key.clone(),
                grantee: grantee.key.clone(),
                instrument_id: instrument_id.clone(),
                interest_type,
                fraction,
                reservations: record.interest.reserved.clone(),
                date,
            });
        }
    }

    let references = record
        .references
        .iter()
        .map(|r| Reference {
            from_id: instrument_id.clone(),
            to_id: r.target_instrument_id.clone(),
            kind: r.kind,
        })
        .collect();

    Ok(DocumentPlan {
        instrument,
        grantors,
        grantees,
        tracts,
        coverages,
        conveyances,
        references,
        unresolved_descriptions,
        skipped_parties,
    })
}

/// Resolve a legal description, retrying with the record's county/state
/// appended when the description itself omits them (schedule rows often
/// carry those in separate columns).
fn resolve_description(
    description: &str,
    county: Option<&str>,
    state: Option<&str>,
) -> Option<SpatialKey> {
    if let Some(key) = parse_legal_description(description) {
        return Some(key);
    }
    match (county, state) {
        (Some(county), Some(state)) => {
            let augmented = format!("{description}, {county} County, {state}");
            parse_legal_description(&augmented)
        }
        (Some(county), None) => {
            let augmented = format!("{description}, {county} County");
            parse_legal_description(&augmented)
        }
        _ => None,
    }
}
