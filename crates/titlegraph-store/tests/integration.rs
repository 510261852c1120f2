//! End-to-end store tests: JSON extraction records in, graph queries out.

use chrono::NaiveDate;
use titlegraph_core::DocumentRecord;
use titlegraph_store::{ingest_document, GraphStore};

const TRACT: &str = "ND-WILLIAMS-15-154N-97W-NW4";

fn deed(id: &str, grantor: &str, grantee: &str, recorded: &str, fraction: &str) -> DocumentRecord {
    let json = format!(
        r#"{{
            "id": "{id}",
            "document_kind": "Mineral Deed",
            "parties": [
                {{"name": "{grantor}", "role": "grantor"}},
                {{"name": "{grantee}", "role": "grantee"}}
            ],
            "dates": {{"recording": "{recorded}"}},
            "interest": {{"conveyed_fraction": "{fraction}", "interest_type": "mineral"}},
            "coverage": [
                {{"legal_description": "NW/4 of Section 15, T154N, R97W, Williams County, ND"}}
            ],
            "confidence": 0.9
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

#[test]
fn two_step_chain_builds_expected_graph() {
    let store = GraphStore::new();
    ingest_document(&store, &deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1")).unwrap();
    ingest_document(&store, &deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2")).unwrap();

    let stats = store.stats();
    assert_eq!(stats.parties, 3);
    assert_eq!(stats.instruments, 2);
    assert_eq!(stats.tracts, 1);
    assert_eq!(stats.conveyances, 2);

    let snapshot = store.tract_snapshot(TRACT).unwrap();
    assert_eq!(snapshot.instruments.len(), 2);
    assert_eq!(snapshot.conveyances.len(), 2);
    assert_eq!(snapshot.parties.len(), 3);
}

#[test]
fn chain_of_title_is_recording_date_ordered() {
    let store = GraphStore::new();
    // Submitted newest-first; listing must still come out oldest-first.
    ingest_document(&store, &deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2")).unwrap();
    ingest_document(&store, &deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1")).unwrap();

    let chain = store.chain_of_title(TRACT).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].instrument.id, "I1");
    assert_eq!(
        chain[0].instrument.recording_date,
        NaiveDate::from_ymd_opt(1920, 6, 1)
    );
    assert_eq!(chain[1].instrument.id, "I2");
    assert_eq!(chain[0].conveyances.len(), 1);
    assert_eq!(chain[0].conveyances[0].grantor, "ALICE ARNOLD");
    assert_eq!(chain[0].conveyances[0].grantee, "BOB BAKER");
}

#[test]
fn undated_instruments_sort_last() {
    let store = GraphStore::new();
    let mut undated = deed("I9", "Xavier Cross", "Yolanda Price", "1950-06-01", "1");
    undated.dates.recording = None;
    ingest_document(&store, &undated).unwrap();
    ingest_document(&store, &deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1")).unwrap();

    let chain = store.chain_of_title(TRACT).unwrap();
    assert_eq!(chain[0].instrument.id, "I1");
    assert_eq!(chain[1].instrument.id, "I9");
}

#[test]
fn tied_recording_dates_list_in_id_order() {
    let docs = [
        deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1"),
        deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2"),
        deed("I3", "Carol Carter", "Dan Dawson", "1950-06-01", "1/4"),
    ];

    let forward = GraphStore::new();
    for doc in &docs {
        ingest_document(&forward, doc).unwrap();
    }
    let reverse = GraphStore::new();
    for doc in docs.iter().rev() {
        ingest_document(&reverse, doc).unwrap();
    }

    for store in [&forward, &reverse] {
        let ids: Vec<String> = store
            .chain_of_title(TRACT)
            .unwrap()
            .into_iter()
            .map(|e| e.instrument.id)
            .collect();
        assert_eq!(ids, ["I1", "I2", "I3"]);
    }
}

#[test]
fn resubmitting_the_same_records_changes_nothing() {
    let store = GraphStore::new();
    let docs = [
        deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1"),
        deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2"),
    ];
    for doc in &docs {
        ingest_document(&store, doc).unwrap();
    }
    let before = store.stats();

    for doc in &docs {
        ingest_document(&store, doc).unwrap();
    }
    let after = store.stats();

    assert_eq!(before.parties, after.parties);
    assert_eq!(before.instruments, after.instruments);
    assert_eq!(before.tracts, after.tracts);
    assert_eq!(before.conveyances, after.conveyances);
    assert_eq!(before.coverages, after.coverages);
}

#[test]
fn submission_order_does_not_change_graph_shape() {
    let docs = [
        deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1"),
        deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2"),
        deed("I3", "Carol Carter", "Dan Dawson", "1970-06-01", "1/4"),
    ];

    let forward = GraphStore::new();
    for doc in &docs {
        ingest_document(&forward, doc).unwrap();
    }
    let reverse = GraphStore::new();
    for doc in docs.iter().rev() {
        ingest_document(&reverse, doc).unwrap();
    }

    let a = forward.stats();
    let b = reverse.stats();
    assert_eq!(a.parties, b.parties);
    assert_eq!(a.conveyances, b.conveyances);

    let chain_a = forward.chain_of_title(TRACT).unwrap();
    let chain_b = reverse.chain_of_title(TRACT).unwrap();
    let ids_a: Vec<&str> = chain_a.iter().map(|e| e.instrument.id.as_str()).collect();
    let ids_b: Vec<&str> = chain_b.iter().map(|e| e.instrument.id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn party_identity_merges_across_spellings() {
    let store = GraphStore::new();
    ingest_document(&store, &deed("I1", "Smith Oil, LLC", "Bob Baker", "1920-06-01", "1")).unwrap();
    ingest_document(&store, &deed("I2", "SMITH OIL LLC", "Carol Carter", "1950-06-01", "1/2")).unwrap();

    // Both spellings collapse into one party with two instruments.
    let instruments = store.party_instruments("SMITH OIL").unwrap();
    assert_eq!(instruments.len(), 2);
}

#[test]
fn section_rollup_spans_tracts() {
    let store = GraphStore::new();
    ingest_document(&store, &deed("I1", "Alice Arnold", "Bob Baker", "1920-06-01", "1")).unwrap();

    let mut se_quarter = deed("I2", "Bob Baker", "Carol Carter", "1950-06-01", "1/2");
    se_quarter.coverage[0].legal_description =
        "SE/4 of Section 15, T154N, R97W, Williams County, ND".to_string();
    ingest_document(&store, &se_quarter).unwrap();

    let instruments = store.instruments_for_section("ND-WILLIAMS-15-154N-97W");
    assert_eq!(instruments.len(), 2);

    // Tract-scoped view stays narrow.
    let snapshot = store.tract_snapshot(TRACT).unwrap();
    assert_eq!(snapshot.instruments.len(), 1);
}

#[test]
fn unknown_tract_query_is_an_error() {
    let store = GraphStore::new();
    assert!(store.tract_snapshot("OK-GARFIELD-14-3N-4W").is_err());
}
