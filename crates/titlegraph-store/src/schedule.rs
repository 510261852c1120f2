//! Exhibit-schedule table mapping.
//!
//! Assignments and lease packages commonly carry an "Exhibit A" table with
//! one tract per row. Header spellings vary wildly across county scans, so
//! columns are matched against a synonym table and rows become coverage
//! entries on the owning instrument's record.

use std::collections::HashMap;

use titlegraph_core::CoverageRecord;

/// Logical schedule columns recognized in exhibit tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleColumn {
    Grantor,
    Grantee,
    Recording,
    Legal,
    Date,
    County,
    State,
    Acres,
    Interest,
}

/// Header synonyms, checked in order; first containing match wins per column.
const COLUMN_SYNONYMS: &[(ScheduleColumn, &[&str])] = &[
    (
        ScheduleColumn::Grantor,
        &["lessor", "grantor", "owner", "mineral owner", "landowner"],
    ),
    (
        ScheduleColumn::Grantee,
        &["lessee", "grantee", "operator", "oil company"],
    ),
    (
        ScheduleColumn::Recording,
        &[
            "recording", "book/page", "bk/pg", "doc no", "instrument", "recorded", "filing",
            "book", "page",
        ],
    ),
    (
        ScheduleColumn::Legal,
        &[
            "lands",
            "legal",
            "description",
            "property",
            "tract",
            "location",
            "land description",
        ],
    ),
    (
        ScheduleColumn::Date,
        &["date", "effective", "execution", "dated", "lease date"],
    ),
    (ScheduleColumn::County, &["county", "parish"]),
    (ScheduleColumn::State, &["state", "st"]),
    (
        ScheduleColumn::Acres,
        &["acres", "acreage", "gross acres", "net acres"],
    ),
    (
        ScheduleColumn::Interest,
        &["interest", "wi", "working interest", "nri", "net revenue"],
    ),
];

/// Map raw table headers onto logical columns by synonym containment.
pub fn map_headers(headers: &[String]) -> HashMap<ScheduleColumn, usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut map = HashMap::new();
    for (column, synonyms) in COLUMN_SYNONYMS {
        for (i, header) in lowered.iter().enumerate() {
            if synonyms.iter().any(|s| header.contains(s)) {
                map.insert(*column, i);
                break;
            }
        }
    }
    tracing::debug!(mapped = map.len(), total = headers.len(), "Mapped schedule headers");
    map
}

/// Turn schedule rows into per-tract coverage entries.
///
/// Rows without a legal-description cell are skipped; county/state/acres
/// cells travel with the entry so descriptions that omit jurisdiction can
/// still resolve at ingestion.
pub fn rows_to_coverage(headers: &[String], rows: &[Vec<String>]) -> Vec<CoverageRecord> {
    let columns = map_headers(headers);
    let Some(&legal_idx) = columns.get(&ScheduleColumn::Legal) else {
        tracing::warn!("Schedule table has no legal-description column; skipped");
        return Vec::new();
    };

    let cell = |row: &[String], column: ScheduleColumn| -> Option<String> {
        let &i = columns.get(&column)?;
        let text = row.get(i)?.trim();
        (!text.is_empty()).then(|| text.to_string())
    };

    rows.iter()
        .filter_map(|row| {
            let legal = row.get(legal_idx)?.trim();
            if legal.is_empty() {
                return None;
            }
            Some(CoverageRecord {
                legal_description: legal.to_string(),
                acres: cell(row, ScheduleColumn::Acres).and_then(|a| a.replace(',', "").parse().ok()),
                county: cell(row, ScheduleColumn::County),
                state: cell(row, ScheduleColumn::State),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_synonym_headers() {
        let headers = strings(&["Lessor", "Lessee", "Bk/Pg", "Land Description", "Gross Acres"]);
        let map = map_headers(&headers);
        assert_eq!(map[&ScheduleColumn::Grantor], 0);
        assert_eq!(map[&ScheduleColumn::Grantee], 1);
        assert_eq!(map[&ScheduleColumn::Recording], 2);
        assert_eq!(map[&ScheduleColumn::Legal], 3);
        assert_eq!(map[&ScheduleColumn::Acres], 4);
    }

    #[test]
    fn rows_become_coverage_entries() {
        let headers = strings(&["Lessor", "Description", "County", "State", "Acres"]);
        let rows = vec![
            strings(&["Smith", "NW/4 Sec 15-154N-97W", "Williams", "ND", "160"]),
            strings(&["Jones", "", "Williams", "ND", "80"]),
            strings(&["Brown", "SE/4 Sec 22-154N-97W", "Williams", "ND", "1,280.5"]),
        ];

        let coverage = rows_to_coverage(&headers, &rows);
        assert_eq!(coverage.len(), 2);
        assert_eq!(coverage[0].legal_description, "NW/4 Sec 15-154N-97W");
        assert_eq!(coverage[0].county.as_deref(), Some("Williams"));
        assert_eq!(coverage[0].acres, Some(160.0));
        assert_eq!(coverage[1].acres, Some(1280.5));
    }

    #[test]
    fn missing_legal_column_yields_nothing() {
        let headers = strings(&["Lessor", "County"]);
        let rows = vec![strings(&["Smith", "Williams"])];
        assert!(rows_to_coverage(&headers, &rows).is_empty());
    }
}
