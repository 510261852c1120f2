//! Spatial key derivation from raw legal-description text.
//!
//! A description resolves to a canonical key only when all five mandatory
//! components are found: state, county, section, township, range. The
//! aliquot part is optional. The section/township/range grammar is an
//! ordered list of independent patterns tried in priority order; the first
//! pattern that fully resolves wins.

use std::sync::OnceLock;

use regex::Regex;

use titlegraph_core::{SpatialKey, TitleError};

/// Full state name → two-letter abbreviation used as the key prefix.
const STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
];

fn state_abbrev_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Guarded so "IN" inside "IN OKLAHOMA" does not match as Indiana:
        // the abbreviation must follow a comma or whitespace and be followed
        // by end-of-string, a comma, or a number.
        let alternation = STATE_ABBREVIATIONS
            .iter()
            .map(|(_, abbrev)| *abbrev)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"(?:,\s*|\s+)({alternation})(?:\s*$|\s*,|\s+\d)"
        ))
        .expect("valid regex")
    })
}

fn county_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+(?:\s+\w+)?)\s+(?:COUNTY|PARISH)").expect("valid regex"))
}

/// Derive the canonical spatial key from a raw legal description.
///
/// Returns `None` when any mandatory component cannot be resolved; callers
/// must treat that as "unresolved" and never fabricate a partial key.
pub fn parse_legal_description(legal_desc: &str) -> Option<SpatialKey> {
    let text = legal_desc.trim().to_uppercase();
    if text.is_empty() {
        return None;
    }

    let state = extract_state(&text);
    let county = extract_county(&text);
    let str_triple = extract_section_township_range(&text);
    let aliquot = extract_aliquot(&text);

    match (state, county, str_triple) {
        (Some(state), Some(county), Some((section, township, range))) => Some(SpatialKey {
            state,
            county,
            section,
            township,
            range,
            aliquot,
        }),
        (state, county, triple) => {
            tracing::debug!(
                state = ?state,
                county = ?county,
                str_triple = ?triple,
                "Could not resolve legal description"
            );
            None
        }
    }
}

/// Like [`parse_legal_description`], for callers that treat an unresolved
/// description as an error rather than an exclusion.
pub fn require_legal_description(text: &str) -> Result<SpatialKey, TitleError> {
    parse_legal_description(text).ok_or_else(|| TitleError::UnresolvedSpatialKey {
        text: text.to_string(),
    })
}

/// Extract the two-letter state abbreviation. Full names win over
/// abbreviations because they are more specific.
fn extract_state(text: &str) -> Option<String> {
    for (full_name, abbrev) in STATE_ABBREVIATIONS {
        if text.contains(full_name) {
            return Some((*abbrev).to_string());
        }
    }

    state_abbrev_re()
        .captures(text)
        .map(|c| c[1].to_string())
}

/// Extract the county (or Louisiana parish) name, punctuation-free.
fn extract_county(text: &str) -> Option<String> {
    county_re()
        .captures(text)
        .map(|c| c[1].trim().to_string())
}

/// Extract the section/township/range triple.
///
/// Patterns tried in priority order:
/// 1. "SECTION 15, TOWNSHIP 154 NORTH, RANGE 97 WEST"
/// 2. "SEC 14-3N-4W" / "S14-T3N-R4W"
/// 3. "T154N-R97W, SECTION 15" (township/range first)
/// 4. "T3N R4W" with the section found separately
/// 5. bare "15-154N-97W"
fn extract_section_township_range(text: &str) -> Option<(String, String, String)> {
    static VERBOSE: OnceLock<Regex> = OnceLock::new();
    static COMPACT: OnceLock<Regex> = OnceLock::new();
    static REVERSED: OnceLock<Regex> = OnceLock::new();
    static TWP_RNG: OnceLock<Regex> = OnceLock::new();
    static SEC_ONLY: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();

    let verbose = VERBOSE.get_or_init(|| {
        Regex::new(
            r"SECTION\s+(\d+).*?TOWNSHIP\s+(\d+)\s*(N|NORTH|S|SOUTH).*?RANGE\s+(\d+)\s*(W|WEST|E|EAST)",
        )
        .expect("valid regex")
    });
    if let Some(c) = verbose.captures(text) {
        let township = format!("{}{}", &c[2], &c[3][..1]);
        let range = format!("{}{}", &c[4], &c[5][..1]);
        return Some((c[1].to_string(), township, range));
    }

    let compact = COMPACT.get_or_init(|| {
        Regex::new(r"S(?:EC(?:TION)?)?\s*(\d+)[-,\s]+T?(\d+[NS])[-,\s]+R?(\d+[EW])")
            .expect("valid regex")
    });
    if let Some(c) = compact.captures(text) {
        return Some((c[1].to_string(), c[2].to_string(), c[3].to_string()));
    }

    let reversed = REVERSED.get_or_init(|| {
        Regex::new(r"T(\d+[NS])[-,\s]+R(\d+[EW]).*?S(?:EC(?:TION)?)?\s*(\d+)")
            .expect("valid regex")
    });
    if let Some(c) = reversed.captures(text) {
        return Some((c[3].to_string(), c[1].to_string(), c[2].to_string()));
    }

    let twp_rng =
        TWP_RNG.get_or_init(|| Regex::new(r"T(\d+[NS])[-,\s]+R(\d+[EW])").expect("valid regex"));
    if let Some(c) = twp_rng.captures(text) {
        let sec_only =
            SEC_ONLY.get_or_init(|| Regex::new(r"S(?:EC(?:TION)?)?\s*(\d+)").expect("valid regex"));
        if let Some(s) = sec_only.captures(text) {
            return Some((s[1].to_string(), c[1].to_string(), c[2].to_string()));
        }
    }

    let bare =
        BARE.get_or_init(|| Regex::new(r"(\d+)-(\d+[NS])-(\d+[EW])").expect("valid regex"));
    if let Some(c) = bare.captures(text) {
        return Some((c[1].to_string(), c[2].to_string(), c[3].to_string()));
    }

    None
}

/// Extract aliquot parts: "NW/4", "S/2", "NORTH HALF", "SOUTHWEST QUARTER".
/// Multiple parts are deduped, sorted, and hyphen-joined.
fn extract_aliquot(text: &str) -> Option<String> {
    static FRACTION: OnceLock<Regex> = OnceLock::new();

    // Longer directions first: leftmost-first alternation would otherwise
    // match the "N" of "NW/4" and fail on the fraction digit.
    let fraction = FRACTION.get_or_init(|| {
        Regex::new(r"(NE|NW|SE|SW|N|S|E|W)\s*[/\\]?\s*([24])").expect("valid regex")
    });

    let mut parts: Vec<String> = Vec::new();
    for c in fraction.captures_iter(text) {
        let part = format!("{}{}", &c[1], &c[2]);
        if !parts.contains(&part) {
            parts.push(part);
        }
    }

    const SPELLED: &[(&str, &str)] = &[
        (r"NORTH\s*EAST\s*(?:QUARTER|1/4)", "NE4"),
        (r"NORTH\s*WEST\s*(?:QUARTER|1/4)", "NW4"),
        (r"SOUTH\s*EAST\s*(?:QUARTER|1/4)", "SE4"),
        (r"SOUTH\s*WEST\s*(?:QUARTER|1/4)", "SW4"),
        (r"NORTH\s*(?:HALF|1/2)", "N2"),
        (r"SOUTH\s*(?:HALF|1/2)", "S2"),
        (r"EAST\s*(?:HALF|1/2)", "E2"),
        (r"WEST\s*(?:HALF|1/2)", "W2"),
    ];
    static SPELLED_RES: OnceLock<Vec<Regex>> = OnceLock::new();
    let spelled_res = SPELLED_RES.get_or_init(|| {
        SPELLED
            .iter()
            .map(|(p, _)| Regex::new(p).expect("valid regex"))
            .collect()
    });

    for (re, (_, replacement)) in spelled_res.iter().zip(SPELLED) {
        if re.is_match(text) && !parts.iter().any(|p| p == replacement) {
            parts.push((*replacement).to_string());
        }
    }

    if parts.is_empty() {
        return None;
    }
    parts.sort();
    Some(parts.join("-"))
}
