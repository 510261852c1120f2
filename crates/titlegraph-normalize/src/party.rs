//! Party-name normalization for identity matching across documents.
//!
//! `"Smith Oil, LLC"`, `"SMITH OIL LLC"`, and `"Smith Oil, L.L.C."` must all
//! map to the identity key `SMITH OIL`. The entity kind is detected from the
//! original name before suffixes are stripped.

use std::sync::OnceLock;

use regex::Regex;

use titlegraph_core::EntityKind;

/// Trailing entity suffixes stripped from party names.
/// Order matters: longer, more specific patterns first. Each suffix must
/// start its own word ("TEXACO" keeps its CO), hence the leading guard.
const ENTITY_SUFFIXES: &[&str] = &[
    r"(?:,|\s|^)\s*LIMITED\s+LIABILITY\s+COMPANY$",
    r"(?:,|\s|^)\s*LIMITED\s+LIABILITY\s+PARTNERSHIP$",
    r"(?:,|\s|^)\s*LIMITED\s+PARTNERSHIP$",
    r"(?:,|\s|^)\s*INCORPORATED$",
    r"(?:,|\s|^)\s*CORPORATION$",
    r"(?:,|\s|^)\s*COMPANY$",
    r"(?:,|\s|^)\s*LIMITED$",
    r"(?:,|\s|^)\s*L\.?L\.?C\.?$",
    r"(?:,|\s|^)\s*L\.?L\.?P\.?$",
    r"(?:,|\s|^)\s*P\.?L\.?L\.?C\.?$",
    r"(?:,|\s|^)\s*L\.?P\.?$",
    r"(?:,|\s|^)\s*INC\.?$",
    r"(?:,|\s|^)\s*CORP\.?$",
    r"(?:,|\s|^)\s*LTD\.?$",
    r"(?:,|\s|^)\s*P\.?C\.?$",
    r"(?:,|\s|^)\s*CO\.?$",
    r"(?:,|\s|^)\s*ET\s+AL\.?$",
    r"(?:,|\s|^)\s*ET\s+UX\.?$",
    r"(?:,|\s|^)\s*ET\s+VIR\.?$",
    r"(?:,|\s|^)\s*A/K/A\s+.*$",
    r"(?:,|\s|^)\s*AKA\s+.*$",
    r"(?:,|\s|^)\s*F/K/A\s+.*$",
    r"(?:,|\s|^)\s*FKA\s+.*$",
    r"(?:,|\s|^)\s*N/K/A\s+.*$",
    r"(?:,|\s|^)\s*D/B/A\s+.*$",
    r"(?:,|\s|^)\s*DBA\s+.*$",
];

fn suffix_regexes() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        ENTITY_SUFFIXES
            .iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect()
    })
}

/// A party name reduced to its identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParty {
    /// Name exactly as it appeared in the document.
    pub original: String,
    /// Canonical identity key, e.g. `SMITH OIL`.
    pub key: String,
    pub kind: EntityKind,
}

/// Normalize a party name for matching across documents.
///
/// Uppercases, strips trailing entity suffixes (repeatedly, so stacked
/// suffixes like "Smith Oil Company, LLC" fully reduce), removes punctuation
/// except hyphens, collapses whitespace, and drops standalone single letters
/// left behind by separated initials.
pub fn normalize_party_name(name: &str) -> NormalizedParty {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    static WS: OnceLock<Regex> = OnceLock::new();
    static LONE_LETTER: OnceLock<Regex> = OnceLock::new();

    let original = name.trim().to_string();
    if original.is_empty() {
        return NormalizedParty {
            original,
            key: String::new(),
            kind: EntityKind::Unknown,
        };
    }

    let mut text = original.to_uppercase();
    let kind = detect_entity_kind(&text);

    // Strip suffixes to a fixpoint: stripping ", LLC" can expose ", COMPANY".
    loop {
        let mut changed = false;
        for re in suffix_regexes() {
            let replaced = re.replace(&text, "");
            if replaced.len() != text.len() {
                text = replaced.into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let punct = PUNCT.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    let ws = WS.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let lone = LONE_LETTER.get_or_init(|| Regex::new(r"\b[A-Z]\b").expect("valid regex"));

    let text = punct.replace_all(&text, " ");
    let text = ws.replace_all(text.trim(), " ").into_owned();
    let text = lone.replace_all(&text, "");
    let key = ws.replace_all(text.trim(), " ").into_owned();

    NormalizedParty {
        original,
        key,
        kind,
    }
}

/// Detect the entity kind from the original (pre-stripping) name.
pub fn detect_entity_kind(name: &str) -> EntityKind {
    static LLC: OnceLock<Regex> = OnceLock::new();
    static LP: OnceLock<Regex> = OnceLock::new();
    static LLP: OnceLock<Regex> = OnceLock::new();
    static CORP: OnceLock<Regex> = OnceLock::new();
    static PLLC: OnceLock<Regex> = OnceLock::new();
    static CO: OnceLock<Regex> = OnceLock::new();
    static TRUST: OnceLock<Regex> = OnceLock::new();
    static ESTATE: OnceLock<Regex> = OnceLock::new();
    static MARITAL: OnceLock<Regex> = OnceLock::new();
    static SIMPLE: OnceLock<Regex> = OnceLock::new();

    let text = name.to_uppercase();

    let llc = LLC.get_or_init(|| Regex::new(r"L\.L\.C\.?(?:\s|$|,)|\bLLC\b").expect("valid regex"));
    if llc.is_match(&text) {
        return EntityKind::Llc;
    }

    let pllc =
        PLLC.get_or_init(|| Regex::new(r"P\.L\.L\.C\.?(?:\s|$|,)|\bPLLC\b").expect("valid regex"));
    if pllc.is_match(&text) {
        return EntityKind::Llc;
    }

    let llp = LLP.get_or_init(|| Regex::new(r"L\.L\.P\.?(?:\s|$|,)|\bLLP\b").expect("valid regex"));
    if llp.is_match(&text) {
        return EntityKind::Partnership;
    }

    let lp = LP.get_or_init(|| {
        Regex::new(r"L\.P\.?(?:\s|$|,)|\bLP\b|LIMITED\s+PARTNERSHIP").expect("valid regex")
    });
    if lp.is_match(&text) {
        return EntityKind::Partnership;
    }

    let corp = CORP.get_or_init(|| {
        Regex::new(r"\b(INC|INCORPORATED|CORP|CORPORATION)\b").expect("valid regex")
    });
    if corp.is_match(&text) {
        return EntityKind::Corporation;
    }

    // "Acme Oil Co." but not "Acme Oil Company" followed by more text.
    let co = CO.get_or_init(|| Regex::new(r"\bCO\.(?:\s|$|,)").expect("valid regex"));
    if co.is_match(&text) && !text.contains("COMPANY") {
        return EntityKind::Corporation;
    }
    if text.ends_with("COMPANY") {
        return EntityKind::Corporation;
    }

    let trust = TRUST.get_or_init(|| Regex::new(r"\bTRUST\b").expect("valid regex"));
    if trust.is_match(&text) {
        return EntityKind::Trust;
    }

    let estate = ESTATE.get_or_init(|| Regex::new(r"\bESTATE\b").expect("valid regex"));
    if estate.is_match(&text) {
        return EntityKind::Estate;
    }

    let marital =
        MARITAL.get_or_init(|| Regex::new(r"\bET\s+(UX|VIR|AL)\b").expect("valid regex"));
    if marital.is_match(&text) {
        return EntityKind::Individual;
    }

    // Short plain names ("SMITH, JOHN") default to individuals.
    let simple = SIMPLE.get_or_init(|| Regex::new(r"^[A-Z\s,.'-]+$").expect("valid regex"));
    if simple.is_match(&text) {
        let words = text.replace(',', " ");
        if words.split_whitespace().count() <= 4 {
            return EntityKind::Individual;
        }
    }

    EntityKind::Unknown
}
