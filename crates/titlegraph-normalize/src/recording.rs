//! Recording-reference and interest-fraction normalization.
//!
//! Recording references come in as "Bk 450/Pg 123", "Book 450, Page 123",
//! "Doc# 2024-001234", or combinations. Fractions come in as "3/16", "50%",
//! or "0.5" and must stay exact: shares are compared and summed as rationals,
//! never as floats.

use std::sync::OnceLock;

use num_rational::Ratio;
use num_traits::Zero;
use regex::Regex;

use titlegraph_core::{Fraction, TitleError};

/// Components parsed out of a recording reference string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingRef {
    pub book: Option<String>,
    pub page: Option<String>,
    pub document_number: Option<String>,
}

/// Format recording components into the canonical display form,
/// e.g. `Bk 450/Pg 123; Doc# 2024-001234`.
pub fn format_recording_ref(
    book: Option<&str>,
    page: Option<&str>,
    document_number: Option<&str>,
) -> String {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"[^\d]").expect("valid regex"));

    let mut parts = Vec::new();

    if let (Some(book), Some(page)) = (book, page) {
        let book = digits.replace_all(book, "");
        let page = digits.replace_all(page, "");
        if !book.is_empty() && !page.is_empty() {
            parts.push(format!("Bk {book}/Pg {page}"));
        }
    }

    if let Some(doc) = document_number {
        let doc = doc.trim();
        if !doc.is_empty() {
            parts.push(format!("Doc# {doc}"));
        }
    }

    parts.join("; ")
}

/// Parse a recording string back into components.
pub fn parse_recording_ref(text: &str) -> RecordingRef {
    static BOOK_PAGE: OnceLock<Regex> = OnceLock::new();
    static DOC: OnceLock<Regex> = OnceLock::new();
    static INST: OnceLock<Regex> = OnceLock::new();

    let mut result = RecordingRef::default();
    if text.trim().is_empty() {
        return result;
    }
    let text = text.to_uppercase();

    let book_page = BOOK_PAGE.get_or_init(|| {
        Regex::new(r"B(?:OO)?K\.?\s*(\d+)\s*[/,]\s*P(?:A?GE?)?\.?\s*(\d+)").expect("valid regex")
    });
    if let Some(c) = book_page.captures(&text) {
        result.book = Some(c[1].to_string());
        result.page = Some(c[2].to_string());
    }

    let doc =
        DOC.get_or_init(|| Regex::new(r"DOC(?:UMENT)?\.?\s*#?\s*([\d-]+)").expect("valid regex"));
    if let Some(c) = doc.captures(&text) {
        result.document_number = Some(c[1].to_string());
    }

    if result.document_number.is_none() {
        let inst = INST
            .get_or_init(|| Regex::new(r"INST(?:RUMENT)?\.?\s*#?\s*([\d-]+)").expect("valid regex"));
        if let Some(c) = inst.captures(&text) {
            result.document_number = Some(c[1].to_string());
        }
    }

    result
}

/// Parse an interest fraction string into an exact rational.
///
/// Accepts `"a/b"`, percentages (`"50%"`, `"12.5%"`), and decimals
/// (`"0.5"`). Decimal forms are converted exactly by scaling to an integer
/// numerator over a power of ten. The result must lie in (0, 1].
pub fn parse_fraction(raw: &str) -> Result<Fraction, TitleError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TitleError::InvalidFraction {
            raw: raw.to_string(),
            reason: "empty".to_string(),
        });
    }

    let value = if let Some(pct) = text.strip_suffix('%') {
        parse_decimal(pct.trim(), raw)? / Ratio::from_integer(100)
    } else if let Some((num, den)) = text.split_once('/') {
        let num: i64 = num.trim().parse().map_err(|_| TitleError::InvalidFraction {
            raw: raw.to_string(),
            reason: format!("bad numerator {:?}", num.trim()),
        })?;
        let den: i64 = den.trim().parse().map_err(|_| TitleError::InvalidFraction {
            raw: raw.to_string(),
            reason: format!("bad denominator {:?}", den.trim()),
        })?;
        if den == 0 {
            return Err(TitleError::InvalidFraction {
                raw: raw.to_string(),
                reason: "zero denominator".to_string(),
            });
        }
        Ratio::new(num, den)
    } else {
        parse_decimal(text, raw)?
    };

    if value <= Ratio::zero() || value > Ratio::from_integer(1) {
        return Err(TitleError::InvalidFraction {
            raw: raw.to_string(),
            reason: "fraction must be in (0, 1]".to_string(),
        });
    }

    Ok(value)
}

/// Exact decimal-to-rational conversion: "0.125" → 125/1000 → 1/8.
fn parse_decimal(text: &str, raw: &str) -> Result<Fraction, TitleError> {
    let invalid = |reason: &str| TitleError::InvalidFraction {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    match text.split_once('.') {
        None => {
            let n: i64 = text.parse().map_err(|_| invalid("not a number"))?;
            Ok(Ratio::from_integer(n))
        }
        Some((whole, frac)) => {
            if frac.len() > 15 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("unparseable decimal"));
            }
            let whole: i64 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| invalid("not a number"))?
            };
            let digits: i64 = frac.parse().map_err(|_| invalid("unparseable decimal"))?;
            let scale = 10i64.pow(frac.len() as u32);
            Ok(Ratio::from_integer(whole) + Ratio::new(digits, scale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_book_page_and_doc() {
        assert_eq!(
            format_recording_ref(Some("450"), Some("123"), None),
            "Bk 450/Pg 123"
        );
        assert_eq!(
            format_recording_ref(Some("Bk 450"), Some("p. 123"), Some("2024-001234")),
            "Bk 450/Pg 123; Doc# 2024-001234"
        );
        assert_eq!(format_recording_ref(None, None, Some("555")), "Doc# 555");
        assert_eq!(format_recording_ref(Some("450"), None, None), "");
    }

    #[test]
    fn parses_book_page_variants() {
        for s in ["Bk 450/Pg 123", "Book 450, Page 123", "BK. 450 / PG. 123"] {
            let r = parse_recording_ref(s);
            assert_eq!(r.book.as_deref(), Some("450"), "{s}");
            assert_eq!(r.page.as_deref(), Some("123"), "{s}");
        }
    }

    #[test]
    fn parses_doc_and_instrument_numbers() {
        let r = parse_recording_ref("Doc# 2024-001234");
        assert_eq!(r.document_number.as_deref(), Some("2024-001234"));

        let r = parse_recording_ref("Instrument #445566");
        assert_eq!(r.document_number.as_deref(), Some("445566"));

        let r = parse_recording_ref("Bk 450/Pg 123; Doc# 99");
        assert_eq!(r.book.as_deref(), Some("450"));
        assert_eq!(r.document_number.as_deref(), Some("99"));
    }

    #[test]
    fn round_trips_through_format() {
        let formatted = format_recording_ref(Some("450"), Some("123"), Some("2024-001234"));
        let parsed = parse_recording_ref(&formatted);
        assert_eq!(parsed.book.as_deref(), Some("450"));
        assert_eq!(parsed.page.as_deref(), Some("123"));
        assert_eq!(parsed.document_number.as_deref(), Some("2024-001234"));
    }

    #[test]
    fn fraction_slash_form() {
        assert_eq!(parse_fraction("3/16").unwrap(), Ratio::new(3, 16));
        assert_eq!(parse_fraction(" 1 / 2 ").unwrap(), Ratio::new(1, 2));
    }

    #[test]
    fn fraction_percent_form_is_exact() {
        assert_eq!(parse_fraction("50%").unwrap(), Ratio::new(1, 2));
        assert_eq!(parse_fraction("12.5%").unwrap(), Ratio::new(1, 8));
    }

    #[test]
    fn fraction_decimal_form_is_exact() {
        assert_eq!(parse_fraction("0.5").unwrap(), Ratio::new(1, 2));
        assert_eq!(parse_fraction("0.125").unwrap(), Ratio::new(1, 8));
        assert_eq!(parse_fraction("1").unwrap(), Ratio::from_integer(1));
    }

    #[test]
    fn fraction_rejects_out_of_range() {
        assert!(parse_fraction("0").is_err());
        assert!(parse_fraction("3/2").is_err());
        assert!(parse_fraction("150%").is_err());
        assert!(parse_fraction("-1/2").is_err());
    }

    #[test]
    fn fraction_rejects_garbage() {
        assert!(parse_fraction("").is_err());
        assert!(parse_fraction("one half").is_err());
        assert!(parse_fraction("1/0").is_err());
    }
}
