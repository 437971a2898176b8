//! Static issuer code → display name table.
//!
//! Warrant catalogs usually carry the issuing brokerage as its exchange member
//! code. When a source has no human-readable name, the code is resolved here.

/// Known warrant issuers, keyed by exchange member code.
pub const ISSUER_NAMES: &[(&str, &str)] = &[
    ("GRM", "Garanti BBVA Yatırım"),
    ("IYM", "İş Yatırım"),
    ("YKR", "Yapı Kredi Yatırım"),
    ("AKM", "Ak Yatırım"),
    ("FNY", "QNB Yatırım"),
    ("INF", "Info Yatırım"),
];

/// Resolves an issuer code to its display name.
///
/// Unmapped values pass through unchanged, which also makes the function safe
/// to apply to a value that is already a display name.
pub fn resolve_issuer_name(code: &str) -> String {
    let code = code.trim();
    ISSUER_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_codes() {
        assert_eq!(resolve_issuer_name("GRM"), "Garanti BBVA Yatırım");
        assert_eq!(resolve_issuer_name(" IYM "), "İş Yatırım");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(resolve_issuer_name("XYZ"), "XYZ");
    }

    #[test]
    fn resolution_is_idempotent() {
        for (code, _) in ISSUER_NAMES {
            let once = resolve_issuer_name(code);
            assert_eq!(resolve_issuer_name(&once), once);
        }
    }
}
