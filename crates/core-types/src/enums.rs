use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical option type of a warrant.
///
/// Sources spell this in several ways (`call`, `Put`, ...); everything past the
/// loaders only ever sees one of these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "A")]
    Call,
    #[serde(rename = "S")]
    Put,
    #[serde(rename = "-")]
    Unknown,
}

impl OptionType {
    /// Maps a raw source value onto the canonical symbol set.
    ///
    /// `call`/`put` are matched case-insensitively; the canonical symbols `A`/`S`
    /// map to themselves so normalizing twice is a no-op. Anything else,
    /// including a missing value, becomes `Unknown`.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return OptionType::Unknown;
        };
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("call") || raw == "A" {
            OptionType::Call
        } else if raw.eq_ignore_ascii_case("put") || raw == "S" {
            OptionType::Put
        } else {
            OptionType::Unknown
        }
    }

    /// Returns the display symbol used in reports and exports.
    pub fn symbol(&self) -> &'static str {
        match self {
            OptionType::Call => "A",
            OptionType::Put => "S",
            OptionType::Unknown => "-",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_source_spellings() {
        assert_eq!(OptionType::normalize(Some("call")), OptionType::Call);
        assert_eq!(OptionType::normalize(Some(" PUT ")), OptionType::Put);
        assert_eq!(OptionType::normalize(Some("Call")), OptionType::Call);
    }

    #[test]
    fn unrecognized_or_missing_is_unknown() {
        assert_eq!(OptionType::normalize(None), OptionType::Unknown);
        assert_eq!(OptionType::normalize(Some("")), OptionType::Unknown);
        assert_eq!(OptionType::normalize(Some("straddle")), OptionType::Unknown);
    }

    #[test]
    fn normalizing_a_symbol_is_idempotent() {
        for option_type in [OptionType::Call, OptionType::Put, OptionType::Unknown] {
            assert_eq!(OptionType::normalize(Some(option_type.symbol())), option_type);
        }
    }

    #[test]
    fn serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&OptionType::Call).unwrap(), "\"A\"");
        assert_eq!(serde_json::to_string(&OptionType::Unknown).unwrap(), "\"-\"");
    }
}
