use serde::{Deserialize, Serialize};

/// Number of great powers on the standard map.
pub const NUM_POWERS: usize = 7;

/// One of the seven factions. The ordinal is the index into the value head output
/// and into every per-power buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Power {
    Austria,
    England,
    France,
    Germany,
    Italy,
    Russia,
    Turkey,
}

pub const ALL_POWERS: [Power; NUM_POWERS] = [
    Power::Austria,
    Power::England,
    Power::France,
    Power::Germany,
    Power::Italy,
    Power::Russia,
    Power::Turkey,
];

impl Power {
    /// Fixed ordinal 0..7.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Power> {
        ALL_POWERS.get(index).copied()
    }

    /// Upper-case engine name, e.g. `"AUSTRIA"`.
    pub fn name(self) -> &'static str {
        match self {
            Power::Austria => "AUSTRIA",
            Power::England => "ENGLAND",
            Power::France => "FRANCE",
            Power::Germany => "GERMANY",
            Power::Italy => "ITALY",
            Power::Russia => "RUSSIA",
            Power::Turkey => "TURKEY",
        }
    }

    /// Parse an engine power name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Power> {
        ALL_POWERS
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_order() {
        for (i, p) in ALL_POWERS.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(Power::from_index(i), Some(*p));
        }
        assert_eq!(Power::from_index(NUM_POWERS), None);
    }

    #[test]
    fn test_name_roundtrip() {
        assert_eq!(Power::from_name("turkey"), Some(Power::Turkey));
        assert_eq!(Power::from_name("FRANCE"), Some(Power::France));
        assert_eq!(Power::from_name("PRUSSIA"), None);
        assert_eq!(Power::England.to_string(), "ENGLAND");
    }

    #[test]
    fn test_serde_uses_engine_names() {
        let json = serde_json::to_string(&Power::Russia).unwrap();
        assert_eq!(json, "\"RUSSIA\"");
        let p: Power = serde_json::from_str("\"ITALY\"").unwrap();
        assert_eq!(p, Power::Italy);
    }
}
