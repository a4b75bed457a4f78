/// Number of map locations, including the six coastal variants of the three
/// split-coast provinces.
pub const NUM_LOCATIONS: usize = 81;

/// Location names in network order. Row `i` of every per-location feature matrix
/// and of the joint embedding belongs to `LOCATION_NAMES[i]`.
pub const LOCATION_NAMES: [&str; NUM_LOCATIONS] = [
    "YOR", "EDI", "LON", "LVP", "NTH", "WAL", "CLY", //
    "NWG", "ENG", "IRI", "NAO", "BEL", "DEN", "HEL", //
    "HOL", "NWY", "SKA", "BAR", "BRE", "MAO", "PIC", //
    "BUR", "RUH", "BAL", "KIE", "SWE", "FIN", "STP", //
    "STP/NC", "GAS", "PAR", "NAF", "POR", "SPA", "SPA/NC", //
    "SPA/SC", "WES", "MAR", "MUN", "BER", "BOT", "LVN", //
    "PRU", "STP/SC", "MOS", "TUN", "LYO", "TYS", "PIE", //
    "BOH", "SIL", "TYR", "WAR", "SEV", "UKR", "ION", //
    "TUS", "NAP", "ROM", "VEN", "GAL", "VIE", "TRI", //
    "ARM", "BLA", "RUM", "ADR", "AEG", "ALB", "APU", //
    "EAS", "GRE", "BUD", "SER", "ANK", "SMY", "SYR", //
    "BUL", "BUL/EC", "CON", "BUL/SC",
];

/// A map location identified by its fixed network index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(u8);

impl Location {
    pub fn from_index(index: usize) -> Option<Location> {
        (index < NUM_LOCATIONS).then(|| Location(index as u8))
    }

    /// Parse an engine location name such as `"stp/nc"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Location> {
        LOCATION_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| Location(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        LOCATION_NAMES[self.index()]
    }

    /// Iterate over every location in network order.
    pub fn all() -> impl Iterator<Item = Location> {
        (0..NUM_LOCATIONS).map(|i| Location(i as u8))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let unique: HashSet<&str> = LOCATION_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), NUM_LOCATIONS);
    }

    #[test]
    fn test_coastal_variants_present() {
        for name in ["STP/NC", "STP/SC", "SPA/NC", "SPA/SC", "BUL/EC", "BUL/SC"] {
            assert!(Location::from_name(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_lookup_roundtrip() {
        let loc = Location::from_name("stp/nc").unwrap();
        assert_eq!(loc.index(), 28);
        assert_eq!(loc.name(), "STP/NC");
        assert_eq!(Location::from_index(loc.index()), Some(loc));
        assert_eq!(Location::from_index(NUM_LOCATIONS), None);
        assert_eq!(Location::from_name("XYZ"), None);
    }

    #[test]
    fn test_all_in_order() {
        let all: Vec<Location> = Location::all().collect();
        assert_eq!(all.len(), NUM_LOCATIONS);
        assert_eq!(all[0].name(), "YOR");
        assert_eq!(all[80].name(), "BUL/SC");
    }
}
