use indexmap::IndexMap;
use itertools::Itertools;
use std::sync::LazyLock;

/// Seasonal efficiencies for known boiler nameplates, as fractions.
const CATALOG_ENTRIES: [(&str, f64); 12] = [
    ("HX Combi 24", 0.892),
    ("HX Combi 30", 0.891),
    ("HX Combi 35", 0.889),
    ("HX System 18", 0.895),
    ("HX System 24", 0.893),
    ("HX Regular 15", 0.888),
    ("Thermaline CX 28", 0.901),
    ("Thermaline CX 32", 0.899),
    ("Thermaline RS 12", 0.872),
    ("Maxiflame 80e", 0.786),
    ("Maxiflame 100e", 0.781),
    ("Duoheat FF 50", 0.712),
];

static BOILER_CATALOG: LazyLock<IndexMap<String, f64>> = LazyLock::new(|| {
    CATALOG_ENTRIES
        .iter()
        .map(|(nameplate, efficiency)| (normalise_nameplate(nameplate), *efficiency))
        .collect()
});

/// Reduce a nameplate to lowercase alphanumeric words so that spacing,
/// punctuation and case differences on survey forms still match.
pub(crate) fn normalise_nameplate(nameplate: &str) -> String {
    nameplate
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .join(" ")
}

pub fn lookup_seasonal_efficiency(nameplate: &str) -> Option<f64> {
    BOILER_CATALOG.get(&normalise_nameplate(nameplate)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("HX Combi 24", Some(0.892))]
    #[case("hx-combi-24", Some(0.892))]
    #[case("  THERMALINE  cx 28 ", Some(0.901))]
    #[case("HX Combi 99", None)]
    #[case("", None)]
    fn should_look_up_normalised_nameplates(
        #[case] nameplate: &str,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(lookup_seasonal_efficiency(nameplate), expected);
    }

    #[rstest]
    fn should_hold_only_credible_efficiencies() {
        assert_eq!(BOILER_CATALOG.len(), CATALOG_ENTRIES.len());
        assert!(BOILER_CATALOG
            .values()
            .all(|efficiency| (0.55..=0.95).contains(efficiency)));
    }
}
