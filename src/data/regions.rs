//! U.S. state codes and the geographic feature → region lookup contract.

use super::model::RegionCode;

/// (code, name, FIPS) for the 50 states.
const STATES: [(&str, &str, &str); 50] = [
    ("AL", "Alabama", "01"),
    ("AK", "Alaska", "02"),
    ("AZ", "Arizona", "04"),
    ("AR", "Arkansas", "05"),
    ("CA", "California", "06"),
    ("CO", "Colorado", "08"),
    ("CT", "Connecticut", "09"),
    ("DE", "Delaware", "10"),
    ("FL", "Florida", "12"),
    ("GA", "Georgia", "13"),
    ("HI", "Hawaii", "15"),
    ("ID", "Idaho", "16"),
    ("IL", "Illinois", "17"),
    ("IN", "Indiana", "18"),
    ("IA", "Iowa", "19"),
    ("KS", "Kansas", "20"),
    ("KY", "Kentucky", "21"),
    ("LA", "Louisiana", "22"),
    ("ME", "Maine", "23"),
    ("MD", "Maryland", "24"),
    ("MA", "Massachusetts", "25"),
    ("MI", "Michigan", "26"),
    ("MN", "Minnesota", "27"),
    ("MS", "Mississippi", "28"),
    ("MO", "Missouri", "29"),
    ("MT", "Montana", "30"),
    ("NE", "Nebraska", "31"),
    ("NV", "Nevada", "32"),
    ("NH", "New Hampshire", "33"),
    ("NJ", "New Jersey", "34"),
    ("NM", "New Mexico", "35"),
    ("NY", "New York", "36"),
    ("NC", "North Carolina", "37"),
    ("ND", "North Dakota", "38"),
    ("OH", "Ohio", "39"),
    ("OK", "Oklahoma", "40"),
    ("OR", "Oregon", "41"),
    ("PA", "Pennsylvania", "42"),
    ("RI", "Rhode Island", "44"),
    ("SC", "South Carolina", "45"),
    ("SD", "South Dakota", "46"),
    ("TN", "Tennessee", "47"),
    ("TX", "Texas", "48"),
    ("UT", "Utah", "49"),
    ("VT", "Vermont", "50"),
    ("VA", "Virginia", "51"),
    ("WA", "Washington", "53"),
    ("WV", "West Virginia", "54"),
    ("WI", "Wisconsin", "55"),
    ("WY", "Wyoming", "56"),
];

/// Whether `code` is one of the 50 state codes (exact, upper case).
pub fn is_known_region(code: &str) -> bool {
    STATES.iter().any(|(c, _, _)| *c == code)
}

/// Full state name for a code.
pub fn region_name(code: &str) -> Option<&'static str> {
    STATES.iter().find(|(c, _, _)| *c == code).map(|(_, n, _)| *n)
}

/// Resolves a geographic feature identifier to a region code.
///
/// This is the only thing the core needs from the boundary data that drives
/// the map. Unknown identifiers resolve to `None`.
pub trait RegionLookup {
    fn lookup(&self, feature_id: &str) -> Option<RegionCode>;
}

/// Built-in lookup accepting state codes, state names and FIPS identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsStateLookup;

impl RegionLookup for UsStateLookup {
    fn lookup(&self, feature_id: &str) -> Option<RegionCode> {
        let id = feature_id.trim();
        if id.is_empty() {
            return None;
        }
        let upper = id.to_ascii_uppercase();
        // FIPS ids sometimes arrive without the leading zero ("6" for CA).
        let fips = if id.len() == 1 && id.chars().all(|c| c.is_ascii_digit()) {
            format!("0{id}")
        } else {
            id.to_string()
        };
        STATES
            .iter()
            .find(|(code, name, fips_code)| {
                *code == upper || name.eq_ignore_ascii_case(id) || *fips_code == fips
            })
            .map(|(code, _, _)| code.to_string())
    }
}

impl<F> RegionLookup for F
where
    F: Fn(&str) -> Option<RegionCode>,
{
    fn lookup(&self, feature_id: &str) -> Option<RegionCode> {
        self(feature_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions() {
        assert!(is_known_region("CA"));
        assert!(is_known_region("WY"));
        assert!(!is_known_region("DC"));
        assert!(!is_known_region("ca"));
        assert!(!is_known_region(""));
        assert_eq!(region_name("NY"), Some("New York"));
    }

    #[test]
    fn test_us_state_lookup() {
        let lookup = UsStateLookup;
        assert_eq!(lookup.lookup("California").as_deref(), Some("CA"));
        assert_eq!(lookup.lookup("new york").as_deref(), Some("NY"));
        assert_eq!(lookup.lookup("06").as_deref(), Some("CA"));
        assert_eq!(lookup.lookup("6").as_deref(), Some("CA"));
        assert_eq!(lookup.lookup("tx").as_deref(), Some("TX"));
        assert_eq!(lookup.lookup("Atlantis"), None);
        assert_eq!(lookup.lookup("11"), None);
        assert_eq!(lookup.lookup(""), None);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |id: &str| (id == "feature-7").then(|| "WA".to_string());
        assert_eq!(lookup.lookup("feature-7").as_deref(), Some("WA"));
        assert_eq!(lookup.lookup("feature-8"), None);
    }
}
