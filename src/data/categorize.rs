//! Free-text job titles and company sizes → fixed categories.

use super::model::{DetailedTrack, SizeBucket, Track};

/// Ordered title rules: the first predicate that matches wins. A title with
/// both "data" and "engineer" must land on DataEngineer before the looser
/// rules further down get a chance.
const TRACK_RULES: [(DetailedTrack, fn(&str) -> bool); 7] = [
    (DetailedTrack::DataScientist, |t| {
        t.contains("data scientist") || t.contains("data science")
    }),
    (DetailedTrack::DataEngineer, |t| {
        t.contains("data") && t.contains("engineer")
    }),
    (DetailedTrack::DataAnalyst, |t| t.contains("analyst")),
    (DetailedTrack::MLEngineer, |t| {
        t.contains("machine learning") || has_word(t, "ml") || has_word(t, "mle")
    }),
    (DetailedTrack::SoftwareEngineer, |t| {
        t.contains("software") || t.contains("developer") || t.contains("engineer")
    }),
    (DetailedTrack::Management, |t| {
        ["manager", "director", "head of", "lead"]
            .iter()
            .any(|word| t.contains(word))
    }),
    (DetailedTrack::Research, |t| t.contains("research")),
];

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == word)
}

/// Classify a title into the five-way [`Track`].
pub fn classify_track(title: &str) -> Track {
    classify_track_detailed(title).into()
}

/// Classify a title into the richer [`DetailedTrack`].
pub fn classify_track_detailed(title: &str) -> DetailedTrack {
    let lowered = title.to_lowercase();
    TRACK_RULES
        .iter()
        .find(|(_, matches)| matches(&lowered))
        .map(|(track, _)| *track)
        .unwrap_or(DetailedTrack::Other)
}

// Large and Medium are tested first: "201 to 500" and "1001 to 5000" both
// contain the Small phrase "1 to 50".
const LARGE_PHRASES: [&str; 3] = ["1001 to 5000", "5001 to 10000", "10000+"];
const MEDIUM_PHRASES: [&str; 2] = ["201 to 500", "501 to 1000"];
const SMALL_PHRASES: [&str; 2] = ["1 to 50", "51 to 200"];

/// Classify a company-size description. Anything unrecognised, including the
/// dataset's `-1` and `Unknown` sentinels, is [`SizeBucket::Unknown`].
pub fn classify_size(text: &str) -> SizeBucket {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() || lowered == "-1" || lowered == "unknown" {
        return SizeBucket::Unknown;
    }
    let any_of = |phrases: &[&str]| phrases.iter().any(|p| lowered.contains(p));
    if any_of(&LARGE_PHRASES[..]) {
        SizeBucket::Large
    } else if any_of(&MEDIUM_PHRASES[..]) {
        SizeBucket::Medium
    } else if any_of(&SMALL_PHRASES[..]) {
        SizeBucket::Small
    } else {
        SizeBucket::Unknown
    }
}
