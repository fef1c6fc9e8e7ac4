use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{Pacing, TimelineOverlap, TravelerProfile, Trip};

/// Score for an exact or compatible match that hits the upper bound
pub const FULL_SCORE: f64 = 1.0;

/// Pacing pairs that aren't in the compatibility matrix
pub const UNMAPPED_PACING_SCORE: f64 = 0.5;

const SHARED_LANGUAGE_SCORE: f64 = 0.8;
const NO_SHARED_LANGUAGE_SCORE: f64 = 0.3;
const SAME_NATIONALITY_SCORE: f64 = 0.7;
const MIXED_NATIONALITY_SCORE: f64 = 0.5;
const DIFFERENT_BASE_CITY_SCORE: f64 = 0.3;

/// Jaccard similarity (|A ∩ B| / |A ∪ B|) of two collections
///
/// Duplicates within either collection are ignored. Returns 0.0 when both
/// collections are empty.
pub fn jaccard_similarity<'a, T, A, B>(a: A, b: B) -> f64
where
    T: Eq + Hash + ?Sized + 'a,
    A: IntoIterator<Item = &'a T>,
    B: IntoIterator<Item = &'a T>,
{
    let set_a: HashSet<&T> = a.into_iter().collect();
    let set_b: HashSet<&T> = b.into_iter().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Timeline score (0-1)
/// Doubles the raw overlap fraction so partial overlaps still count, capped at 1.0
#[inline]
pub fn timeline_score(overlap: &TimelineOverlap) -> f64 {
    (overlap.overlap_percentage * 2.0).min(FULL_SCORE)
}

/// Interest score (0-1): Jaccard similarity of the trips' category tags
pub fn interest_score(trip1: &Trip, trip2: &Trip) -> f64 {
    jaccard_similarity(
        trip1.categories.iter().map(String::as_str),
        trip2.categories.iter().map(String::as_str),
    )
}

/// Pacing score (0-1) from the symmetric pacing compatibility matrix
///
/// ```text
///            RELAXED  NORMAL  ACTIVE
/// RELAXED      1.0     0.7     0.3
/// NORMAL       0.7     1.0     0.7
/// ACTIVE       0.3     0.7     1.0
/// ```
pub fn pacing_score(pacing1: Pacing, pacing2: Pacing) -> f64 {
    use Pacing::*;

    match (pacing1, pacing2) {
        (Unspecified, _) | (_, Unspecified) => UNMAPPED_PACING_SCORE,
        (a, b) if a == b => FULL_SCORE,
        (Relaxed, Normal) | (Normal, Relaxed) => 0.7,
        (Normal, Active) | (Active, Normal) => 0.7,
        (Relaxed, Active) | (Active, Relaxed) => 0.3,
        _ => UNMAPPED_PACING_SCORE,
    }
}

/// Demographic score (0-1)
/// Average of a shared-language factor and a nationality factor
pub fn demographic_score(profile1: &TravelerProfile, profile2: &TravelerProfile) -> f64 {
    let languages: HashSet<&str> = profile1.languages.iter().map(String::as_str).collect();
    let shares_language = profile2
        .languages
        .iter()
        .any(|language| languages.contains(language.as_str()));

    let language_score = if shares_language {
        SHARED_LANGUAGE_SCORE
    } else {
        NO_SHARED_LANGUAGE_SCORE
    };

    // Different nationality is neutral rather than a penalty
    let nationality_score = if profile1.nationality == profile2.nationality {
        SAME_NATIONALITY_SCORE
    } else {
        MIXED_NATIONALITY_SCORE
    };

    (language_score + nationality_score) / 2.0
}

/// Base city score: 1.0 for the same starting city (case-insensitive), else 0.3
pub fn base_city_score(trip1: &Trip, trip2: &Trip) -> f64 {
    if trip1.base_city.to_lowercase() == trip2.base_city.to_lowercase() {
        FULL_SCORE
    } else {
        DIFFERENT_BASE_CITY_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_trip(base_city: &str, categories: &[&str], pacing: Pacing) -> Trip {
        Trip {
            trip_id: "trip".to_string(),
            user_id: "user".to_string(),
            trip_name: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            base_city: base_city.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            pacing,
            places: None,
        }
    }

    fn create_profile(nationality: &str, languages: &[&str]) -> TravelerProfile {
        TravelerProfile {
            id: "user".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            nationality: nationality.to_string(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn overlap_with_percentage(overlap_percentage: f64) -> TimelineOverlap {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        TimelineOverlap {
            overlap_days: 1,
            overlap_percentage,
            overlap_start: day,
            overlap_end: day,
            flexibility_used: 2,
        }
    }

    #[test]
    fn test_jaccard_similarity() {
        assert_eq!(jaccard_similarity(["a", "b"].iter(), ["b", "c"].iter()), 1.0 / 3.0);
        assert_eq!(jaccard_similarity(["a"].iter(), ["a"].iter()), 1.0);
        assert_eq!(jaccard_similarity::<&str, _, _>([].iter(), [].iter()), 0.0);
        // Duplicates collapse
        assert_eq!(jaccard_similarity(["a", "a"].iter(), ["a"].iter()), 1.0);
    }

    #[test]
    fn test_timeline_score_doubles_and_caps() {
        assert_eq!(timeline_score(&overlap_with_percentage(0.0)), 0.0);
        assert_eq!(timeline_score(&overlap_with_percentage(0.25)), 0.5);
        assert_eq!(timeline_score(&overlap_with_percentage(0.5)), 1.0);
        assert_eq!(timeline_score(&overlap_with_percentage(0.9)), 1.0);
    }

    #[test]
    fn test_interest_score() {
        let a = create_trip("Colombo", &["Nature", "Culture"], Pacing::Normal);
        let b = create_trip("Colombo", &["Nature", "Adventure"], Pacing::Normal);
        let empty = create_trip("Colombo", &[], Pacing::Normal);

        assert!((interest_score(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(interest_score(&a, &a), 1.0);
        assert_eq!(interest_score(&empty, &empty), 0.0);
        assert_eq!(interest_score(&a, &empty), 0.0);
    }

    #[test]
    fn test_pacing_matrix() {
        use Pacing::*;

        assert_eq!(pacing_score(Relaxed, Relaxed), 1.0);
        assert_eq!(pacing_score(Normal, Normal), 1.0);
        assert_eq!(pacing_score(Active, Active), 1.0);
        assert_eq!(pacing_score(Relaxed, Normal), 0.7);
        assert_eq!(pacing_score(Normal, Active), 0.7);
        assert_eq!(pacing_score(Relaxed, Active), 0.3);
        assert_eq!(pacing_score(Active, Relaxed), 0.3);
    }

    #[test]
    fn test_pacing_unspecified_falls_back() {
        assert_eq!(pacing_score(Pacing::Unspecified, Pacing::Normal), UNMAPPED_PACING_SCORE);
        assert_eq!(pacing_score(Pacing::Active, Pacing::Unspecified), UNMAPPED_PACING_SCORE);
        assert_eq!(pacing_score(Pacing::Unspecified, Pacing::Unspecified), UNMAPPED_PACING_SCORE);
    }

    #[test]
    fn test_demographic_score() {
        let sri_lankan = create_profile("Sri Lankan", &["Sinhala", "English"]);
        let british = create_profile("British", &["English"]);
        let french = create_profile("French", &["French"]);
        let other_sri_lankan = create_profile("Sri Lankan", &["Tamil"]);

        // Shared language, different nationality: (0.8 + 0.5) / 2
        assert!((demographic_score(&sri_lankan, &british) - 0.65).abs() < 1e-9);
        // Same profile: (0.8 + 0.7) / 2
        assert!((demographic_score(&sri_lankan, &sri_lankan) - 0.75).abs() < 1e-9);
        // Nothing in common: (0.3 + 0.5) / 2
        assert!((demographic_score(&british, &french) - 0.4).abs() < 1e-9);
        // Same nationality, no shared language: (0.3 + 0.7) / 2
        assert!((demographic_score(&sri_lankan, &other_sri_lankan) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_base_city_score() {
        let colombo = create_trip("Colombo", &[], Pacing::Normal);
        let shouting = create_trip("COLOMBO", &[], Pacing::Normal);
        let kandy = create_trip("Kandy", &[], Pacing::Normal);

        assert_eq!(base_city_score(&colombo, &shouting), 1.0);
        assert_eq!(base_city_score(&colombo, &kandy), 0.3);
    }
}
