//! # Matcher
//!
//! Picks at most one catalog ride to suggest for the current draft.
//!
//! A candidate is eligible when
//! 1. its id is in neither exclusion set,
//! 2. both its origin and its destination look like the draft's (see
//!    [`RouteSimilarity`]),
//! 3. it leaves within the time window of the draft, either side, bounds
//!    included,
//! 4. its driver works for the requester's company, or it still has a free
//!    seat. A company match skips the seat check on purpose: colleagues can
//!    squeeze in.
//!
//! The closest departure wins; on a tie the earlier candidate in input order
//! is kept.

use std::collections::HashSet;

use chrono::Duration;

use crate::models::{CandidateRide, MatchSuggestion, RideDraft};

pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

/// Decides whether two free-text places describe the same route end.
pub trait RouteSimilarity: Send + Sync {
    fn similar(&self, a: &str, b: &str) -> bool;
}

/// Splits a place name into comparable words: lower-cased, everything but
/// ASCII letters, digits and whitespace dropped.
pub fn tokenize(value: &str) -> Vec<String> {
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Similar when the two names share at least `min_shared` distinct words.
///
/// With the default of one word this is loose: "Station F" and "Station
/// Montparnasse" match. That is accepted for the product; raise the
/// threshold to tighten it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedTokens {
    pub min_shared: usize,
}

impl Default for SharedTokens {
    fn default() -> Self {
        Self { min_shared: 1 }
    }
}

impl RouteSimilarity for SharedTokens {
    fn similar(&self, a: &str, b: &str) -> bool {
        let words_a: HashSet<String> = tokenize(a).into_iter().collect();
        if words_a.is_empty() {
            return false;
        }
        let words_b: HashSet<String> = tokenize(b).into_iter().collect();
        let shared = words_a.intersection(&words_b).count();
        shared >= self.min_shared.max(1)
    }
}

pub struct Matcher {
    window: Duration,
    route: Box<dyn RouteSimilarity>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(
            Duration::minutes(DEFAULT_WINDOW_MINUTES),
            SharedTokens::default(),
        )
    }
}

impl Matcher {
    pub fn new(window: Duration, route: impl RouteSimilarity + 'static) -> Self {
        Self {
            window,
            route: Box::new(route),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the best suggestion for `draft` among `candidates`, or `None`.
    /// Pure: same inputs, same answer.
    pub fn find_best_match(
        &self,
        candidates: &[CandidateRide],
        draft: &RideDraft,
        requester_company: Option<&str>,
        dismissed: &HashSet<String>,
        joined: &HashSet<String>,
    ) -> Option<MatchSuggestion> {
        let mut best: Option<(&CandidateRide, Duration)> = None;

        for ride in candidates {
            if dismissed.contains(&ride.id) || joined.contains(&ride.id) {
                continue;
            }
            if !self.route.similar(&ride.origin, &draft.origin)
                || !self.route.similar(&ride.destination, &draft.destination)
            {
                continue;
            }

            let delta = (ride.departure - draft.departure).abs();
            if delta > self.window {
                continue;
            }

            let same_company = match (requester_company, ride.driver_company.as_deref()) {
                (Some(mine), Some(theirs)) => !mine.is_empty() && mine == theirs,
                _ => false,
            };
            if !same_company && ride.seats_left == 0 {
                continue;
            }

            // strict: first candidate wins ties
            if best.map_or(true, |(_, best_delta)| delta < best_delta) {
                best = Some((ride, delta));
            }
        }

        best.map(|(ride, delta)| MatchSuggestion {
            ride: ride.clone(),
            overlap_minutes: delta.num_milliseconds() as f64 / 60_000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriverGender;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn ride(id: &str, origin: &str, destination: &str, offset_min: i64, seats: u32) -> CandidateRide {
        CandidateRide {
            id: id.to_string(),
            driver_name: "Alex Martin".to_string(),
            driver_company: Some("Urban Co-Labs".to_string()),
            driver_gender: DriverGender::Male,
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure: t0() + Duration::minutes(offset_min),
            seats_left: seats,
            distance_from_you_km: 2.4,
            tags: vec![],
        }
    }

    fn draft() -> RideDraft {
        RideDraft {
            origin: "Gare de Lyon".to_string(),
            destination: "Station F".to_string(),
            departure: t0(),
            seats: 2,
        }
    }

    fn none() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_tokenize_drops_punctuation_and_accents() {
        assert_eq!(tokenize("Place d'Italie"), vec!["place", "ditalie"]);
        assert_eq!(tokenize("La Défense"), vec!["la", "dfense"]);
        assert!(tokenize("  -- ").is_empty());
    }

    #[test]
    fn test_shared_tokens_threshold() {
        let loose = SharedTokens::default();
        let strict = SharedTokens { min_shared: 2 };
        assert!(loose.similar("Station F Campus", "Station Montparnasse"));
        assert!(!strict.similar("Station F Campus", "Station Montparnasse"));
        assert!(strict.similar("Station F Campus", "Station F"));
        assert!(!loose.similar("", "Station F"));
    }

    #[test]
    fn test_scenario_match_then_dismiss() {
        let candidates = vec![ride("ride-02", "Gare de Lyon Sud", "Station F Campus", 10, 1)];
        let matcher = Matcher::default();

        let found = matcher
            .find_best_match(&candidates, &draft(), None, &none(), &none())
            .expect("should match");
        assert_eq!(found.ride.id, "ride-02");
        assert_eq!(found.overlap_minutes, 10.0);

        let dismissed: HashSet<String> = ["ride-02".to_string()].into();
        assert!(matcher
            .find_best_match(&candidates, &draft(), None, &dismissed, &none())
            .is_none());
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let matcher = Matcher::default();
        let at_edge = vec![ride("a", "Gare de Lyon", "Station F", -30, 1)];
        let past_edge = vec![ride("b", "Gare de Lyon", "Station F", 31, 1)];

        assert!(matcher.find_best_match(&at_edge, &draft(), None, &none(), &none()).is_some());
        assert!(matcher.find_best_match(&past_edge, &draft(), None, &none(), &none()).is_none());
    }

    #[test]
    fn test_both_route_ends_must_match() {
        let matcher = Matcher::default();
        let candidates = vec![ride("a", "Gare de Lyon", "Flins Plant", 0, 3)];
        assert!(matcher.find_best_match(&candidates, &draft(), None, &none(), &none()).is_none());
    }

    #[test]
    fn test_full_ride_needs_company_match() {
        let matcher = Matcher::default();
        let candidates = vec![ride("full", "Gare de Lyon", "Station F", 5, 0)];

        assert!(matcher.find_best_match(&candidates, &draft(), None, &none(), &none()).is_none());
        assert!(matcher
            .find_best_match(&candidates, &draft(), Some("Loop HQ"), &none(), &none())
            .is_none());
        assert!(matcher
            .find_best_match(&candidates, &draft(), Some(""), &none(), &none())
            .is_none());
        assert!(matcher
            .find_best_match(&candidates, &draft(), Some("Urban Co-Labs"), &none(), &none())
            .is_some());
    }

    #[test]
    fn test_closest_wins_and_ties_keep_input_order() {
        let matcher = Matcher::default();
        let candidates = vec![
            ride("late", "Gare de Lyon", "Station F", 20, 1),
            ride("first-tie", "Gare de Lyon", "Station F", -5, 1),
            ride("second-tie", "Gare de Lyon", "Station F", 5, 1),
        ];
        let found = matcher
            .find_best_match(&candidates, &draft(), None, &none(), &none())
            .unwrap();
        assert_eq!(found.ride.id, "first-tie");
        assert_eq!(found.overlap_minutes, 5.0);
    }

    #[test]
    fn test_joined_rides_are_excluded_and_result_is_deterministic() {
        let matcher = Matcher::default();
        let candidates = vec![
            ride("a", "Gare de Lyon", "Station F", 1, 1),
            ride("b", "Gare de Lyon", "Station F", 2, 1),
        ];
        let joined: HashSet<String> = ["a".to_string()].into();

        let first = matcher.find_best_match(&candidates, &draft(), None, &none(), &joined);
        let second = matcher.find_best_match(&candidates, &draft(), None, &none(), &joined);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().ride.id, "b");
    }
}
