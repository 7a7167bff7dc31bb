//! Demo ride catalog. Departures are offsets from the moment the catalog is
//! built, so the list always looks "live".

use chrono::{DateTime, Duration, Utc};

use crate::models::{CandidateRide, DriverGender};

/// Companies offered at onboarding, as `(value, label)`.
pub const COMPANIES: &[(&str, &str)] = &[
    ("guest", "Explore as Guest"),
    ("loop-hq", "Loop HQ"),
    ("renault-fleet", "Renault Fleet Partners"),
    ("urban-co", "Urban Co-Labs"),
    ("campus-commute", "Campus Commute Alliance"),
];

pub fn company_label(value: &str) -> Option<&'static str> {
    COMPANIES
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone)]
pub struct RideCatalog {
    rides: Vec<CandidateRide>,
}

impl RideCatalog {
    pub fn new(rides: Vec<CandidateRide>) -> Self {
        Self { rides }
    }

    /// The five fixture rides, leaving between 15 and 90 minutes after `now`.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let ride = |id: &str,
                    driver: &str,
                    company: &str,
                    gender: DriverGender,
                    origin: &str,
                    destination: &str,
                    in_minutes: i64,
                    seats_left: u32,
                    distance_km: f64,
                    tags: &[&str]| CandidateRide {
            id: id.to_string(),
            driver_name: driver.to_string(),
            driver_company: Some(company.to_string()),
            driver_gender: gender,
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure: now + Duration::minutes(in_minutes),
            seats_left,
            distance_from_you_km: distance_km,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };

        Self::new(vec![
            ride(
                "ride-01",
                "Camille Dupont",
                "Loop HQ",
                DriverGender::Female,
                "Montparnasse Station",
                "Renault Technocentre",
                35,
                2,
                1.2,
                &["EV", "Loop Shuttle"],
            ),
            ride(
                "ride-02",
                "Alex Martin",
                "Urban Co-Labs",
                DriverGender::Male,
                "Gare de Lyon",
                "Station F",
                55,
                1,
                2.4,
                &["Fast lane"],
            ),
            ride(
                "ride-03",
                "Sophie Bernard",
                "Loop HQ",
                DriverGender::Female,
                "Place d'Italie",
                "Renault Design Center",
                20,
                3,
                0.8,
                &["Women drivers"],
            ),
            ride(
                "ride-04",
                "Jamil Rahman",
                "Renault Fleet Partners",
                DriverGender::Male,
                "La Défense",
                "Flins Plant",
                90,
                4,
                3.2,
                &["Carpool lane"],
            ),
            ride(
                "ride-05",
                "Leïla Haddad",
                "Urban Co-Labs",
                DriverGender::Female,
                "Place de la République",
                "Loop HQ",
                15,
                2,
                0.6,
                &["Women drivers", "Hybrid"],
            ),
        ])
    }

    pub fn rides(&self) -> &[CandidateRide] {
        &self.rides
    }

    pub fn find(&self, id: &str) -> Option<&CandidateRide> {
        self.rides.iter().find(|ride| ride.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_is_in_the_future() {
        let now = Utc::now();
        let catalog = RideCatalog::demo(now);
        assert_eq!(catalog.rides().len(), 5);
        assert!(catalog.rides().iter().all(|r| r.departure > now));
        assert_eq!(catalog.find("ride-04").unwrap().driver_name, "Jamil Rahman");
        assert!(catalog.find("ride-99").is_none());
    }

    #[test]
    fn test_company_labels() {
        assert_eq!(company_label("urban-co"), Some("Urban Co-Labs"));
        assert_eq!(company_label("nope"), None);
    }
}
