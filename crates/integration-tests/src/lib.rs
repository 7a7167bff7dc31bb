//! Shared fixtures for the integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lp_core::clock::ManualClock;
use lp_core::models::{CandidateRide, DriverGender, RideDraft, RideMatch, RideRole};

/// Monday 08:00 UTC, the reference instant for every fixture.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

pub fn draft(origin: &str, destination: &str, offset_min: i64) -> RideDraft {
    RideDraft {
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure: t0() + Duration::minutes(offset_min),
        seats: 2,
    }
}

pub fn candidate(
    id: &str,
    origin: &str,
    destination: &str,
    offset_min: i64,
    seats_left: u32,
    company: Option<&str>,
) -> CandidateRide {
    CandidateRide {
        id: id.to_string(),
        driver_name: format!("Driver {id}"),
        driver_company: company.map(str::to_string),
        driver_gender: DriverGender::Female,
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure: t0() + Duration::minutes(offset_min),
        seats_left,
        distance_from_you_km: 1.0,
        tags: vec![],
    }
}

pub fn ride_match(id: &str, departure: DateTime<Utc>) -> RideMatch {
    RideMatch {
        ride_id: id.to_string(),
        origin: "Place d'Italie".to_string(),
        destination: "Renault Design Center".to_string(),
        departure,
        driver_name: "Sophie Bernard".to_string(),
        partner_name: "Sophie Bernard".to_string(),
        role: RideRole::Passenger,
    }
}
