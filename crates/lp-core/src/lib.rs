//! lp-core/src/lib.rs
//!
//! The central logic and port definitions for Loop+: ride matching, the
//! chat thread cache and the small amount of state around them.

pub mod catalog;
pub mod clock;
pub mod context;
pub mod discovery;
pub mod error;
pub mod exclusions;
pub mod matcher;
pub mod models;
pub mod offer;
pub mod profile;
pub mod storage;
pub mod suggestion;
pub mod threads;
pub mod traits;

// Re-exporting for easier access in other crates
pub use context::{AppContext, ContextOptions};
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_thread_payload_shape() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let thread = ChatThread {
            id: "ride-02".to_string(),
            ride: RideMatch {
                ride_id: "ride-02".to_string(),
                origin: "Gare de Lyon".to_string(),
                destination: "Station F".to_string(),
                departure: at,
                driver_name: "Alex Martin".to_string(),
                partner_name: "Alex Martin".to_string(),
                role: RideRole::Passenger,
            },
            messages: vec![ChatMessage::new(MessageSender::Me, "hi", at)],
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json["ride"]["rideId"], "ride-02");
        assert_eq!(json["ride"]["role"], "passenger");
        assert_eq!(json["messages"][0]["sender"], "me");
        assert!(json["messages"][0].get("quick").is_none());
        assert_eq!(json["updatedAt"], "2026-03-02T08:00:00Z");
    }

    #[test]
    fn test_candidate_accepts_missing_optionals() {
        let ride: CandidateRide = serde_json::from_str(
            r#"{
                "id": "ride-09",
                "driverName": "Ana",
                "driverGender": "non-binary",
                "origin": "A",
                "destination": "B",
                "departure": "2026-03-02T08:00:00Z",
                "seatsLeft": 0,
                "distanceFromYouKm": 1.5
            }"#,
        )
        .unwrap();
        assert_eq!(ride.driver_gender, DriverGender::NonBinary);
        assert!(ride.driver_company.is_none());
        assert!(ride.tags.is_empty());
    }
}
