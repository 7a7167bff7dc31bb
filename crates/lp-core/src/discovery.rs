//! Ride discovery list: the catalog sorted by who is closest, with a few
//! quick filters, and the "join" action that opens the ride's chat.

use std::collections::HashSet;

use tracing::info;

use crate::models::{CandidateRide, DriverGender, RideMatch, RideRole};
use crate::threads::{OpenOptions, ThreadStore};

pub const JOIN_GREETING: &str = "Welcome aboard! Feel free to sync final details here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideFilter {
    #[default]
    All,
    /// Only drivers from the requester's company. Without a company on the
    /// profile this behaves like `All`.
    SameCompany,
    WomenDrivers,
    Earliest,
}

/// Closest first (earliest departure on equal distance), then filtered.
pub fn discover(
    rides: &[CandidateRide],
    filter: RideFilter,
    requester_company: Option<&str>,
) -> Vec<CandidateRide> {
    let mut rides = rides.to_vec();
    rides.sort_by(|a, b| {
        a.distance_from_you_km
            .total_cmp(&b.distance_from_you_km)
            .then_with(|| a.departure.cmp(&b.departure))
    });

    match (filter, requester_company) {
        (RideFilter::SameCompany, Some(company)) if !company.is_empty() => {
            rides.retain(|ride| ride.driver_company.as_deref() == Some(company));
        }
        (RideFilter::WomenDrivers, _) => {
            rides.retain(|ride| ride.driver_gender == DriverGender::Female);
        }
        (RideFilter::Earliest, _) => rides.sort_by(|a, b| a.departure.cmp(&b.departure)),
        _ => {}
    }
    rides
}

/// Rides joined from the list during this session. Not persisted: a fresh
/// session shows every ride as joinable again.
#[derive(Debug, Default)]
pub struct DiscoveryBoard {
    joined: HashSet<String>,
}

impl DiscoveryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_joined(&self, ride_id: &str) -> bool {
        self.joined.contains(ride_id)
    }

    /// Marks the ride joined and opens its chat as a passenger. Returns false
    /// if it had already been joined in this session.
    pub async fn join(
        &mut self,
        ride: &CandidateRide,
        threads: &ThreadStore,
        from_location: Option<String>,
    ) -> bool {
        if !self.joined.insert(ride.id.clone()) {
            return false;
        }
        info!(ride_id = %ride.id, driver = %ride.driver_name, "ride joined");

        let snapshot = RideMatch::from_candidate(ride, RideRole::Passenger);
        threads
            .open_thread_for_ride(
                &snapshot,
                OpenOptions {
                    from_location,
                    initial_message: Some(JOIN_GREETING.to_string()),
                },
            )
            .await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RideCatalog;
    use chrono::{TimeZone, Utc};

    fn ids(rides: &[CandidateRide]) -> Vec<&str> {
        rides.iter().map(|r| r.id.as_str()).collect()
    }

    fn catalog() -> RideCatalog {
        RideCatalog::demo(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap())
    }

    #[test]
    fn test_default_order_is_by_distance() {
        let rides = discover(catalog().rides(), RideFilter::All, None);
        assert_eq!(ids(&rides), ["ride-05", "ride-03", "ride-01", "ride-02", "ride-04"]);
    }

    #[test]
    fn test_earliest_reorders_by_departure() {
        let rides = discover(catalog().rides(), RideFilter::Earliest, None);
        assert_eq!(ids(&rides), ["ride-05", "ride-03", "ride-01", "ride-02", "ride-04"]);
        assert!(rides.windows(2).all(|w| w[0].departure <= w[1].departure));
    }

    #[test]
    fn test_company_and_gender_filters() {
        let catalog = catalog();
        let same = discover(catalog.rides(), RideFilter::SameCompany, Some("Loop HQ"));
        assert_eq!(ids(&same), ["ride-03", "ride-01"]);

        let no_company = discover(catalog.rides(), RideFilter::SameCompany, None);
        assert_eq!(no_company.len(), 5);

        let women = discover(catalog.rides(), RideFilter::WomenDrivers, None);
        assert!(women.iter().all(|r| r.driver_gender == DriverGender::Female));
        assert_eq!(women.len(), 3);
    }
}
