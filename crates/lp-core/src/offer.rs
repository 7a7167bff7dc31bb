//! # Offer-ride form
//!
//! Three steps (origin, destination, departure & seats) followed by a
//! confirmation. Every edit overwrites the stored draft so the matcher and
//! a later visit see the latest values.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::models::RideDraft;
use crate::storage::{self, keys};
use crate::traits::KeyValueStore;

pub const DEFAULT_SEATS: u32 = 2;
pub const STEP_COUNT: usize = 3;

const EUR_PER_SEAT: f64 = 6.5;
const CO2_KG_PER_SEAT: f64 = 4.2;

/// The draft as stored: fields may still be empty while the form is being
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<DateTime<Utc>>,
    /// 0 when the stored value was missing or not positive
    #[serde(default, deserialize_with = "positive_seats")]
    pub seats: u32,
}

fn positive_seats<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|seats| *seats > 0)
        .map_or(0, |seats| u32::try_from(seats).unwrap_or(u32::MAX)))
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            departure: None,
            seats: DEFAULT_SEATS,
        }
    }
}

impl DraftRecord {
    /// A complete draft, or `None` while origin, destination or departure
    /// is missing.
    pub fn to_draft(&self) -> Option<RideDraft> {
        if self.origin.is_empty() || self.destination.is_empty() {
            return None;
        }
        Some(RideDraft {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure: self.departure?,
            seats: if self.seats == 0 {
                DEFAULT_SEATS
            } else {
                self.seats
            },
        })
    }
}

/// Reads the stored draft in the shape the matcher wants.
pub async fn load_draft(store: &dyn KeyValueStore) -> Option<RideDraft> {
    storage::read_json::<DraftRecord>(store, keys::LAST_RIDE)
        .await?
        .to_draft()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Savings {
    pub euros: f64,
    pub co2_kg: f64,
}

/// Rough monthly-commute savings shown next to the seat picker.
pub fn estimate_savings(seats: u32) -> Savings {
    let seats = f64::from(seats.max(1));
    Savings {
        euros: seats * EUR_PER_SEAT,
        co2_kg: seats * CO2_KG_PER_SEAT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Origin,
    Destination,
    Details,
}

impl Step {
    fn index(self) -> usize {
        match self {
            Step::Origin => 0,
            Step::Destination => 1,
            Step::Details => 2,
        }
    }
}

pub struct OfferForm {
    store: Arc<dyn KeyValueStore>,
    draft: DraftRecord,
    step: Step,
    confirmed: bool,
}

impl OfferForm {
    /// Picks up the last stored draft. Anything unreadable starts a fresh
    /// form; a missing or non-positive seat count falls back to the default
    /// without losing the other fields.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let mut draft: DraftRecord = storage::read_json(store.as_ref(), keys::LAST_RIDE)
            .await
            .unwrap_or_default();
        if draft.seats == 0 {
            draft.seats = DEFAULT_SEATS;
        }
        Self {
            store,
            draft,
            step: Step::Origin,
            confirmed: false,
        }
    }

    pub fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Completion in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let done = self.step.index() + usize::from(self.confirmed);
        done as f64 / STEP_COUNT as f64
    }

    pub fn savings(&self) -> Savings {
        estimate_savings(self.draft.seats)
    }

    async fn save(&self) {
        storage::write_json(self.store.as_ref(), keys::LAST_RIDE, &self.draft).await;
    }

    pub async fn set_origin(&mut self, origin: impl Into<String>) {
        self.draft.origin = origin.into();
        self.save().await;
    }

    pub async fn set_destination(&mut self, destination: impl Into<String>) {
        self.draft.destination = destination.into();
        self.save().await;
    }

    pub async fn set_departure(&mut self, departure: Option<DateTime<Utc>>) {
        self.draft.departure = departure;
        self.save().await;
    }

    pub async fn set_seats(&mut self, seats: u32) {
        self.draft.seats = seats;
        self.save().await;
    }

    fn check_step(&self) -> Result<()> {
        let ok = match self.step {
            Step::Origin => self.draft.origin.trim().chars().count() > 2,
            Step::Destination => self.draft.destination.trim().chars().count() > 2,
            Step::Details => self.draft.departure.is_some() && self.draft.seats > 0,
        };
        if ok {
            return Ok(());
        }
        let message = match self.step {
            Step::Origin => "Enter a pickup origin of at least 3 characters.",
            Step::Destination => "Enter a destination of at least 3 characters.",
            Step::Details => "Pick a departure time and at least one seat.",
        };
        Err(AppError::validation(message))
    }

    /// Moves to the next step, or confirms on the last one.
    pub fn next(&mut self) -> Result<()> {
        self.check_step()?;
        self.step = match self.step {
            Step::Origin => Step::Destination,
            Step::Destination => Step::Details,
            Step::Details => {
                self.confirmed = true;
                Step::Details
            }
        };
        Ok(())
    }

    pub fn back(&mut self) {
        if self.confirmed {
            self.confirmed = false;
            return;
        }
        self.step = match self.step {
            Step::Origin | Step::Destination => Step::Origin,
            Step::Details => Step::Destination,
        };
    }

    /// Starts over from the first step, keeping the stored values.
    pub fn reset(&mut self) {
        self.confirmed = false;
        self.step = Step::Origin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_walk_through_and_confirm() {
        let store = Arc::new(MemoryStore::new());
        let mut form = OfferForm::restore(store.clone()).await;
        assert_eq!(form.draft().seats, DEFAULT_SEATS);

        form.set_origin("  Gy ").await;
        assert!(matches!(form.next(), Err(AppError::Validation(_))));
        assert_eq!(form.step(), Step::Origin);

        form.set_origin("Gare de Lyon").await;
        form.next().unwrap();
        form.set_destination("Station F").await;
        form.next().unwrap();
        assert!(form.next().is_err());

        let departure = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        form.set_departure(Some(departure)).await;
        form.next().unwrap();
        assert!(form.is_confirmed());
        assert_eq!(form.progress(), 1.0);

        form.back();
        assert!(!form.is_confirmed());
        assert_eq!(form.step(), Step::Details);

        let draft = load_draft(store.as_ref()).await.unwrap();
        assert_eq!(draft.origin, "Gare de Lyon");
        assert_eq!(draft.departure, departure);
    }

    #[tokio::test]
    async fn test_incomplete_draft_is_not_a_draft() {
        let store = Arc::new(MemoryStore::new());
        let mut form = OfferForm::restore(store.clone()).await;
        form.set_origin("Gare de Lyon").await;
        form.set_destination("Station F").await;

        assert!(load_draft(store.as_ref()).await.is_none());
    }

    #[tokio::test]
    async fn test_restore_repairs_seats_and_ignores_garbage() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(keys::LAST_RIDE, r#"{"origin":"La Défense","seats":0}"#)
            .await
            .unwrap();
        let form = OfferForm::restore(store.clone()).await;
        assert_eq!(form.draft().origin, "La Défense");
        assert_eq!(form.draft().seats, DEFAULT_SEATS);

        store.set(keys::LAST_RIDE, "]]").await.unwrap();
        let form = OfferForm::restore(store).await;
        assert_eq!(form.draft(), &DraftRecord::default());
    }

    #[tokio::test]
    async fn test_negative_seats_keep_the_route() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::LAST_RIDE,
                r#"{"origin":"Gare de Lyon","destination":"Station F","departure":"2026-03-02T08:00:00Z","seats":-1}"#,
            )
            .await
            .unwrap();

        let form = OfferForm::restore(store.clone()).await;
        assert_eq!(form.draft().origin, "Gare de Lyon");
        assert_eq!(form.draft().destination, "Station F");
        assert_eq!(form.draft().seats, DEFAULT_SEATS);

        let draft = load_draft(store.as_ref()).await.unwrap();
        assert_eq!(draft.seats, DEFAULT_SEATS);
    }

    #[test]
    fn test_savings_floor_at_one_seat() {
        assert_eq!(estimate_savings(0), estimate_savings(1));
        let three = estimate_savings(3);
        assert!((three.euros - 19.5).abs() < 1e-9);
        assert!((three.co2_kg - 12.6).abs() < 1e-9);
    }

    #[test]
    fn test_back_never_goes_below_first_step() {
        let mut form = OfferForm {
            store: Arc::new(MemoryStore::new()),
            draft: DraftRecord::default(),
            step: Step::Origin,
            confirmed: false,
        };
        form.back();
        assert_eq!(form.step(), Step::Origin);
        assert_eq!(form.progress(), 0.0);
    }
}
