//! # Domain Models
//!
//! These structs represent the core entities of Loop+.
//! Field names serialize in camelCase and timestamps as RFC 3339 so stored
//! payloads stay readable by the web front end sharing the same keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The ride the user is currently composing in the offer form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideDraft {
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    /// Always greater than zero
    pub seats: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverGender {
    Female,
    Male,
    NonBinary,
}

/// A pre-existing ride a draft may be matched against. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRide {
    pub id: String,
    pub driver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_company: Option<String>,
    pub driver_gender: DriverGender,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub seats_left: u32,
    pub distance_from_you_km: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Derived from a draft and the catalog; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestion {
    pub ride: CandidateRide,
    /// Absolute distance between both departures, in minutes
    pub overlap_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideRole {
    Driver,
    Passenger,
}

/// Snapshot of a ride embedded in a chat thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideMatch {
    pub ride_id: String,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub driver_name: String,
    pub partner_name: String,
    pub role: RideRole,
}

impl RideMatch {
    /// Builds the snapshot for a catalog ride, the driver being the partner.
    pub fn from_candidate(ride: &CandidateRide, role: RideRole) -> Self {
        Self {
            ride_id: ride.id.clone(),
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            departure: ride.departure,
            driver_name: ride.driver_name.clone(),
            partner_name: ride.driver_name.clone(),
            role,
        }
    }
}

/// Who wrote a message: the local user, the other party, or Loop+ itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Me,
    Partner,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: MessageSender,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    /// Set for canned replies ("On my way", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick: Option<bool>,
}

impl ChatMessage {
    pub fn new(sender: MessageSender, body: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            body: body.into(),
            timestamp,
            quick: None,
        }
    }
}

/// A conversation tied to exactly one ride. `id` is the ride id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: String,
    pub ride: RideMatch,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatThread {
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

impl UserProfile {
    pub fn guest() -> Self {
        Self {
            display_name: "Guest".to_string(),
            company: None,
            is_guest: true,
        }
    }
}
