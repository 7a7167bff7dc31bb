//! Smart suggestion: the matcher applied to whatever draft is currently
//! stored, with skip and accept actions.

use std::sync::Arc;

use tracing::info;

use crate::catalog::RideCatalog;
use crate::exclusions::Exclusions;
use crate::matcher::Matcher;
use crate::models::{MatchSuggestion, RideMatch, RideRole};
use crate::offer::load_draft;
use crate::threads::{OpenOptions, ThreadStore};
use crate::traits::KeyValueStore;

pub struct SmartSuggestion {
    store: Arc<dyn KeyValueStore>,
    matcher: Matcher,
    exclusions: Exclusions,
}

impl SmartSuggestion {
    pub async fn load(store: Arc<dyn KeyValueStore>, matcher: Matcher) -> Self {
        let exclusions = Exclusions::load(store.clone()).await;
        Self {
            store,
            matcher,
            exclusions,
        }
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// The suggestion for the stored draft, if there is a draft and a match.
    /// The draft is re-read every time so edits made elsewhere show up.
    pub async fn current(
        &self,
        catalog: &RideCatalog,
        requester_company: Option<&str>,
    ) -> Option<MatchSuggestion> {
        let draft = load_draft(self.store.as_ref()).await?;
        self.matcher.find_best_match(
            catalog.rides(),
            &draft,
            requester_company,
            self.exclusions.dismissed().as_set(),
            self.exclusions.joined().as_set(),
        )
    }

    /// Skips the current suggestion for good. Returns the skipped ride id.
    pub async fn dismiss(
        &mut self,
        catalog: &RideCatalog,
        requester_company: Option<&str>,
    ) -> Option<String> {
        let suggestion = self.current(catalog, requester_company).await?;
        self.exclusions.dismiss(&suggestion.ride.id).await;
        Some(suggestion.ride.id)
    }

    /// Shares the ride: records the join and opens a chat with its driver.
    pub async fn accept(
        &mut self,
        catalog: &RideCatalog,
        requester_company: Option<&str>,
        threads: &ThreadStore,
    ) -> Option<MatchSuggestion> {
        let suggestion = self.current(catalog, requester_company).await?;
        self.exclusions.join(&suggestion.ride.id).await;
        info!(
            ride_id = %suggestion.ride.id,
            overlap_minutes = suggestion.overlap_minutes,
            "shared ride room created"
        );

        let snapshot = RideMatch::from_candidate(&suggestion.ride, RideRole::Driver);
        threads
            .open_thread_for_ride(&snapshot, OpenOptions::default())
            .await;
        Some(suggestion)
    }
}
