//! # Application context
//!
//! Everything a front end needs, built once at start-up and passed around by
//! reference: the store, the user session, the chat threads, the smart
//! suggestion and the discovery board. Dropping it without [`shutdown`]
//! leaves the expiry sweep running until the runtime stops.
//!
//! [`shutdown`]: AppContext::shutdown

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::info;

use crate::catalog::RideCatalog;
use crate::discovery::DiscoveryBoard;
use crate::error::{AppError, Result};
use crate::matcher::{Matcher, SharedTokens, DEFAULT_WINDOW_MINUTES};
use crate::models::MatchSuggestion;
use crate::offer::OfferForm;
use crate::profile::UserSession;
use crate::suggestion::SmartSuggestion;
use crate::threads::{ThreadStore, DEFAULT_EXPIRY_HOURS};
use crate::traits::{Clock, KeyValueStore};

#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub match_window: Duration,
    pub min_shared_tokens: usize,
    pub thread_expiry: Duration,
    /// `None` disables the background sweep; pruning still happens on load
    pub sweep_every: Option<std::time::Duration>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            match_window: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            min_shared_tokens: 1,
            thread_expiry: Duration::hours(DEFAULT_EXPIRY_HOURS),
            sweep_every: Some(std::time::Duration::from_secs(60 * 60)),
        }
    }
}

pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    catalog: RideCatalog,
    threads: Arc<ThreadStore>,
    user: Mutex<UserSession>,
    suggestion: Mutex<SmartSuggestion>,
    discovery: Mutex<DiscoveryBoard>,
    sweep: Option<JoinHandle<()>>,
}

impl AppContext {
    /// Restores every piece of persisted state and starts the expiry sweep.
    /// Must be called from within a Tokio runtime.
    pub async fn start(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: ContextOptions,
    ) -> Self {
        let catalog = RideCatalog::demo(clock.now());
        let threads =
            Arc::new(ThreadStore::load(store.clone(), clock, options.thread_expiry).await);
        let user = UserSession::load(store.clone()).await;

        let matcher = Matcher::new(
            options.match_window,
            SharedTokens {
                min_shared: options.min_shared_tokens,
            },
        );
        let suggestion = SmartSuggestion::load(store.clone(), matcher).await;

        let sweep = options
            .sweep_every
            .map(|every| threads.spawn_expiry_sweep(every));

        info!(
            onboarded = user.has_onboarded(),
            threads = threads.threads().await.len(),
            "context started"
        );

        Self {
            store,
            catalog,
            threads,
            user: Mutex::new(user),
            suggestion: Mutex::new(suggestion),
            discovery: Mutex::new(DiscoveryBoard::new()),
            sweep,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn catalog(&self) -> &RideCatalog {
        &self.catalog
    }

    pub fn threads(&self) -> &Arc<ThreadStore> {
        &self.threads
    }

    pub async fn user(&self) -> MutexGuard<'_, UserSession> {
        self.user.lock().await
    }

    pub async fn offer_form(&self) -> OfferForm {
        OfferForm::restore(self.store.clone()).await
    }

    async fn requester_company(&self) -> Option<String> {
        self.user.lock().await.company().map(str::to_string)
    }

    pub async fn current_suggestion(&self) -> Option<MatchSuggestion> {
        let company = self.requester_company().await;
        let suggestion = self.suggestion.lock().await;
        suggestion.current(&self.catalog, company.as_deref()).await
    }

    pub async fn dismiss_suggestion(&self) -> Option<String> {
        let company = self.requester_company().await;
        let mut suggestion = self.suggestion.lock().await;
        suggestion.dismiss(&self.catalog, company.as_deref()).await
    }

    pub async fn accept_suggestion(&self) -> Option<MatchSuggestion> {
        let company = self.requester_company().await;
        let mut suggestion = self.suggestion.lock().await;
        suggestion
            .accept(&self.catalog, company.as_deref(), &self.threads)
            .await
    }

    /// Joins a catalog ride from the discovery list.
    pub async fn join_ride(&self, ride_id: &str, from_location: Option<String>) -> Result<bool> {
        let ride = self
            .catalog
            .find(ride_id)
            .ok_or_else(|| AppError::NotFound("Ride".to_string(), ride_id.to_string()))?;
        let mut board = self.discovery.lock().await;
        Ok(board.join(ride, &self.threads, from_location).await)
    }

    pub async fn is_joined(&self, ride_id: &str) -> bool {
        self.discovery.lock().await.is_joined(ride_id)
    }

    /// Stops the sweep and writes the threads one last time.
    pub async fn shutdown(mut self) {
        if let Some(sweep) = self.sweep.take() {
            sweep.abort();
        }
        self.threads.flush().await;
        info!("context shut down");
    }
}
