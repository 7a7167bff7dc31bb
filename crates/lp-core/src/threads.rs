//! # Thread Store
//!
//! Owns the chat threads (one per ride), the overlay that displays them and
//! their persistence. Times inside message text are in the host's local
//! time zone; stored timestamps stay UTC.
//!
//! All state lives behind one async mutex that stays held until the
//! mutation has been written back, so an expiry sweep and a message send
//! can never interleave halfway. Every write stores the full collection.

use std::sync::Arc;

use chrono::{Duration, Local};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::models::{ChatMessage, ChatThread, MessageSender, RideMatch};
use crate::storage::{self, keys};
use crate::traits::{Clock, KeyValueStore};

pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Canned replies offered under the message box.
pub const QUICK_REPLIES: [&str; 3] = ["On my way 🚗", "Running late ⏳", "Need to cancel ❌"];

/// What the chat overlay is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayView {
    Closed,
    List,
    /// Conversation view; the payload is the thread (= ride) id
    Thread(String),
}

impl OverlayView {
    pub fn is_open(&self) -> bool {
        !matches!(self, OverlayView::Closed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Where the user was when the overlay opened; handed back by `close`
    pub from_location: Option<String>,
    /// Partner-authored greeting posted when the thread is created
    pub initial_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub quick: bool,
}

#[derive(Debug)]
struct ChatState {
    threads: Vec<ChatThread>,
    view: OverlayView,
    previous_location: Option<String>,
}

impl ChatState {
    fn find_mut(&mut self, id: &str) -> Option<&mut ChatThread> {
        self.threads.iter_mut().find(|thread| thread.id == id)
    }

    fn capture_location(&mut self, from: Option<String>) {
        if let Some(from) = from {
            self.previous_location = Some(from);
        }
    }
}

pub struct ThreadStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    expiry: Duration,
    state: Mutex<ChatState>,
}

fn intro_for(ride: &RideMatch) -> String {
    format!(
        "Loop+ matched you with {} for {} → {} at {}.",
        ride.partner_name,
        ride.origin,
        ride.destination,
        ride.departure.with_timezone(&Local).format("%H:%M"),
    )
}

impl ThreadStore {
    /// Restores threads from `store`, dropping expired ones. Unreadable data
    /// yields an empty store.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        expiry: Duration,
    ) -> Self {
        let threads: Vec<ChatThread> = storage::read_json(store.as_ref(), keys::CHAT_THREADS)
            .await
            .unwrap_or_default();

        let this = Self {
            store,
            clock,
            expiry,
            state: Mutex::new(ChatState {
                threads,
                view: OverlayView::Closed,
                previous_location: None,
            }),
        };
        this.prune_expired().await;
        this
    }

    async fn persist(&self, state: &ChatState) -> bool {
        storage::write_json(self.store.as_ref(), keys::CHAT_THREADS, &state.threads).await
    }

    fn ensure_locked(&self, state: &mut ChatState, ride: &RideMatch) -> bool {
        if let Some(thread) = state.find_mut(&ride.ride_id) {
            thread.ride = ride.clone();
            return true;
        }

        let now = self.clock.now();
        let intro = ChatMessage::new(MessageSender::System, intro_for(ride), now);
        debug!(ride_id = %ride.ride_id, "creating chat thread");
        state.threads.push(ChatThread {
            id: ride.ride_id.clone(),
            ride: ride.clone(),
            messages: vec![intro],
            created_at: now,
            updated_at: now,
        });
        false
    }

    /// Creates the thread for `ride` or refreshes its ride snapshot.
    /// Returns whether it already existed.
    pub async fn ensure_thread(&self, ride: &RideMatch) -> bool {
        let mut state = self.state.lock().await;
        let existed = self.ensure_locked(&mut state, ride);
        self.persist(&state).await;
        existed
    }

    /// Ensures the thread, then shows it in the overlay. The optional
    /// greeting is only posted when the thread is new, so opening the same
    /// ride twice does not repeat it.
    pub async fn open_thread_for_ride(&self, ride: &RideMatch, options: OpenOptions) -> bool {
        let mut state = self.state.lock().await;
        let existed = self.ensure_locked(&mut state, ride);

        state.capture_location(options.from_location);
        state.view = OverlayView::Thread(ride.ride_id.clone());

        if !existed {
            if let Some(greeting) = options.initial_message.filter(|m| !m.trim().is_empty()) {
                let message = ChatMessage::new(MessageSender::Partner, greeting, self.clock.now());
                if let Some(thread) = state.find_mut(&ride.ride_id) {
                    thread.push(message);
                }
            }
        }

        self.persist(&state).await;
        existed
    }

    /// Appends a message. Blank bodies and unknown threads are ignored.
    pub async fn send_message(
        &self,
        thread_id: &str,
        body: &str,
        sender: MessageSender,
        options: SendOptions,
    ) -> Option<ChatMessage> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }

        let mut state = self.state.lock().await;
        let mut message = ChatMessage::new(sender, body, self.clock.now());
        if options.quick {
            message.quick = Some(true);
        }

        let thread = state.find_mut(thread_id)?;
        thread.push(message.clone());
        self.persist(&state).await;
        Some(message)
    }

    /// Removes threads whose ride left more than the expiry period ago.
    /// Returns how many were dropped.
    pub async fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        let before = state.threads.len();
        let expiry = self.expiry;
        state
            .threads
            .retain(|thread| match thread.ride.departure.checked_add_signed(expiry) {
                Some(deadline) => now <= deadline,
                None => true,
            });
        let removed = before - state.threads.len();
        if removed == 0 {
            return 0;
        }

        let stale_view = matches!(
            &state.view,
            OverlayView::Thread(id) if !state.threads.iter().any(|thread| &thread.id == id)
        );
        if stale_view {
            state.view = OverlayView::List;
        }

        info!(removed, "pruned expired chat threads");
        self.persist(&state).await;
        removed
    }

    /// Runs [`prune_expired`](Self::prune_expired) every `every` until the
    /// returned task is aborted.
    pub fn spawn_expiry_sweep(self: &Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                this.prune_expired().await;
            }
        })
    }

    /// Writes the current collection again. Used at shutdown.
    pub async fn flush(&self) -> bool {
        let state = self.state.lock().await;
        self.persist(&state).await
    }

    // ── Overlay ────────────────────────────────────────────────────────────

    /// `Closed -> List`. An already open overlay keeps its view.
    pub async fn open_overlay(&self, from_location: Option<String>) {
        let mut state = self.state.lock().await;
        state.capture_location(from_location);
        if !state.view.is_open() {
            state.view = OverlayView::List;
        }
    }

    /// Opens the overlay on an existing thread. Falls back to the list and
    /// returns false when the id is unknown.
    pub async fn open_thread(&self, thread_id: &str, from_location: Option<String>) -> bool {
        let mut state = self.state.lock().await;
        state.capture_location(from_location);
        if state.threads.iter().any(|thread| thread.id == thread_id) {
            state.view = OverlayView::Thread(thread_id.to_string());
            true
        } else {
            state.view = OverlayView::List;
            false
        }
    }

    /// `List -> Thread`. Ignored while the overlay is closed.
    pub async fn select_thread(&self, thread_id: &str) -> bool {
        let mut state = self.state.lock().await;
        if !state.view.is_open() || !state.threads.iter().any(|t| t.id == thread_id) {
            return false;
        }
        state.view = OverlayView::Thread(thread_id.to_string());
        true
    }

    /// `Thread -> List`.
    pub async fn back_to_list(&self) {
        let mut state = self.state.lock().await;
        if let OverlayView::Thread(_) = state.view {
            state.view = OverlayView::List;
        }
    }

    /// Closes the overlay and hands back the location captured when it was
    /// opened, if any.
    pub async fn close(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        state.view = OverlayView::Closed;
        state.previous_location.take()
    }

    pub async fn mark_previous_location(&self, location: impl Into<String>) {
        self.state.lock().await.previous_location = Some(location.into());
    }

    pub async fn view(&self) -> OverlayView {
        self.state.lock().await.view.clone()
    }

    pub async fn previous_location(&self) -> Option<String> {
        self.state.lock().await.previous_location.clone()
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// All threads, most recently updated first.
    pub async fn threads(&self) -> Vec<ChatThread> {
        let mut threads = self.state.lock().await.threads.clone();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        threads
    }

    pub async fn thread(&self, id: &str) -> Option<ChatThread> {
        let state = self.state.lock().await;
        state.threads.iter().find(|thread| thread.id == id).cloned()
    }

    pub async fn active_thread(&self) -> Option<ChatThread> {
        let state = self.state.lock().await;
        match &state.view {
            OverlayView::Thread(id) => state.threads.iter().find(|t| &t.id == id).cloned(),
            _ => None,
        }
    }
}
