use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use futures::future::join_all;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::ai;
use crate::api::ApiClient;
use crate::cache::EventCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, SessionError};
use crate::models::{Comment, Credentials, Event, EventDraft, Profile, User};
use crate::notify::{Notice, Notifier};
use crate::session::SessionStore;

#[derive(Debug, Default)]
struct LoadState {
    in_flight: usize,
    error: Option<String>,
}

/// Client-side state for one signed-in (or anonymous) user.
///
/// Every mutation goes to the API first; the server's copy of the event then
/// replaces the cached one. Failures become error notices and leave the cache
/// as it was. Share it behind an `Arc`; no lock is held across a request.
pub struct EventStore {
    config: ClientConfig,
    session: Arc<SessionStore>,
    api: ApiClient,
    cache: Mutex<EventCache>,
    state: Mutex<LoadState>,
    notifier: Notifier,
}

impl EventStore {
    /// Restores the session and wires the gateway without touching the network.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::restore(config.session_path()));
        let api = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            config,
            session,
            api,
            cache: Mutex::new(EventCache::new()),
            state: Mutex::new(LoadState::default()),
            notifier: Notifier::new(),
        })
    }

    /// `new` followed by the initial fetch of all events. A failed fetch is
    /// reported through `error()` and a notice, not as an `Err`.
    pub async fn init(config: ClientConfig) -> Result<Self, ApiError> {
        let store = Self::new(config)?;
        store.refresh().await;
        Ok(store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current()
    }

    pub fn list(&self) -> Vec<Event> {
        self.cache().snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Event> {
        self.cache().get(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.load_state().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.load_state().error.clone()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let result = self.session.login(&self.api, credentials).await;
        self.report_auth(result, "Login failed")
    }

    pub async fn register(&self, profile: &Profile) -> Result<User, SessionError> {
        let result = self.session.register(&self.api, profile).await;
        self.report_auth(result, "Registration failed")
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.logout()?;
        tracing::info!("signed out");
        Ok(())
    }

    /// Reloads the whole list. Events deleted while the request was in flight
    /// stay deleted even if the response still lists them.
    pub async fn refresh(&self) {
        self.load_state().in_flight += 1;
        let mark = self.cache().reload_mark();
        let result = self.api.list_events().await;

        let mut state = self.load_state();
        state.in_flight = state.in_flight.saturating_sub(1);
        match result {
            Ok(events) => {
                tracing::info!(count = events.len(), "events loaded");
                self.cache().replace_loaded(events, mark);
                state.error = None;
            }
            Err(err) => {
                let message = err.user_message("Failed to fetch events");
                tracing::warn!("event list failed: {err}");
                state.error = Some(message.clone());
                drop(state);
                self.notifier.error(message);
            }
        }
    }

    /// Returns the cached copy after the upsert: a newer cached version wins
    /// over a stale response, and an event deleted meanwhile yields `None`.
    pub async fn fetch_one(&self, id: &str) -> Option<Event> {
        match self.api.get_event(id).await {
            Ok(event) => {
                let mut cache = self.cache();
                let fetched_id = event.id.clone();
                cache.upsert(event);
                cache.get(&fetched_id).cloned()
            }
            Err(err) => {
                self.report("fetch event", &err, "Failed to fetch event details");
                None
            }
        }
    }

    pub async fn create(&self, draft: &EventDraft) -> Option<Event> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "event draft incomplete");
            self.notifier.error("Please fill in all required fields.");
            return None;
        }

        match self.api.create_event(draft).await {
            Ok(event) => {
                tracing::info!(event_id = %event.id, "event created");
                self.cache().prepend(event.clone());
                self.notifier.success("Event created successfully!");
                Some(event)
            }
            Err(err) => {
                self.report("create event", &err, "Failed to create event");
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.api.delete_event(id).await {
            Ok(()) => {
                tracing::info!(event_id = %id, "event deleted");
                self.cache().remove(id);
                self.notifier.success("Event deleted successfully");
                true
            }
            Err(err) => {
                self.report("delete event", &err, "Failed to delete event");
                false
            }
        }
    }

    /// Does nothing, without contacting the server, when nobody is signed in.
    pub async fn register_attendance(&self, id: &str) -> Option<Event> {
        if !self.session.is_authenticated() {
            return None;
        }
        match self.api.register_for_event(id).await {
            Ok(event) => {
                tracing::info!(event_id = %id, "registered for event");
                self.update_event(event.clone());
                self.notifier.success("Successfully registered for the event!");
                Some(event)
            }
            Err(err) => {
                self.report("register for event", &err, "Failed to register for event");
                None
            }
        }
    }

    pub async fn add_comment(&self, id: &str, text: &str) -> Option<Event> {
        if !self.session.is_authenticated() || text.trim().is_empty() {
            return None;
        }
        match self.api.add_comment(id, text).await {
            Ok(event) => {
                self.update_event(event.clone());
                Some(event)
            }
            Err(err) => {
                self.report("add comment", &err, "Failed to add comment");
                None
            }
        }
    }

    /// Asks the assistant to answer `history`. Skipped when the thread is empty
    /// or already ends with an assistant reply.
    pub async fn add_ai_comment(&self, event: &Event, history: &[Comment]) -> Option<Event> {
        if !ai::thread_needs_reply(history) {
            tracing::debug!(event_id = %event.id, "thread already answered");
            return None;
        }
        match self.api.generate_chat_reply(event, history).await {
            Ok(updated) => {
                self.update_event(updated.clone());
                Some(updated)
            }
            Err(err) => {
                self.report("ai reply", &err, "AI failed to respond");
                None
            }
        }
    }

    /// Requests an assistant reply when the signed-in user wrote the last
    /// comment on the cached event. The check runs again after the configured
    /// delay, so a reply that landed meanwhile suppresses this one. Returns
    /// whether a request was sent.
    pub async fn reply_with_ai_if_needed(&self, id: &str) -> bool {
        let Some(user) = self.session.current() else {
            return false;
        };
        let awaiting = |event: &Event| ai::awaits_ai_reply_for(event, &user.id);

        if !self.get(id).is_some_and(|event| awaiting(&event)) {
            return false;
        }
        if !self.config.ai_reply_delay.is_zero() {
            sleep(self.config.ai_reply_delay).await;
        }

        let Some(event) = self.get(id).filter(|event| awaiting(event)) else {
            return false;
        };
        self.add_ai_comment(&event, &event.comments).await;
        true
    }

    /// Replace-by-id for an event obtained outside the store.
    pub fn update_event(&self, event: Event) {
        self.cache().upsert(event);
    }

    pub async fn generate_description(&self, title: &str, keywords: &str) -> Option<String> {
        if title.trim().is_empty() {
            self.notifier
                .error("Please enter a title first to generate a description.");
            return None;
        }
        match self.api.generate_description(title, keywords).await {
            Ok(description) => Some(description),
            Err(err) => {
                self.report("ai description", &err, "Failed to generate description.");
                None
            }
        }
    }

    /// Turns each AI idea into a draft and creates them all concurrently.
    pub async fn generate_ideas(&self, prompt: &str) -> Vec<Event> {
        if prompt.trim().is_empty() {
            return Vec::new();
        }
        let ideas = match self.api.generate_ideas(prompt).await {
            Ok(ideas) => ideas,
            Err(err) => {
                self.report(
                    "ai ideas",
                    &err,
                    "An error occurred while generating ideas.",
                );
                return Vec::new();
            }
        };
        if ideas.is_empty() {
            self.notifier
                .error("AI couldn't generate ideas. Try a different prompt.");
            return Vec::new();
        }

        let today = Local::now().date_naive();
        let drafts: Vec<EventDraft> = ideas
            .iter()
            .map(|idea| ai::draft_from_idea(idea, today))
            .collect();
        let created: Vec<Event> = join_all(drafts.iter().map(|draft| self.create(draft)))
            .await
            .into_iter()
            .flatten()
            .collect();

        self.notifier
            .success(format!("{} new event ideas generated!", ideas.len()));
        created
    }

    fn report_auth(
        &self,
        result: Result<User, SessionError>,
        fallback: &str,
    ) -> Result<User, SessionError> {
        if let Err(err) = &result {
            tracing::warn!("{fallback}: {err}");
            self.notifier.error(err.user_message(fallback));
        }
        result
    }

    fn report(&self, operation: &str, err: &ApiError, fallback: &str) {
        tracing::warn!(operation, "request failed: {err}");
        self.notifier.error(err.user_message(fallback));
    }

    fn cache(&self) -> MutexGuard<'_, EventCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
