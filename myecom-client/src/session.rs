//! Session store: token lifecycle and the identity derived from it.
//!
//! Every operation that changes the token goes through [`SessionStore::apply`],
//! which bumps a generation counter, installs the token on the HTTP adapter and
//! drops the previous user in one step. Identity fetches remember the
//! generation they were started for; a result whose generation is no longer
//! current is discarded, so the last token change always wins.

use async_trait::async_trait;
use shared::models::{RefreshRequest, RefreshedToken, TokenPair, TokenRequest, User};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    api::ApiClient,
    error::{ClientError, ClientResult},
    storage::{StoredTokens, TokenStore},
};

/// Authentication calls the session store depends on.
#[async_trait]
pub(crate) trait AuthBackend: Send + Sync {
    async fn obtain_token(&self, credentials: &TokenRequest) -> ClientResult<TokenPair>;
    async fn refresh_token(&self, refresh: &RefreshRequest) -> ClientResult<RefreshedToken>;
    async fn current_user(&self) -> ClientResult<User>;
    fn set_auth_token(&self, token: Option<&str>);
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn obtain_token(&self, credentials: &TokenRequest) -> ClientResult<TokenPair> {
        Self::obtain_token(self, credentials).await
    }

    async fn refresh_token(&self, refresh: &RefreshRequest) -> ClientResult<RefreshedToken> {
        Self::refresh_token(self, refresh).await
    }

    async fn current_user(&self) -> ClientResult<User> {
        Self::current_user(self).await
    }

    fn set_auth_token(&self, token: Option<&str>) {
        Self::set_auth_token(self, token);
    }
}

/// Read view of the session handed to guards and front-ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    generation: u64,
    awaiting_restore: bool,
    restored: bool,
    in_flight: u32,
}

impl SessionState {
    const fn new() -> Self {
        Self {
            token: None,
            user: None,
            generation: 0,
            awaiting_restore: true,
            restored: false,
            in_flight: 0,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            loading: self.awaiting_restore || self.in_flight > 0,
        }
    }
}

enum TokenChange {
    Adopt(String),
    Clear,
}

/// Owner of the authentication token and the user derived from it.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
    changes: watch::Sender<SessionSnapshot>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.token.is_some())
            .field("generation", &state.generation)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

/// Keeps `loading` raised for as long as an operation is in progress,
/// including when its future is dropped mid-flight.
struct LoadingGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> LoadingGuard<'a> {
    fn engage(store: &'a SessionStore) -> Self {
        {
            let mut state = store.lock();
            state.in_flight += 1;
            store.publish(&state);
        }
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.awaiting_restore = false;
        self.store.publish(&state);
    }
}

impl SessionStore {
    /// Create the store. The bearer header of `api` (and every clone of it)
    /// is driven by this store from now on.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn TokenStore>) -> Self {
        Self::with_backend(Arc::new(api), storage)
    }

    pub(crate) fn with_backend(backend: Arc<dyn AuthBackend>, storage: Arc<dyn TokenStore>) -> Self {
        let state = SessionState::new();
        let (changes, _) = watch::channel(state.snapshot());
        Self {
            backend,
            storage,
            state: Mutex::new(state),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.changes.send_replace(state.snapshot());
    }

    /// Current `{ user, loading }` view.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// The user derived for the current token, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// Receive a new snapshot after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }

    /// Token transition: new generation, header updated, previous user dropped.
    fn apply(&self, state: &mut SessionState, change: TokenChange) -> u64 {
        state.generation += 1;
        match change {
            TokenChange::Adopt(token) => {
                self.backend.set_auth_token(Some(&token));
                state.token = Some(token);
                debug!(generation = state.generation, "adopted access token");
            }
            TokenChange::Clear => {
                self.backend.set_auth_token(None);
                state.token = None;
                debug!(generation = state.generation, "cleared access token");
            }
        }
        state.user = None;
        self.publish(state);
        state.generation
    }

    fn adopt(&self, token: String) -> u64 {
        let mut state = self.lock();
        self.apply(&mut state, TokenChange::Adopt(token))
    }

    fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn clear_storage(&self) {
        if let Err(err) = self.storage.clear() {
            warn!(error = %err, "failed to clear persisted tokens");
        }
    }

    /// Clear token, user and persisted tokens.
    fn reset(&self) {
        {
            let mut state = self.lock();
            self.apply(&mut state, TokenChange::Clear);
        }
        self.clear_storage();
    }

    /// Clear token and user if no newer token change happened since `expected`.
    fn reset_if_current(&self, expected: u64) -> bool {
        {
            let mut state = self.lock();
            if state.generation != expected {
                return false;
            }
            self.apply(&mut state, TokenChange::Clear);
        }
        self.clear_storage();
        true
    }

    /// Adopt `user` if its fetch belongs to the current generation.
    fn settle(&self, generation: u64, user: User) -> Option<SessionSnapshot> {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "discarding stale identity result"
            );
            return None;
        }
        state.user = Some(user);
        self.publish(&state);
        Some(state.snapshot())
    }

    /// Fetch the identity for `generation` and fold the result into the session.
    async fn derive(&self, generation: u64) -> ClientResult<SessionSnapshot> {
        match self.backend.current_user().await {
            Ok(user) => self.settle(generation, user).ok_or(ClientError::Superseded),
            Err(err) => {
                if self.reset_if_current(generation) {
                    warn!(error = %err, "identity fetch failed; session cleared");
                    Err(ClientError::AuthExpired)
                } else {
                    debug!(error = %err, "ignoring identity failure for a replaced token");
                    Err(ClientError::Superseded)
                }
            }
        }
    }

    /// Restore the persisted session. Runs once; later calls return the
    /// current snapshot.
    ///
    /// # Errors
    /// Returns [`ClientError::AuthExpired`] when the persisted token is
    /// rejected (the session and storage are cleared), or
    /// [`ClientError::Superseded`] when another operation changed the token first.
    pub async fn initialize(&self) -> ClientResult<SessionSnapshot> {
        {
            let mut state = self.lock();
            if state.restored {
                return Ok(state.snapshot());
            }
            state.restored = true;
        }

        let outcome = {
            let _loading = LoadingGuard::engage(self);
            self.restore().await
        };
        outcome.map(|()| self.snapshot())
    }

    async fn restore(&self) -> ClientResult<()> {
        let stored = match self.storage.load() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "discarding unreadable token store");
                self.clear_storage();
                None
            }
        };
        let Some(tokens) = stored else {
            debug!("no persisted session");
            return Ok(());
        };

        let generation = self.adopt(tokens.access);
        let snapshot = self.derive(generation).await?;
        if let Some(user) = &snapshot.user {
            info!(username = %user.username, "restored session");
        }
        Ok(())
    }

    /// Exchange credentials for tokens, persist them and load the user.
    ///
    /// On failure the token, user and persisted tokens are cleared before the
    /// error is returned. `loading` is false again when this returns.
    ///
    /// # Errors
    /// Returns the failure from the token or identity request, a storage
    /// error, or [`ClientError::Superseded`] if the token changed again while
    /// the identity was being fetched.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let _loading = LoadingGuard::engage(self);
        let credentials = TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let tokens = match self.backend.obtain_token(&credentials).await {
            Ok(tokens) => tokens,
            Err(err) => {
                self.reset();
                warn!(%username, error = %err, "login rejected");
                return Err(err);
            }
        };

        let stored = StoredTokens {
            access: tokens.access.clone(),
            refresh: Some(tokens.refresh),
        };
        if let Err(err) = self.storage.save(&stored) {
            self.reset();
            return Err(err);
        }

        let generation = self.adopt(tokens.access);
        match self.backend.current_user().await {
            Ok(user) => match self.settle(generation, user.clone()) {
                Some(_) => {
                    info!(username = %user.username, "logged in");
                    Ok(user)
                }
                None => Err(ClientError::Superseded),
            },
            Err(err) => {
                if self.reset_if_current(generation) {
                    warn!(%username, error = %err, "identity fetch after login failed");
                    Err(err)
                } else {
                    Err(ClientError::Superseded)
                }
            }
        }
    }

    /// Drop the token, the user and the persisted tokens. No network call.
    ///
    /// # Errors
    /// Returns a storage error if the persisted tokens could not be removed;
    /// the in-memory session is cleared regardless.
    pub fn logout(&self) -> ClientResult<SessionSnapshot> {
        let snapshot = {
            let mut state = self.lock();
            self.apply(&mut state, TokenChange::Clear);
            state.awaiting_restore = false;
            self.publish(&state);
            state.snapshot()
        };
        self.storage.clear()?;
        info!("logged out");
        Ok(snapshot)
    }

    /// Re-fetch the identity for the current token.
    ///
    /// # Errors
    /// Returns [`ClientError::AuthExpired`] if the token is no longer accepted.
    pub async fn refresh_identity(&self) -> ClientResult<SessionSnapshot> {
        let outcome = {
            let _loading = LoadingGuard::engage(self);
            let generation = {
                let state = self.lock();
                state.token.as_ref().map(|_| state.generation)
            };
            match generation {
                Some(generation) => self.derive(generation).await.map(|_| ()),
                None => Ok(()),
            }
        };
        outcome.map(|()| self.snapshot())
    }

    /// Trade the persisted refresh token for a new access token and re-derive the user.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingRefreshToken`] when nothing is stored, the
    /// refresh failure (after clearing the session) when the server rejects
    /// it, or [`ClientError::AuthExpired`] if the new token is not accepted.
    pub async fn refresh_access_token(&self) -> ClientResult<SessionSnapshot> {
        let outcome = {
            let _loading = LoadingGuard::engage(self);
            self.exchange_refresh_token().await
        };
        outcome.map(|()| self.snapshot())
    }

    async fn exchange_refresh_token(&self) -> ClientResult<()> {
        let refresh = self
            .storage
            .load()?
            .and_then(|tokens| tokens.refresh)
            .ok_or(ClientError::MissingRefreshToken)?;

        let baseline = self.generation();
        let refreshed = match self
            .backend
            .refresh_token(&RefreshRequest {
                refresh: refresh.clone(),
            })
            .await
        {
            Ok(refreshed) => refreshed,
            Err(err) => {
                if err.is_auth_failure() {
                    self.reset_if_current(baseline);
                }
                return Err(err);
            }
        };

        self.storage.save(&StoredTokens {
            access: refreshed.access.clone(),
            refresh: Some(refreshed.refresh.unwrap_or(refresh)),
        })?;
        let generation = self.adopt(refreshed.access);
        self.derive(generation).await.map(|_| ())
    }
}
