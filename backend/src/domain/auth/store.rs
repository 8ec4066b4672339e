//! Authentication state container.
//!
//! `AuthStore` is constructed explicitly and handed to whoever needs it; there
//! is no process-wide instance. Its lifecycle is `create` → `restore` →
//! mutations → `dispose`. Every mutation writes the persisted part of the
//! state (`AuthSession`) to the injected storage; `is_loading` only ever lives
//! in memory.

use chrono::{DateTime, Duration, Utc};
use shared::{AuthSession, User};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use super::token::{TokenError, TokenService};
use crate::storage::SessionStorage;

/// Remaining validity below which a token is replaced
pub const DEFAULT_RENEWAL_THRESHOLD_MINUTES: i64 = 60;

/// What to do when the current token cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailurePolicy {
    /// Treat the session as invalid and log out
    Logout,
    /// Log the failure and keep the session as it is
    Ignore,
}

impl FromStr for DecodeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logout" => Ok(DecodeFailurePolicy::Logout),
            "ignore" => Ok(DecodeFailurePolicy::Ignore),
            other => Err(format!("unknown decode failure policy '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Auth store has been disposed")]
    Disposed,
    #[error("Failed to persist session: {0}")]
    Storage(#[source] anyhow::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Result of one token check
#[derive(Debug, Clone, PartialEq)]
pub enum TokenCheckOutcome {
    /// Nobody is logged in
    NoToken,
    /// Token is valid and far from expiring
    Valid { expires_at: DateTime<Utc> },
    /// Token was close to expiring and has been replaced
    Renewed { expires_at: DateTime<Utc> },
    /// Token had expired; the session was logged out
    Expired,
    /// Token could not be decoded; `logged_out` tells what the policy did
    DecodeFailed { logged_out: bool },
    /// The session changed while a replacement was being issued; the
    /// replacement was dropped and the current session kept
    Superseded,
}

impl fmt::Display for TokenCheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenCheckOutcome::NoToken => write!(f, "no token"),
            TokenCheckOutcome::Valid { expires_at } => write!(f, "valid until {}", expires_at),
            TokenCheckOutcome::Renewed { expires_at } => write!(f, "renewed until {}", expires_at),
            TokenCheckOutcome::Expired => write!(f, "expired, logged out"),
            TokenCheckOutcome::DecodeFailed { logged_out: true } => write!(f, "undecodable, logged out"),
            TokenCheckOutcome::DecodeFailed { logged_out: false } => write!(f, "undecodable, ignored"),
            TokenCheckOutcome::Superseded => write!(f, "superseded by a newer session"),
        }
    }
}

#[derive(Debug, Default)]
struct AuthState {
    session: AuthSession,
    is_loading: bool,
    disposed: bool,
}

pub struct AuthStore {
    state: Mutex<AuthState>,
    storage: Arc<dyn SessionStorage>,
    token_service: TokenService,
    decode_failure_policy: DecodeFailurePolicy,
    renewal_threshold: Duration,
}

/// User synthesized by the demo login
pub fn demo_user() -> User {
    User {
        id: "demo-user".to_string(),
        name: "Auditor Demo".to_string(),
        email: "demo@auditoria.local".to_string(),
        role: "auditor".to_string(),
    }
}

impl AuthStore {
    /// Create a logged-out store. Call [`AuthStore::restore`] to load the persisted session.
    pub fn create(
        storage: Arc<dyn SessionStorage>,
        token_service: TokenService,
        decode_failure_policy: DecodeFailurePolicy,
    ) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            storage,
            token_service,
            decode_failure_policy,
            renewal_threshold: Duration::minutes(DEFAULT_RENEWAL_THRESHOLD_MINUTES),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load the persisted session. A missing or unreadable entry leaves the store logged out.
    pub fn restore(&self) -> Result<AuthSession, AuthError> {
        let loaded = match self.storage.load_session() {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("No persisted session, starting logged out");
                AuthSession::default()
            }
            Err(e) => {
                warn!("Discarding unreadable persisted session: {:#}", e);
                AuthSession::default()
            }
        };

        // Authenticated and token go together: one without the other is logged out
        let session = if loaded.is_authenticated && loaded.access_token.is_none() {
            warn!("Persisted session is authenticated but has no token, logging out");
            AuthSession::default()
        } else if !loaded.is_authenticated && loaded != AuthSession::default() {
            warn!("Persisted session is logged out but still holds user data, clearing it");
            AuthSession::default()
        } else {
            loaded
        };

        let mut state = self.lock();
        if state.disposed {
            return Err(AuthError::Disposed);
        }
        state.session = session.clone();
        state.is_loading = false;
        info!("Restored session (authenticated: {})", session.is_authenticated);
        Ok(session)
    }

    /// Snapshot of the persisted part of the state
    pub fn session(&self) -> AuthSession {
        self.lock().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    pub fn decode_failure_policy(&self) -> DecodeFailurePolicy {
        self.decode_failure_policy
    }

    /// Log in as the demo user with a fresh 24 hour token
    pub fn login_demo(&self) -> Result<AuthSession, AuthError> {
        {
            let mut state = self.lock();
            if state.disposed {
                return Err(AuthError::Disposed);
            }
            state.is_loading = true;
        }

        let user = demo_user();
        let token = match self.token_service.issue(&user, Utc::now()) {
            Ok(token) => token,
            Err(e) => {
                error!("Demo login failed: {}", e);
                self.lock().is_loading = false;
                return Err(e.into());
            }
        };

        let session = AuthSession {
            is_authenticated: true,
            user: Some(user),
            access_token: Some(token),
        };

        {
            let mut state = self.lock();
            state.session = session.clone();
            state.is_loading = false;
        }

        info!("Demo login completed");
        self.persist(&session)?;
        Ok(session)
    }

    /// Clear user and token
    pub fn logout(&self) -> Result<(), AuthError> {
        {
            let mut state = self.lock();
            if state.disposed {
                return Err(AuthError::Disposed);
            }
            state.session = AuthSession::default();
            state.is_loading = false;
        }

        info!("Logged out");
        self.persist(&AuthSession::default())
    }

    /// Decode the current token's expiration and act on it.
    ///
    /// Expired tokens log the session out; tokens within the renewal threshold
    /// are replaced without touching the authentication state; undecodable
    /// tokens are handled per the configured [`DecodeFailurePolicy`].
    pub fn check_token(&self, now: DateTime<Utc>) -> Result<TokenCheckOutcome, AuthError> {
        let (token, user) = {
            let state = self.lock();
            if state.disposed {
                return Err(AuthError::Disposed);
            }
            match &state.session.access_token {
                Some(token) => (token.clone(), state.session.user.clone()),
                None => return Ok(TokenCheckOutcome::NoToken),
            }
        };

        let expires_at = match self.token_service.expiration(&token) {
            Ok(expires_at) => expires_at,
            Err(e) => {
                return match self.decode_failure_policy {
                    DecodeFailurePolicy::Logout => {
                        warn!("Token could not be decoded ({}), logging out", e);
                        self.logout()?;
                        Ok(TokenCheckOutcome::DecodeFailed { logged_out: true })
                    }
                    DecodeFailurePolicy::Ignore => {
                        warn!("Token could not be decoded ({}), keeping session", e);
                        Ok(TokenCheckOutcome::DecodeFailed { logged_out: false })
                    }
                };
            }
        };

        if expires_at <= now {
            info!("Token expired at {}, logging out", expires_at);
            self.logout()?;
            return Ok(TokenCheckOutcome::Expired);
        }

        if expires_at - now > self.renewal_threshold {
            return Ok(TokenCheckOutcome::Valid { expires_at });
        }

        let user = user.unwrap_or_else(demo_user);
        let renewed = self.token_service.issue(&user, now)?;
        self.apply_renewal(&token, renewed, now + self.token_service.validity())
    }

    /// Swap `previous` for `renewed`, unless the session moved on meanwhile
    fn apply_renewal(
        &self,
        previous: &str,
        renewed: String,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenCheckOutcome, AuthError> {
        let session = {
            let mut state = self.lock();
            if state.disposed {
                return Err(AuthError::Disposed);
            }
            if state.session.access_token.as_deref() != Some(previous) {
                info!("Session changed during renewal, discarding renewed token");
                return Ok(TokenCheckOutcome::Superseded);
            }
            state.session.access_token = Some(renewed);
            state.session.clone()
        };

        info!("Token renewed, now valid until {}", expires_at);
        self.persist(&session)?;
        Ok(TokenCheckOutcome::Renewed { expires_at })
    }

    /// Flush the current session to storage and refuse further mutations
    pub fn dispose(&self) -> Result<(), AuthError> {
        let session = {
            let mut state = self.lock();
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            state.is_loading = false;
            state.session.clone()
        };

        info!("Disposing auth store");
        self.persist(&session)
    }

    fn persist(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.storage.save_session(session).map_err(|e| {
            error!("Failed to persist session: {:#}", e);
            AuthError::Storage(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::TestEnvironment;

    const SECRET: &str = "test-secret";

    fn create_store(env: &TestEnvironment, policy: DecodeFailurePolicy) -> AuthStore {
        AuthStore::create(env.session_repository(), TokenService::new(SECRET), policy)
    }

    fn set_token(store: &AuthStore, token: &str) {
        store.lock().session.access_token = Some(token.to_string());
    }

    #[test]
    fn test_new_store_is_logged_out() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert!(!store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(store.session(), AuthSession::default());
    }

    #[test]
    fn test_login_demo_and_logout() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);

        let session = store.login_demo().unwrap();
        assert!(session.is_authenticated);
        assert_eq!(session.user, Some(demo_user()));
        assert!(!store.is_loading());

        let token = session.access_token.unwrap();
        let expires_at = TokenService::new(SECRET).expiration(&token).unwrap();
        let remaining = expires_at - Utc::now();
        assert!(remaining > Duration::hours(23) && remaining <= Duration::hours(24));

        store.logout().unwrap();
        assert_eq!(store.session(), AuthSession::default());
    }

    #[test]
    fn test_restore_after_login() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        let session = store.login_demo().unwrap();
        store.dispose().unwrap();

        let restored_store = create_store(&env, DecodeFailurePolicy::Logout);
        assert!(!restored_store.is_authenticated());
        assert_eq!(restored_store.restore().unwrap(), session);
        assert!(restored_store.is_authenticated());
    }

    #[test]
    fn test_restore_without_entry_or_with_corrupt_entry() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert_eq!(store.restore().unwrap(), AuthSession::default());

        env.connection.write_entry("auth-storage", "{broken").unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert_eq!(store.restore().unwrap(), AuthSession::default());
    }

    #[test]
    fn test_restore_drops_authenticated_session_without_token() {
        let env = TestEnvironment::new().unwrap();
        let repository = env.session_repository();
        repository
            .save_session(&AuthSession {
                is_authenticated: true,
                user: Some(demo_user()),
                access_token: None,
            })
            .unwrap();

        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert!(!store.restore().unwrap().is_authenticated);
    }

    #[test]
    fn test_restore_drops_token_of_logged_out_session() {
        let env = TestEnvironment::new().unwrap();
        let leftover = TokenService::new(SECRET).issue(&demo_user(), Utc::now()).unwrap();
        env.session_repository()
            .save_session(&AuthSession {
                is_authenticated: false,
                user: Some(demo_user()),
                access_token: Some(leftover),
            })
            .unwrap();

        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert_eq!(store.restore().unwrap(), AuthSession::default());

        // nothing left for the renewal check to pick up
        let later = Utc::now() + Duration::minutes(23 * 60 + 30);
        assert_eq!(store.check_token(later).unwrap(), TokenCheckOutcome::NoToken);
        assert_eq!(store.session(), AuthSession::default());
    }

    #[test]
    fn test_persisted_state_excludes_loading_flag() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        store.login_demo().unwrap();

        let raw = std::fs::read_to_string(env.base_path.join("auth-storage.json")).unwrap();
        assert!(raw.contains("isAuthenticated"));
        assert!(!raw.contains("isLoading"));
    }

    #[test]
    fn test_dispose_blocks_mutations() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        store.dispose().unwrap();
        store.dispose().unwrap();

        assert!(store.is_disposed());
        assert!(matches!(store.login_demo(), Err(AuthError::Disposed)));
        assert!(matches!(store.logout(), Err(AuthError::Disposed)));
        assert!(matches!(store.check_token(Utc::now()), Err(AuthError::Disposed)));
        assert!(matches!(store.restore(), Err(AuthError::Disposed)));
    }

    #[test]
    fn test_check_token_without_session() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        assert_eq!(store.check_token(Utc::now()).unwrap(), TokenCheckOutcome::NoToken);
    }

    #[test]
    fn test_check_token_valid() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        let session = store.login_demo().unwrap();

        let outcome = store.check_token(Utc::now()).unwrap();
        assert!(matches!(outcome, TokenCheckOutcome::Valid { .. }));
        assert_eq!(store.session(), session);
    }

    #[test]
    fn test_check_token_renews_near_expiry() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        let session = store.login_demo().unwrap();
        let old_token = session.access_token.clone().unwrap();

        // 23h30 later the token has 30 minutes left
        let later = Utc::now() + Duration::minutes(23 * 60 + 30);
        let outcome = store.check_token(later).unwrap();
        assert_eq!(
            outcome,
            TokenCheckOutcome::Renewed {
                expires_at: later + Duration::hours(24)
            }
        );

        let renewed = store.session();
        assert!(renewed.is_authenticated);
        assert_eq!(renewed.user, session.user);
        assert_ne!(renewed.access_token.as_deref(), Some(old_token.as_str()));

        // the renewed token is what got persisted
        let persisted = env.session_repository().load_session().unwrap().unwrap();
        assert_eq!(persisted, renewed);
    }

    #[test]
    fn test_renewal_is_dropped_when_session_changed() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        let first = store.login_demo().unwrap().access_token.unwrap();
        set_token(&store, "token-from-a-new-login");

        let outcome = store
            .apply_renewal(&first, "renewed".to_string(), Utc::now() + Duration::hours(24))
            .unwrap();
        assert_eq!(outcome, TokenCheckOutcome::Superseded);
        assert!(store.is_authenticated());
        assert_eq!(store.session().access_token.as_deref(), Some("token-from-a-new-login"));
    }

    #[test]
    fn test_renewal_is_dropped_after_logout() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        let first = store.login_demo().unwrap().access_token.unwrap();
        store.logout().unwrap();

        let outcome = store
            .apply_renewal(&first, "renewed".to_string(), Utc::now() + Duration::hours(24))
            .unwrap();
        assert_eq!(outcome, TokenCheckOutcome::Superseded);
        assert_eq!(store.session(), AuthSession::default());
        assert_eq!(env.session_repository().load_session().unwrap(), Some(AuthSession::default()));
    }

    #[test]
    fn test_check_token_logs_out_when_expired() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        store.login_demo().unwrap();

        let outcome = store.check_token(Utc::now() + Duration::hours(25)).unwrap();
        assert_eq!(outcome, TokenCheckOutcome::Expired);
        assert!(!store.is_authenticated());
        assert_eq!(env.session_repository().load_session().unwrap(), Some(AuthSession::default()));
    }

    #[test]
    fn test_decode_failure_with_logout_policy() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        store.login_demo().unwrap();
        set_token(&store, "garbage");

        let outcome = store.check_token(Utc::now()).unwrap();
        assert_eq!(outcome, TokenCheckOutcome::DecodeFailed { logged_out: true });
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_decode_failure_with_ignore_policy() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Ignore);
        store.login_demo().unwrap();
        set_token(&store, "garbage");

        let outcome = store.check_token(Utc::now()).unwrap();
        assert_eq!(outcome, TokenCheckOutcome::DecodeFailed { logged_out: false });
        assert!(store.is_authenticated());
        assert_eq!(store.session().access_token.as_deref(), Some("garbage"));
    }

    #[test]
    fn test_token_signed_with_another_secret_is_a_decode_failure() {
        let env = TestEnvironment::new().unwrap();
        let store = create_store(&env, DecodeFailurePolicy::Logout);
        store.login_demo().unwrap();
        let foreign = TokenService::new("another-secret")
            .issue(&demo_user(), Utc::now())
            .unwrap();
        set_token(&store, &foreign);

        assert_eq!(
            store.check_token(Utc::now()).unwrap(),
            TokenCheckOutcome::DecodeFailed { logged_out: true }
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("logout".parse::<DecodeFailurePolicy>(), Ok(DecodeFailurePolicy::Logout));
        assert_eq!(" IGNORE ".parse::<DecodeFailurePolicy>(), Ok(DecodeFailurePolicy::Ignore));
        assert!("maybe".parse::<DecodeFailurePolicy>().is_err());
    }
}
