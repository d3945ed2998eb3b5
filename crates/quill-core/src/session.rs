//! Session gate.
//!
//! Tracks whether a user is authenticated and mirrors the bearer credential
//! into the ephemeral token cell the store client reads. Provider failures
//! are reported as toasts, never raised to the caller.

use crate::api::TokenCell;
use crate::auth::{AuthError, AuthSession, AuthUser, IdentityProvider, SignUpOutcome};
use crate::notify::{Notifier, ToastKind};

/// Authentication state as seen by the rest of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state while the startup session check is in flight.
    Unknown,
    Authenticated(AuthUser),
    Unauthenticated,
}

impl SessionState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Gates access to note operations on provider-backed authentication.
pub struct SessionGate<P: IdentityProvider> {
    provider: P,
    notifier: Notifier,
    token: TokenCell,
    state: SessionState,
}

impl<P: IdentityProvider> SessionGate<P> {
    pub fn new(provider: P, notifier: Notifier, token: TokenCell) -> Self {
        Self {
            provider,
            notifier,
            token,
            state: SessionState::Unknown,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle to the token cell this gate mirrors credentials into.
    #[must_use]
    pub fn token(&self) -> TokenCell {
        self.token.clone()
    }

    /// The authenticated user, or [`AuthError::SignedOut`].
    ///
    /// Note operations go through this check before touching the store.
    pub fn require_authenticated(&self) -> Result<&AuthUser, AuthError> {
        match &self.state {
            SessionState::Authenticated(user) => Ok(user),
            SessionState::Unknown | SessionState::Unauthenticated => Err(AuthError::SignedOut),
        }
    }

    /// Startup session check: `Unknown` -> `Authenticated`/`Unauthenticated`.
    pub async fn restore(&mut self) -> &SessionState {
        match self.provider.restore_session().await {
            Ok(session) => self.apply_session(session),
            Err(error) => {
                tracing::warn!("Session check failed: {}", error);
                self.apply_session(None);
            }
        }
        &self.state
    }

    /// Provider-pushed session change: update state, mirror/clear the token.
    pub fn handle_session_change(&mut self, session: Option<AuthSession>) {
        self.apply_session(session);
    }

    /// Sign up. Returns whether the operation succeeded; failures surface
    /// only as an error toast.
    pub async fn sign_up(&mut self, email: &str, password: &str) -> bool {
        match self.provider.sign_up(email, password).await {
            Ok(outcome) => {
                if let SignUpOutcome::SignedIn(session) = outcome {
                    self.apply_session(Some(session));
                }
                self.notifier.push(
                    "Account created successfully! Please check your email for verification.",
                    ToastKind::Success,
                );
                true
            }
            Err(error) => {
                self.notifier.push(error.to_string(), ToastKind::Error);
                false
            }
        }
    }

    /// Sign in with email and password; same reporting contract as sign-up.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> bool {
        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                self.apply_session(Some(session));
                self.notifier.push("Welcome back!", ToastKind::Success);
                true
            }
            Err(error) => {
                self.notifier.push(error.to_string(), ToastKind::Error);
                false
            }
        }
    }

    /// Sign out. A failed provider call leaves local state untouched.
    pub async fn sign_out(&mut self) -> bool {
        let Some(access_token) = self.token.get() else {
            self.apply_session(None);
            self.notifier
                .push("Signed out successfully", ToastKind::Success);
            return true;
        };

        match self.provider.sign_out(&access_token).await {
            Ok(()) => {
                self.apply_session(None);
                self.notifier
                    .push("Signed out successfully", ToastKind::Success);
                true
            }
            Err(error) => {
                tracing::warn!("Sign-out failed: {}", error);
                self.notifier.push("Error signing out", ToastKind::Error);
                false
            }
        }
    }

    fn apply_session(&mut self, session: Option<AuthSession>) {
        match session {
            Some(session) => {
                self.token.set(session.access_token);
                self.state = SessionState::Authenticated(session.user);
            }
            None => {
                self.token.clear();
                self.state = SessionState::Unauthenticated;
            }
        }
    }
}
