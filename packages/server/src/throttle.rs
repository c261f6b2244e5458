use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::session::SessionStore;

/// Session key holding the failed-attempt counter.
const ATTEMPTS_KEY: &str = "login_attempts";
/// Session key holding the lockout expiry as unix milliseconds.
const LOCKOUT_KEY: &str = "lockout_until";

/// Outcome of a pre-login access check.
#[derive(Debug, PartialEq, Eq)]
pub enum ThrottleGate {
    Allowed,
    /// Locked out. Contains whole seconds until retry is allowed (ceiling,
    /// minimum 1).
    Denied { retry_after: u64 },
}

impl ThrottleGate {
    /// User-facing message while a lockout is active. Distinct from the
    /// wording of the failure that triggered the lockout.
    pub fn message(&self) -> Option<String> {
        match self {
            ThrottleGate::Allowed => None,
            ThrottleGate::Denied { retry_after } => Some(format!(
                "Demasiados intentos fallidos. Intenta nuevamente en {retry_after} segundos."
            )),
        }
    }
}

/// Outcome of recording a failed login.
#[derive(Debug, PartialEq, Eq)]
pub enum ThrottleVerdict {
    /// This failure crossed the threshold; the client is now locked out.
    LockedOutNow { retry_after: u64 },
    /// Still below the threshold.
    AttemptsRemaining(u32),
}

impl ThrottleVerdict {
    /// User-facing rejection message for a failed login.
    pub fn message(&self) -> String {
        match self {
            ThrottleVerdict::LockedOutNow { retry_after } => format!(
                "Demasiados intentos fallidos. Tu acceso ha sido bloqueado por {retry_after} segundos."
            ),
            ThrottleVerdict::AttemptsRemaining(1) => {
                "Credenciales incorrectas. Te queda 1 intento restante.".into()
            }
            ThrottleVerdict::AttemptsRemaining(n) => {
                format!("Credenciales incorrectas. Te quedan {n} intentos restantes.")
            }
        }
    }
}

/// Failed-login throttle with a temporary lockout.
///
/// State lives in the session store, keyed by client network identity: two
/// clients never share a bucket, and one client shares a single bucket
/// across login forms. `Clear -> Accumulating(n) -> LockedOut(until)` and
/// back to `Clear` on success or expiry.
pub struct AuthThrottle {
    sessions: Arc<dyn SessionStore>,
    max_attempts: u32,
    lockout_secs: u64,
}

impl AuthThrottle {
    pub fn new(sessions: Arc<dyn SessionStore>, max_attempts: u32, lockout_secs: u64) -> Self {
        Self {
            sessions,
            max_attempts,
            lockout_secs,
        }
    }

    /// Check whether the client may attempt a login right now.
    pub fn check_access(&self, identity: &str) -> ThrottleGate {
        self.check_access_at(identity, Utc::now())
    }

    /// Record a failed login attempt and report the resulting state.
    pub fn record_failure(&self, identity: &str) -> ThrottleVerdict {
        self.record_failure_at(identity, Utc::now())
    }

    /// Clear all throttle state for the client. Called on successful login.
    pub fn record_success(&self, identity: &str) {
        self.sessions.forget(identity, &[ATTEMPTS_KEY, LOCKOUT_KEY]);
    }

    /// Deterministic variant of [`check_access`](Self::check_access).
    ///
    /// An expired lockout is cleared here, before the new attempt is
    /// evaluated, so a post-expiry failure starts counting from 1.
    pub fn check_access_at(&self, identity: &str, now: DateTime<Utc>) -> ThrottleGate {
        let Some(until_ms) = self.lockout_until(identity) else {
            return ThrottleGate::Allowed;
        };

        let remaining_ms = until_ms - now.timestamp_millis();
        if remaining_ms <= 0 {
            // Self-healing: the lockout has lapsed.
            self.sessions.forget(identity, &[ATTEMPTS_KEY, LOCKOUT_KEY]);
            return ThrottleGate::Allowed;
        }

        ThrottleGate::Denied {
            retry_after: remaining_secs(remaining_ms),
        }
    }

    /// Deterministic variant of [`record_failure`](Self::record_failure).
    pub fn record_failure_at(&self, identity: &str, now: DateTime<Utc>) -> ThrottleVerdict {
        let attempts = self.sessions.increment(identity, ATTEMPTS_KEY);

        if attempts >= self.max_attempts {
            let until_ms = now.timestamp_millis() + (self.lockout_secs as i64) * 1000;
            self.sessions
                .put(identity, LOCKOUT_KEY, until_ms.to_string());
            return ThrottleVerdict::LockedOutNow {
                retry_after: self.lockout_secs,
            };
        }

        ThrottleVerdict::AttemptsRemaining(self.max_attempts - attempts)
    }

    fn lockout_until(&self, identity: &str) -> Option<i64> {
        self.sessions
            .get(identity, LOCKOUT_KEY)
            .and_then(|v| v.parse().ok())
    }
}

/// Whole seconds remaining, rounded up, never less than 1.
fn remaining_secs(remaining_ms: i64) -> u64 {
    (remaining_ms as u64).div_ceil(1000).max(1)
}
