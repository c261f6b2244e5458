use std::collections::HashMap;

use dashmap::DashMap;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated session identifiers.
const SESSION_ID_LENGTH: usize = 32;

/// Per-client key-value state with explicit lifecycle.
///
/// Scoped by an opaque session identifier; all methods are safe to call from
/// concurrent request handlers. `increment` is atomic with respect to other
/// writers of the same key, which is what the login throttle relies on.
pub trait SessionStore: Send + Sync {
    fn get(&self, session: &str, key: &str) -> Option<String>;

    fn put(&self, session: &str, key: &str, value: String);

    /// Atomically increment a numeric key and return the new value.
    ///
    /// A missing or non-numeric value counts as 0.
    fn increment(&self, session: &str, key: &str) -> u32;

    /// Remove the named keys; a session left with no state is dropped
    /// entirely.
    fn forget(&self, session: &str, keys: &[&str]);

    /// Move the session's state under a fresh random identifier and return
    /// it. The old identifier becomes invalid (session fixation defense).
    /// A session with no state is dropped rather than re-created.
    fn regenerate_id(&self, session: &str) -> String;

    /// Drop all state for the session. Idempotent.
    fn invalidate(&self, session: &str);
}

/// In-memory session store.
///
/// State does not survive a process restart; a restart therefore resets any
/// login lockouts. That is accepted behavior, not a bug.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn random_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Number of sessions currently holding state.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session: &str, key: &str) -> Option<String> {
        self.sessions.get(session)?.get(key).cloned()
    }

    fn put(&self, session: &str, key: &str, value: String) {
        self.sessions
            .entry(session.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn increment(&self, session: &str, key: &str) -> u32 {
        // The entry guard holds the shard lock for the whole read-modify-write,
        // so concurrent increments on the same session never lose an update.
        let mut entry = self.sessions.entry(session.to_string()).or_default();
        let current: u32 = entry
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let next = current.saturating_add(1);
        entry.insert(key.to_string(), next.to_string());
        next
    }

    fn forget(&self, session: &str, keys: &[&str]) {
        let emptied = match self.sessions.get_mut(session) {
            Some(mut entry) => {
                for key in keys {
                    entry.remove(*key);
                }
                entry.is_empty()
            }
            None => return,
        };
        // The guard is released above; emptied sessions are dropped so the
        // map does not accumulate dead entries.
        if emptied {
            self.sessions.remove_if(session, |_, data| data.is_empty());
        }
    }

    fn regenerate_id(&self, session: &str) -> String {
        let data = self
            .sessions
            .remove(session)
            .map(|(_, data)| data)
            .unwrap_or_default();
        let new_id = Self::random_id();
        if !data.is_empty() {
            self.sessions.insert(new_id.clone(), data);
        }
        new_id
    }

    fn invalidate(&self, session: &str) {
        self.sessions.remove(session);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn put_get_round_trip() {
        let store = InMemorySessionStore::new();
        store.put("s1", "k", "v".into());
        assert_eq!(store.get("s1", "k"), Some("v".into()));
        assert_eq!(store.get("s1", "other"), None);
        assert_eq!(store.get("s2", "k"), None);
    }

    #[test]
    fn increment_counts_from_zero() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.increment("s1", "attempts"), 1);
        assert_eq!(store.increment("s1", "attempts"), 2);
        assert_eq!(store.get("s1", "attempts"), Some("2".into()));
    }

    #[test]
    fn increment_is_isolated_per_session() {
        let store = InMemorySessionStore::new();
        store.increment("a", "attempts");
        assert_eq!(store.increment("b", "attempts"), 1);
    }

    #[test]
    fn forget_removes_only_named_keys() {
        let store = InMemorySessionStore::new();
        store.put("s1", "a", "1".into());
        store.put("s1", "b", "2".into());
        store.forget("s1", &["a"]);
        assert_eq!(store.get("s1", "a"), None);
        assert_eq!(store.get("s1", "b"), Some("2".into()));
    }

    #[test]
    fn forget_drops_a_session_left_empty() {
        let store = InMemorySessionStore::new();
        store.put("s1", "a", "1".into());
        store.forget("s1", &["a"]);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn regenerate_id_of_an_empty_session_leaves_nothing_behind() {
        let store = InMemorySessionStore::new();
        let new_id = store.regenerate_id("never-seen");
        assert_eq!(store.session_count(), 0);
        assert_eq!(store.get(&new_id, "k"), None);
    }

    #[test]
    fn repeated_login_cycles_do_not_accumulate_sessions() {
        // put -> forget -> regenerate is the per-login lifecycle; state must
        // stay bounded no matter how many clients go through it.
        let store = InMemorySessionStore::new();
        for i in 0..1000 {
            let session = format!("10.0.{}.{}", i / 256, i % 256);
            store.put(&session, "login_attempts", "1".into());
            store.forget(&session, &["login_attempts", "lockout_until"]);
            store.regenerate_id(&session);
        }
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn regenerate_id_moves_state() {
        let store = InMemorySessionStore::new();
        store.put("old", "k", "v".into());
        let new_id = store.regenerate_id("old");
        assert_ne!(new_id, "old");
        assert_eq!(store.get("old", "k"), None);
        assert_eq!(store.get(&new_id, "k"), Some("v".into()));
    }

    #[test]
    fn invalidate_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.put("s1", "k", "v".into());
        store.invalidate("s1");
        assert_eq!(store.get("s1", "k"), None);
        store.invalidate("s1");
    }

    #[test]
    fn concurrent_increments_do_not_lose_updates() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    store.increment("shared", "attempts");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get("shared", "attempts"), Some("800".into()));
    }
}
