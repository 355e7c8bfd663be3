use std::{collections::HashMap, sync::Mutex};
use uuid::Uuid;
use vcasino_types::casino::PlayerId;

/// Default bearer session lifetime (one day).
pub const DEFAULT_SESSION_TTL_MS: u64 = 86_400_000;

#[derive(Clone, Copy, Debug)]
struct Session {
    player: PlayerId,
    expires_at_ms: u64,
}

/// Bearer tokens issued at registration.
pub struct SessionStore {
    ttl_ms: u64,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a token for `player`, returning it with its expiry.
    pub fn issue(&self, player: PlayerId, now_ms: u64) -> (String, u64) {
        let token = Uuid::new_v4().to_string().replace('-', "");
        let expires_at_ms = now_ms.saturating_add(self.ttl_ms);
        let mut sessions = self.lock();
        sessions.retain(|_, session| session.expires_at_ms > now_ms);
        sessions.insert(
            token.clone(),
            Session {
                player,
                expires_at_ms,
            },
        );
        (token, expires_at_ms)
    }

    /// Player behind `token`, if it was issued here and has not expired.
    pub fn resolve(&self, token: &str, now_ms: u64) -> Option<PlayerId> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.expires_at_ms > now_ms => Some(session.player),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_resolve_until_expiry() {
        let store = SessionStore::new(1_000);
        let (token, expires) = store.issue(PlayerId(3), 5_000);
        assert_eq!(expires, 6_000);
        assert_eq!(token.len(), 32);
        assert_eq!(store.resolve(&token, 5_999), Some(PlayerId(3)));
        assert_eq!(store.resolve(&token, 6_000), None);
        assert!(store.is_empty());
        assert_eq!(store.resolve("unknown", 0), None);
    }

    #[test]
    fn test_issue_prunes_expired_sessions() {
        let store = SessionStore::new(100);
        let (first, _) = store.issue(PlayerId(1), 0);
        let (second, _) = store.issue(PlayerId(2), 50);
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        store.issue(PlayerId(3), 120);
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve(&second, 120), Some(PlayerId(2)));
    }
}
