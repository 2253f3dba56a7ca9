use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// How long a consent redirect stays valid.
pub const STATE_TTL_MINUTES: i64 = 10;

/// Outstanding `state` tokens handed out with consent redirects.
///
/// The callback only accepts a state we issued ourselves, once, and within
/// the TTL. Anything else is a forged or replayed callback.
pub struct PendingAuthorizations {
    states: DashMap<String, DateTime<Utc>>,
    ttl: Duration,
}

impl PendingAuthorizations {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(STATE_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: DashMap::new(),
            ttl,
        }
    }

    /// Issues a fresh random state token.
    pub fn issue(&self) -> String {
        let now = Utc::now();
        self.states.retain(|_, expires_at| *expires_at > now);

        let bytes: [u8; 32] = rand::random();
        let state = URL_SAFE_NO_PAD.encode(bytes);
        self.states.insert(state.clone(), now + self.ttl);
        state
    }

    /// Consumes `state`, returning whether it was issued by us and is still valid.
    pub fn consume(&self, state: &str) -> bool {
        match self.states.remove(state) {
            Some((_, expires_at)) => expires_at > Utc::now(),
            None => false,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.states.len()
    }
}

impl Default for PendingAuthorizations {
    fn default() -> Self {
        Self::new()
    }
}
