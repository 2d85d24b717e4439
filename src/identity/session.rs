use parking_lot::RwLock;

use crate::tprintln;

use super::profile::UserProfile;
use super::token_store::TokenStore;

/// Authentication phase of the client session.
///
/// `Pending` sits between token attachment and server verification: the token
/// is held (and persisted) but the account has not yet been confirmed by a
/// profile fetch. Consumers that gate on authentication must require
/// `Authenticated`, not merely the presence of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Pending,
    Authenticated,
}

/// Read-only copy of the session record, current as of the call.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: AuthState,
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool { self.state == AuthState::Authenticated }
}

#[derive(Debug)]
struct SessionRecord {
    state: AuthState,
    token: Option<String>,
    user: Option<UserProfile>,
    // Bumped on every transition that replaces the session. Verification
    // outcomes carry the epoch they were issued under and are discarded if
    // the record has moved on since.
    epoch: u64,
}

/// Single source of truth for "am I signed in, and as whom".
///
/// Owns the token, the auth state, and the cached profile; everything else
/// gets read-only snapshots. Constructed explicitly and passed by handle,
/// never looked up through a process global.
pub struct SessionManager {
    store: TokenStore,
    record: RwLock<SessionRecord>,
}

impl SessionManager {
    /// Empty session: `Anonymous`, no token, no profile.
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            record: RwLock::new(SessionRecord {
                state: AuthState::Anonymous,
                token: None,
                user: None,
                epoch: 0,
            }),
        }
    }

    /// Attach a freshly issued token: persist it, drop any previous profile,
    /// and enter `Pending` until verification confirms the account. Any
    /// non-empty string is accepted here; the server is the judge of
    /// validity. Returns the epoch the caller must present when applying the
    /// verification outcome.
    pub fn begin_session(&self, token: &str) -> u64 {
        self.store.save(token);
        let mut rec = self.record.write();
        rec.state = AuthState::Pending;
        rec.token = Some(token.to_string());
        rec.user = None;
        rec.epoch += 1;
        tprintln!("session.begin epoch={}", rec.epoch);
        rec.epoch
    }

    /// Rebuild from the persisted token, if any. Enters `Pending` with the
    /// stored token and returns the epoch for the follow-up verification;
    /// `None` when nothing was persisted.
    pub fn rehydrate(&self) -> Option<u64> {
        let token = self.store.load()?;
        let mut rec = self.record.write();
        rec.state = AuthState::Pending;
        rec.token = Some(token);
        rec.user = None;
        rec.epoch += 1;
        tprintln!("session.rehydrate epoch={}", rec.epoch);
        Some(rec.epoch)
    }

    /// Clear everything: persisted token, in-memory token, profile.
    /// Always succeeds, from any prior state.
    pub fn logout(&self) {
        self.store.clear();
        let mut rec = self.record.write();
        rec.state = AuthState::Anonymous;
        rec.token = None;
        rec.user = None;
        rec.epoch += 1;
        tprintln!("session.logout epoch={}", rec.epoch);
    }

    /// Verification succeeded: promote `Pending` to `Authenticated` and cache
    /// the profile. Returns false (and changes nothing) when the outcome is
    /// stale, i.e. the session was replaced after the fetch was issued.
    pub fn apply_profile(&self, epoch: u64, user: UserProfile) -> bool {
        let mut rec = self.record.write();
        if rec.epoch != epoch || rec.token.is_none() {
            tprintln!("session.apply dropped stale epoch={} current={}", epoch, rec.epoch);
            return false;
        }
        rec.state = AuthState::Authenticated;
        rec.user = Some(user);
        true
    }

    /// Verification was explicitly rejected by the server: the persisted
    /// token is dead, so clear the session. Stale epochs are ignored.
    pub fn reject(&self, epoch: u64) -> bool {
        {
            let rec = self.record.read();
            if rec.epoch != epoch {
                return false;
            }
        }
        self.logout();
        true
    }

    /// A protected call came back 401: the server no longer honors the
    /// token, whatever state we thought we were in. Drop the session.
    pub fn note_unauthorized(&self) {
        tprintln!("session.unauthorized");
        self.logout();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let rec = self.record.read();
        SessionSnapshot {
            state: rec.state,
            token: rec.token.clone(),
            user: rec.user.clone(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.record.read().token.clone()
    }

    /// Bearer header value for the current token, or nothing when absent.
    pub fn auth_header(&self) -> Option<String> {
        self.record.read().token.as_ref().map(|t| format!("Bearer {}", t))
    }

    pub fn current_epoch(&self) -> u64 {
        self.record.read().epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.record.read().state == AuthState::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager(dir: &std::path::Path) -> SessionManager {
        SessionManager::new(TokenStore::new(crate::system_paths::token_file(dir)))
    }

    #[test]
    fn starts_anonymous_and_empty() {
        let tmp = tempdir().unwrap();
        let sm = manager(tmp.path());
        let snap = sm.snapshot();
        assert_eq!(snap.state, AuthState::Anonymous);
        assert!(snap.token.is_none());
        assert!(snap.user.is_none());
        assert!(sm.auth_header().is_none());
    }

    #[test]
    fn begin_session_is_pending_until_profile_applies() {
        let tmp = tempdir().unwrap();
        let sm = manager(tmp.path());
        let epoch = sm.begin_session("abc123");
        assert_eq!(sm.snapshot().state, AuthState::Pending);
        assert_eq!(sm.auth_header().as_deref(), Some("Bearer abc123"));
        assert!(!sm.is_authenticated());

        let user = UserProfile { id: "u1".into(), email: "u@example.com".into(), role: "user".into() };
        assert!(sm.apply_profile(epoch, user.clone()));
        let snap = sm.snapshot();
        assert_eq!(snap.state, AuthState::Authenticated);
        assert_eq!(snap.user, Some(user));
    }

    #[test]
    fn stale_profile_outcome_is_discarded() {
        let tmp = tempdir().unwrap();
        let sm = manager(tmp.path());
        let old = sm.begin_session("first");
        sm.begin_session("second");
        assert!(!sm.apply_profile(old, UserProfile::default()));
        // Still pending on the second token, not authenticated as the first.
        let snap = sm.snapshot();
        assert_eq!(snap.state, AuthState::Pending);
        assert_eq!(snap.token.as_deref(), Some("second"));
        assert!(snap.user.is_none());
    }

    #[test]
    fn reject_clears_only_the_matching_epoch() {
        let tmp = tempdir().unwrap();
        let sm = manager(tmp.path());
        let old = sm.begin_session("first");
        let current = sm.begin_session("second");
        assert!(!sm.reject(old));
        assert_eq!(sm.snapshot().state, AuthState::Pending);
        assert!(sm.reject(current));
        assert_eq!(sm.snapshot().state, AuthState::Anonymous);
    }

    #[test]
    fn logout_clears_everything_from_any_state() {
        let tmp = tempdir().unwrap();
        let sm = manager(tmp.path());
        let epoch = sm.begin_session("abc123");
        sm.apply_profile(epoch, UserProfile::default());
        sm.logout();
        let snap = sm.snapshot();
        assert_eq!(snap.state, AuthState::Anonymous);
        assert!(snap.token.is_none());
        assert!(snap.user.is_none());
        // Persisted token is gone too: a fresh manager finds nothing.
        assert!(manager(tmp.path()).rehydrate().is_none());
    }

    #[test]
    fn rehydrate_enters_pending_with_the_persisted_token() {
        let tmp = tempdir().unwrap();
        manager(tmp.path()).begin_session("abc123");

        let sm = manager(tmp.path());
        let epoch = sm.rehydrate().expect("token was persisted");
        let snap = sm.snapshot();
        assert_eq!(snap.state, AuthState::Pending);
        assert_eq!(snap.token.as_deref(), Some("abc123"));
        assert!(snap.user.is_none());
        assert!(sm.apply_profile(epoch, UserProfile::default()));
        assert!(sm.is_authenticated());
    }
}
