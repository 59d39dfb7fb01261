use chrono::{Duration, NaiveDateTime, Utc};
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// Server-side half of a login: the cookie only carries the token.
pub trait TokenSession: Send + Sync {
    fn add_user(&mut self, user: &str) -> Uuid;
    fn get_user(&self, id: &Uuid) -> Option<String>;
    fn remove_token(&mut self, id: &Uuid) -> Option<String>;
    /// Drops every token issued to `user`, returns how many were removed.
    fn remove_user(&mut self, user: &str) -> usize;
}

#[derive(Clone)]
struct ActiveUser {
    login: String,
    expires: Option<NaiveDateTime>,
}

#[derive(Clone, Default)]
pub struct DefaultTokenSession {
    active_users: HashMap<Uuid, ActiveUser>,
    ttl: Option<Duration>,
}

impl DefaultTokenSession {
    /// `ttl_secs` of `None` keeps tokens until logout.
    pub fn new(ttl_secs: Option<i64>) -> Self {
        Self {
            active_users: HashMap::new(),
            ttl: ttl_secs.map(Duration::seconds),
        }
    }

    fn purge_expired(&mut self) {
        let now = Utc::now().naive_utc();
        let before = self.active_users.len();
        self.active_users
            .retain(|_, u| u.expires.map_or(true, |e| e > now));
        let purged = before - self.active_users.len();
        if purged > 0 {
            debug!("purged {} expired session tokens", purged);
        }
    }
}

impl TokenSession for DefaultTokenSession {
    fn add_user(&mut self, user: &str) -> Uuid {
        self.purge_expired();
        let mut uuid = Uuid::new_v4();

        while self.active_users.contains_key(&uuid) {
            uuid = Uuid::new_v4();
        }

        let expires = self.ttl.map(|ttl| Utc::now().naive_utc() + ttl);
        self.active_users.insert(
            uuid,
            ActiveUser {
                login: user.to_owned(),
                expires,
            },
        );

        uuid
    }
    fn get_user(&self, id: &Uuid) -> Option<String> {
        let now = Utc::now().naive_utc();
        self.active_users
            .get(id)
            .filter(|u| u.expires.map_or(true, |e| e > now))
            .map(|u| u.login.clone())
    }
    fn remove_token(&mut self, id: &Uuid) -> Option<String> {
        self.active_users.remove(id).map(|u| u.login)
    }
    fn remove_user(&mut self, user: &str) -> usize {
        let before = self.active_users.len();
        self.active_users.retain(|_, u| u.login != user);
        before - self.active_users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_until_removed() {
        let mut sessions = DefaultTokenSession::new(None);
        let token = sessions.add_user("alice");
        assert_eq!(sessions.get_user(&token).as_deref(), Some("alice"));
        assert_eq!(sessions.remove_token(&token).as_deref(), Some("alice"));
        assert_eq!(sessions.get_user(&token), None);
    }

    #[test]
    fn expired_tokens_do_not_resolve() {
        let mut sessions = DefaultTokenSession::new(Some(-1));
        let token = sessions.add_user("alice");
        assert_eq!(sessions.get_user(&token), None);
    }

    #[test]
    fn remove_user_drops_all_tokens() {
        let mut sessions = DefaultTokenSession::new(Some(600));
        let first = sessions.add_user("alice");
        let second = sessions.add_user("alice");
        let bob = sessions.add_user("bob");
        assert_eq!(sessions.remove_user("alice"), 2);
        assert_eq!(sessions.get_user(&first), None);
        assert_eq!(sessions.get_user(&second), None);
        assert_eq!(sessions.get_user(&bob).as_deref(), Some("bob"));
    }
}
