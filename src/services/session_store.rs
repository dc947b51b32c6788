use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Mutex as SessionLock;
use tracing::debug;

use crate::models::{ConversationSession, Input, Reply};
use crate::services::conversation;

type SessionSlot = Arc<SessionLock<ConversationSession>>;

/// Conversations keyed by user identity.
///
/// The map lock is held only to find or insert a slot. Each slot has its own
/// async lock, so inputs for one user run strictly one after another while
/// different users proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, user: &str) -> SessionSlot {
        let mut map = self.map();
        map.entry(user.to_string())
            .or_insert_with(|| {
                debug!(user, "new conversation session");
                Arc::new(SessionLock::new(ConversationSession::new()))
            })
            .clone()
    }

    /// Runs one dialog step for `user`, creating the session on first contact.
    /// A finished conversation gives its slot back unless another input is
    /// already waiting on it.
    pub async fn handle(&self, user: &str, input: Input) -> Reply {
        let slot = self.slot(user);
        let mut session = slot.lock().await;
        let reply = conversation::handle_input(&mut session, input);
        if reply.outcome.is_some() {
            self.release(user, &slot);
        }
        reply
    }

    fn release(&self, user: &str, slot: &SessionSlot) {
        let mut map = self.map();
        let idle = map
            .get(user)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if idle {
            map.remove(user);
            debug!(user, "conversation finished, session released");
        }
    }

    /// Forgets the user's conversation. Returns whether one existed.
    pub fn clear(&self, user: &str) -> bool {
        self.map().remove(user).is_some()
    }

    /// Copy of the current session, waiting for an in-flight step to finish.
    pub async fn snapshot(&self, user: &str) -> Option<ConversationSession> {
        let slot = self.map().get(user).cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DialogState;

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    #[actix_web::test]
    async fn sessions_are_created_on_first_input() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let reply = store.handle("42", text("/create")).await;
        assert_eq!(reply.state, DialogState::ChoosingScenario);
        assert_eq!(store.len(), 1);

        let snapshot = store.snapshot("42").await.unwrap();
        assert_eq!(snapshot.state, DialogState::ChoosingScenario);
        assert!(store.snapshot("7").await.is_none());
    }

    #[actix_web::test]
    async fn users_do_not_share_state() {
        let store = SessionStore::new();
        store.handle("a", text("/batch")).await;
        store.handle("b", text("/create")).await;

        assert_eq!(store.snapshot("a").await.unwrap().state, DialogState::ChoosingType);
        assert_eq!(store.snapshot("b").await.unwrap().state, DialogState::ChoosingScenario);
    }

    #[actix_web::test]
    async fn concurrent_inputs_for_one_user_are_serialized() {
        let store = SessionStore::new();
        store.handle("u", text("/batch")).await;
        store
            .handle("u", Input::Callback("type:image".to_string()))
            .await;

        let pick = |city: &str| Input::Callback(format!("geo:{}", city));
        tokio::join!(
            store.handle("u", pick("москва")),
            store.handle("u", pick("тула")),
            store.handle("u", pick("казань")),
        );

        let session = store.snapshot("u").await.unwrap();
        let mut cities = session.draft.cities.clone();
        cities.sort();
        assert_eq!(cities, ["казань", "москва", "тула"]);
    }

    #[actix_web::test]
    async fn finished_conversations_release_their_slot() {
        let store = SessionStore::new();
        let cb = |token: &str| Input::Callback(token.to_string());
        store.handle("f", text("/create")).await;
        store.handle("f", cb("scenario:single")).await;
        store.handle("f", cb("type:image")).await;
        store.handle("f", cb("geo:москва")).await;
        store.handle("f", cb("channel:other")).await;
        assert_eq!(store.len(), 1);

        let reply = store.handle("f", cb("confirm:yes")).await;
        assert!(reply.outcome.is_some());
        assert!(store.is_empty());

        let reply = store.handle("f", cb("result:new")).await;
        assert_eq!(reply.state, DialogState::ChoosingScenario);
        assert_eq!(store.len(), 1);

        store.handle("f", text("/cancel")).await;
        assert!(store.is_empty());
    }

    #[actix_web::test]
    async fn clear_drops_the_session() {
        let store = SessionStore::new();
        store.handle("x", text("/create")).await;
        assert!(store.clear("x"));
        assert!(!store.clear("x"));
        assert!(store.snapshot("x").await.is_none());
    }
}
