use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{DialogueSession, SessionId};
use crate::ports::{SessionHandle, SessionStore};

/// Process-local session registry.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // The map only holds handles, so a poisoned guard is still consistent.
    fn map(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: DialogueSession) -> SessionHandle {
        let id = session.id().clone();
        let handle = Arc::new(Mutex::new(session));
        self.map().insert(id, Arc::clone(&handle));
        handle
    }

    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.map().get(id).cloned()
    }

    fn remove(&self, id: &SessionId) -> Option<SessionHandle> {
        self.map().remove(id)
    }

    fn len(&self) -> usize {
        self.map().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisciplineProfile;

    fn session(id: &str) -> DialogueSession {
        DialogueSession::new(SessionId::from(id), DisciplineProfile::generic("physics"))
    }

    #[test]
    fn insert_get_remove() {
        let store = InMemorySessionStore::new();
        store.insert(session("a"));
        store.insert(session("b"));
        assert_eq!(store.len(), 2);

        let handle = store.get(&SessionId::from("a")).unwrap();
        assert_eq!(handle.lock().unwrap().id().as_str(), "a");

        assert!(store.remove(&SessionId::from("a")).is_some());
        assert!(store.get(&SessionId::from("a")).is_none());
        assert!(store.remove(&SessionId::from("a")).is_none());
        assert!(!store.is_empty());
    }

    #[test]
    fn handles_share_state() {
        let store = InMemorySessionStore::new();
        let first = store.insert(session("a"));
        let second = store.get(&SessionId::from("a")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
