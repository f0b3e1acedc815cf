use std::sync::{Arc, Mutex};

use crate::domain::{DialogueSession, SessionId};

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<DialogueSession>>;

/// Port for keeping live sessions keyed by id.
///
/// The store only guards the map; each session carries its own lock so
/// unrelated sessions never wait on each other.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: DialogueSession) -> SessionHandle;

    fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drop a session, returning its handle if it existed.
    fn remove(&self, id: &SessionId) -> Option<SessionHandle>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
