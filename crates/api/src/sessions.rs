//! In-memory conversation store

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use triage_engine::{Conversation, TriageEngine};
use uuid::Uuid;

/// Handle to one conversation; the mutex serializes its turns
pub type SessionHandle = Arc<Mutex<Conversation>>;

#[derive(Default)]
struct SessionMap {
    by_id: HashMap<Uuid, SessionHandle>,
    order: VecDeque<Uuid>,
}

/// Live conversations, oldest dropped past `capacity`
pub struct SessionStore {
    capacity: usize,
    inner: RwLock<SessionMap>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(SessionMap::default()),
        }
    }

    /// Start a conversation and return its id and handle
    pub async fn create(&self, engine: Arc<TriageEngine>) -> (Uuid, SessionHandle) {
        let conversation = Conversation::new(engine);
        let id = conversation.id();
        let handle = Arc::new(Mutex::new(conversation));

        let mut map = self.inner.write().await;
        map.by_id.insert(id, handle.clone());
        map.order.push_back(id);
        while map.order.len() > self.capacity {
            if let Some(oldest) = map.order.pop_front() {
                map.by_id.remove(&oldest);
                debug!("Dropped conversation {} (store full)", oldest);
            }
        }

        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}
