//! Per-session conversation storage for the chat layer.
//!
//! The chat layer keeps a message history per session id. `SessionStore`
//! is the seam it talks to; `InMemorySessionStore` bounds growth with a
//! capacity (least recently used session evicted first) and an idle
//! timeout. Time is passed in explicitly as seconds so callers decide
//! the clock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Storage for per-session values.
pub trait SessionStore<V> {
    /// Look up a session and mark it as used at `now`.
    fn get(&mut self, session_id: &str, now: u64) -> Option<&mut V>;

    /// Insert or replace a session's value.
    fn put(&mut self, session_id: &str, value: V, now: u64);

    fn delete(&mut self, session_id: &str) -> Option<V>;

    /// Drop sessions idle for longer than the store's timeout. Returns
    /// how many were dropped.
    fn expire(&mut self, now: u64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A session's message history.
pub type Conversation = Vec<ChatMessage>;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    last_access: u64,
}

/// Bounded in-process session store.
#[derive(Debug)]
pub struct InMemorySessionStore<V> {
    entries: HashMap<String, Entry<V>>,
    capacity: usize,
    idle_timeout_secs: u64,
}

impl<V> InMemorySessionStore<V> {
    pub fn new(capacity: usize, idle_timeout_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            idle_timeout_secs,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            log::debug!("Evicting session {}", key);
            self.entries.remove(&key);
        }
    }
}

impl<V> SessionStore<V> for InMemorySessionStore<V> {
    fn get(&mut self, session_id: &str, now: u64) -> Option<&mut V> {
        let entry = self.entries.get_mut(session_id)?;
        entry.last_access = now;
        Some(&mut entry.value)
    }

    fn put(&mut self, session_id: &str, value: V, now: u64) {
        if !self.entries.contains_key(session_id) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }
        self.entries.insert(
            session_id.to_string(),
            Entry {
                value,
                last_access: now,
            },
        );
    }

    fn delete(&mut self, session_id: &str) -> Option<V> {
        self.entries.remove(session_id).map(|e| e.value)
    }

    fn expire(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        let timeout = self.idle_timeout_secs;
        self.entries
            .retain(|_, e| now.saturating_sub(e.last_access) <= timeout);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            log::info!("Expired {} idle sessions", dropped);
        }
        dropped
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Append a message to a session's history, starting the session with
/// `system_prompt` if it does not exist yet.
pub fn append_message<S: SessionStore<Conversation>>(
    store: &mut S,
    session_id: &str,
    system_prompt: &str,
    message: ChatMessage,
    now: u64,
) {
    if let Some(history) = store.get(session_id, now) {
        history.push(message);
        return;
    }
    store.put(
        session_id,
        vec![ChatMessage::new(ChatRole::System, system_prompt), message],
        now,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store: InMemorySessionStore<u32> = InMemorySessionStore::new(4, 60);
        store.put("a", 1, 0);
        assert_eq!(store.get("a", 1).copied(), Some(1));
        *store.get("a", 2).unwrap() += 1;
        assert_eq!(store.delete("a"), Some(2));
        assert!(store.get("a", 3).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut store = InMemorySessionStore::new(2, 600);
        store.put("a", "first", 0);
        store.put("b", "second", 1);
        // Touch "a" so "b" becomes the oldest.
        store.get("a", 2);
        store.put("c", "third", 3);
        assert_eq!(store.len(), 2);
        assert!(store.get("b", 4).is_none());
        assert!(store.get("a", 4).is_some());
        assert!(store.get("c", 4).is_some());
    }

    #[test]
    fn test_replacing_does_not_evict() {
        let mut store = InMemorySessionStore::new(2, 600);
        store.put("a", 1, 0);
        store.put("b", 2, 1);
        store.put("a", 3, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b", 3).copied(), Some(2));
    }

    #[test]
    fn test_expire_idle_sessions() {
        let mut store = InMemorySessionStore::new(10, 30);
        store.put("old", 1, 0);
        store.put("fresh", 2, 50);
        assert_eq!(store.expire(60), 1);
        assert!(store.get("old", 60).is_none());
        assert!(store.get("fresh", 60).is_some());
        assert_eq!(store.expire(60), 0);
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let mut store = InMemorySessionStore::new(0, 30);
        assert_eq!(store.capacity(), 1);
        store.put("a", 1, 0);
        store.put("b", 2, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("b", 2).is_some());
    }

    #[test]
    fn test_conversation_history() {
        let mut store: InMemorySessionStore<Conversation> = InMemorySessionStore::new(8, 3600);
        append_message(
            &mut store,
            "s1",
            "You design floor plans.",
            ChatMessage::new(ChatRole::User, "Two bedrooms please"),
            0,
        );
        append_message(
            &mut store,
            "s1",
            "You design floor plans.",
            ChatMessage::new(ChatRole::Assistant, "Any bathrooms?"),
            5,
        );
        let history = store.get("s1", 6).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, ChatRole::System);
        assert_eq!(history[2].content, "Any bathrooms?");
    }

    #[test]
    fn test_message_wire_shape() {
        let msg = ChatMessage::new(ChatRole::User, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
