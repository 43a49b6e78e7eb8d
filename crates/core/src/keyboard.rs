//! Shared keyboard dispatch.
//!
//! A [`KeyboardHub`] stands in for the document-level key target that every
//! flipbook on a page shares. Each instance holds a [`KeyboardListener`]
//! keyed by its own id; dropping the listener unregisters it, so one
//! instance's teardown never removes another's handler.
//!
//! Each listener queues at most [`LISTENER_CAPACITY`] keys. Keys sent to a
//! full queue are dropped for that listener.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Keys the flipbook reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other(u32),
}

impl Key {
    /// Map a DOM `keyCode`.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            37 => Key::ArrowLeft,
            39 => Key::ArrowRight,
            27 => Key::Escape,
            other => Key::Other(other),
        }
    }
}

/// Keys buffered per listener before further presses are dropped.
pub const LISTENER_CAPACITY: usize = 16;

type Listeners = Arc<Mutex<HashMap<Uuid, async_channel::Sender<Key>>>>;

fn lock(listeners: &Listeners) -> MutexGuard<'_, HashMap<Uuid, async_channel::Sender<Key>>> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Document-level key target shared by all flipbooks on a page.
#[derive(Debug, Clone, Default)]
pub struct KeyboardHub {
    listeners: Listeners,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener. It stays registered until dropped.
    pub fn listen(&self) -> KeyboardListener {
        let id = Uuid::new_v4();
        let (sender, receiver) = async_channel::bounded(LISTENER_CAPACITY);
        lock(&self.listeners).insert(id, sender);
        debug!("Keyboard listener {} registered", id);

        KeyboardListener {
            id,
            receiver,
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Deliver `key` to every registered listener. Returns how many received it.
    pub fn dispatch(&self, key: Key) -> usize {
        lock(&self.listeners)
            .values()
            .filter(|sender| sender.try_send(key).is_ok())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

/// One instance's registration on a [`KeyboardHub`].
#[derive(Debug)]
pub struct KeyboardListener {
    id: Uuid,
    receiver: async_channel::Receiver<Key>,
    listeners: Listeners,
}

impl KeyboardListener {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next pending key, if any.
    pub fn try_next(&self) -> Option<Key> {
        self.receiver.try_recv().ok()
    }

    /// Discard every queued key. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.receiver.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Wait for the next key.
    pub async fn next(&self) -> Result<Key> {
        Ok(self.receiver.recv().await?)
    }
}

impl Drop for KeyboardListener {
    fn drop(&mut self) {
        lock(&self.listeners).remove(&self.id);
        debug!("Keyboard listener {} released", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_key_code(37), Key::ArrowLeft);
        assert_eq!(Key::from_key_code(39), Key::ArrowRight);
        assert_eq!(Key::from_key_code(27), Key::Escape);
        assert_eq!(Key::from_key_code(13), Key::Other(13));
    }

    #[test]
    fn test_dispatch_reaches_every_listener() {
        let hub = KeyboardHub::new();
        let a = hub.listen();
        let b = hub.listen();
        assert_ne!(a.id(), b.id());

        assert_eq!(hub.dispatch(Key::ArrowRight), 2);
        assert_eq!(a.try_next(), Some(Key::ArrowRight));
        assert_eq!(b.try_next(), Some(Key::ArrowRight));
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn test_drop_releases_only_own_listener() {
        let hub = KeyboardHub::new();
        let a = hub.listen();
        let b = hub.listen();
        drop(a);

        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.dispatch(Key::Escape), 1);
        assert_eq!(b.try_next(), Some(Key::Escape));
    }

    #[test]
    fn test_full_queue_drops_keys() {
        let hub = KeyboardHub::new();
        let listener = hub.listen();

        for _ in 0..LISTENER_CAPACITY {
            assert_eq!(hub.dispatch(Key::ArrowRight), 1);
        }
        assert_eq!(hub.dispatch(Key::ArrowLeft), 0);

        assert_eq!(listener.clear(), LISTENER_CAPACITY);
        assert_eq!(listener.try_next(), None);
        assert_eq!(hub.dispatch(Key::Escape), 1);
    }

    #[tokio::test]
    async fn test_next_waits_for_key() {
        let hub = KeyboardHub::new();
        let listener = hub.listen();
        hub.dispatch(Key::ArrowLeft);
        assert_eq!(listener.next().await.unwrap(), Key::ArrowLeft);
    }
}
