//! Event listener registry for resource-lifecycle notifications.
//!
//! Geometries hold an [`EventDispatcher`] by composition and broadcast a
//! `"dispose"` event when released, so render-side resources (GPU buffers,
//! cached layouts) can be freed by whoever uploaded them. The dispatcher
//! carries no payload beyond the event kind tag.

/// An event delivered to listeners. Carries only its kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    /// Event kind, e.g. `"dispose"`.
    pub kind: &'a str,
}

/// Handle identifying a registered listener, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Event) + Send>;

/// Listener registry with subscribe/unsubscribe/broadcast.
#[derive(Default)]
pub struct EventDispatcher {
    next_id: u64,
    listeners: Vec<(ListenerId, String, Listener)>,
}

impl EventDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of the given kind.
    pub fn add_event_listener(
        &mut self,
        kind: impl Into<String>,
        callback: impl FnMut(&Event) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind.into(), Box::new(callback)));
        id
    }

    /// Remove a previously registered listener. Returns false if the id is
    /// unknown (already removed).
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Whether any listener is registered for `kind`.
    pub fn has_event_listener(&self, kind: &str) -> bool {
        self.listeners.iter().any(|(_, k, _)| k == kind)
    }

    /// Invoke every listener registered for `kind`.
    pub fn dispatch_event(&mut self, kind: &str) {
        let event = Event { kind };
        for (_, k, callback) in &mut self.listeners {
            if k == kind {
                callback(&event);
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
