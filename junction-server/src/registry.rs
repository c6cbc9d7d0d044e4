//! Per-dispatcher method and notification registries
//!
//! Each dispatcher owns one [`Registry`] holding two name tables: *methods*
//! (expect a response) and *notifications* (never answered). Entries pair a
//! handler with [`Capabilities`] flags gating which transport kinds may
//! invoke it.
//!
//! # Isolation and lifecycle
//!
//! Registries are explicit per-dispatcher objects; there is no process-wide
//! table keyed by type identity. Two dispatchers never share registrations.
//! Registration is expected to finish before serving begins; after that the
//! tables are read-mostly and treated as immutable. The interior `RwLock`
//! provides basic insertion atomicity for registration and supports
//! [`Registry::reset`] for test isolation, nothing more.

use crate::handler::Handler;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The kind of channel a request arrived on.
///
/// Capability filtering compares a registered entry's flags against this
/// value; a mismatch is indistinguishable from the method not existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Persistent bidirectional message channel (WebSocket)
    Duplex,
    /// Single-shot request/response channel (HTTP)
    RequestResponse,
}

/// Per-entry transport capability flags.
///
/// Both flags default to true; a handler registered with a flag cleared
/// resolves as Method Not Found on that transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// May be invoked over a duplex channel
    pub duplex: bool,
    /// May be invoked over a request-response channel
    pub request_response: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            duplex: true,
            request_response: true,
        }
    }
}

impl Capabilities {
    /// Allow only duplex transports.
    pub fn duplex_only() -> Self {
        Self {
            duplex: true,
            request_response: false,
        }
    }

    /// Allow only request-response transports.
    pub fn request_response_only() -> Self {
        Self {
            duplex: false,
            request_response: true,
        }
    }

    /// Whether the given transport kind may invoke the entry.
    pub fn allows(self, transport: Transport) -> bool {
        match transport {
            Transport::Duplex => self.duplex,
            Transport::RequestResponse => self.request_response,
        }
    }
}

/// A registered handler with its capability flags.
#[derive(Clone)]
pub struct Entry {
    pub handler: Arc<dyn Handler>,
    pub caps: Capabilities,
}

#[derive(Default)]
struct Tables {
    methods: HashMap<String, Entry>,
    notifications: HashMap<String, Entry>,
}

/// Name-to-handler tables owned by one dispatcher.
///
/// Cloning a `Registry` clones the handle, not the tables; a dispatcher and
/// its connections all observe the same registrations.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Tables>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method handler under `name` with default capabilities.
    pub fn register_method(&self, name: impl Into<String>, handler: Box<dyn Handler>) {
        self.register_method_with(name, Capabilities::default(), handler);
    }

    /// Register a method handler with explicit capability flags.
    pub fn register_method_with(
        &self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) {
        let mut tables = self.write();
        tables.methods.insert(
            name.into(),
            Entry {
                handler: Arc::from(handler),
                caps,
            },
        );
    }

    /// Register a notification handler under `name` with default capabilities.
    pub fn register_notification(&self, name: impl Into<String>, handler: Box<dyn Handler>) {
        self.register_notification_with(name, Capabilities::default(), handler);
    }

    /// Register a notification handler with explicit capability flags.
    pub fn register_notification_with(
        &self,
        name: impl Into<String>,
        caps: Capabilities,
        handler: Box<dyn Handler>,
    ) {
        let mut tables = self.write();
        tables.notifications.insert(
            name.into(),
            Entry {
                handler: Arc::from(handler),
                caps,
            },
        );
    }

    /// Registered method names, sorted; empty when none are registered.
    pub fn method_names(&self) -> Vec<String> {
        let tables = self.read();
        let mut names: Vec<String> = tables.methods.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered notification names, sorted; empty when none are registered.
    pub fn notification_names(&self) -> Vec<String> {
        let tables = self.read();
        let mut names: Vec<String> = tables.notifications.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up an entry in the method or notification table.
    ///
    /// Capability filtering is the caller's concern; this is a plain name
    /// lookup.
    pub fn lookup(&self, name: &str, is_notification: bool) -> Option<Entry> {
        let tables = self.read();
        if is_notification {
            tables.notifications.get(name).cloned()
        } else {
            tables.methods.get(name).cloned()
        }
    }

    /// Clear all registrations. Intended for test isolation.
    pub fn reset(&self) {
        let mut tables = self.write();
        tables.methods.clear();
        tables.notifications.clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;
    use serde_json::json;

    fn noop() -> Box<dyn Handler> {
        from_fn(|_| async { Ok(json!(null)) })
    }

    #[test]
    fn test_register_and_list() {
        let registry = Registry::new();
        registry.register_method("ping3", noop());
        registry.register_notification("notif1", noop());

        assert_eq!(registry.method_names(), vec!["ping3"]);
        assert_eq!(registry.notification_names(), vec!["notif1"]);
        assert!(registry.lookup("ping3", false).is_some());
        assert!(registry.lookup("ping3", true).is_none());
        assert!(registry.lookup("notif1", true).is_some());
    }

    #[test]
    fn test_registries_are_isolated() {
        let one = Registry::new();
        let two = Registry::new();
        one.register_method("method1", noop());
        two.register_method("method2", noop());

        assert_eq!(one.method_names(), vec!["method1"]);
        assert_eq!(two.method_names(), vec!["method2"]);
    }

    #[test]
    fn test_reset_clears_both_tables() {
        let registry = Registry::new();
        registry.register_method("method_34", noop());
        registry.register_notification("notif_34", noop());
        assert!(!registry.method_names().is_empty());

        registry.reset();
        assert!(registry.method_names().is_empty());
        assert!(registry.notification_names().is_empty());
    }

    #[test]
    fn test_empty_registry_lists_nothing() {
        let registry = Registry::new();
        assert!(registry.method_names().is_empty());
        assert!(registry.notification_names().is_empty());
    }

    #[test]
    fn test_capability_flags() {
        assert!(Capabilities::default().allows(Transport::Duplex));
        assert!(Capabilities::default().allows(Transport::RequestResponse));
        assert!(!Capabilities::duplex_only().allows(Transport::RequestResponse));
        assert!(!Capabilities::request_response_only().allows(Transport::Duplex));
    }
}
