//! Lifecycle event bus.
//!
//! Registration with the host is deferred: assets subscribe to the event of their
//! area and do the real work when the host publishes it.

use std::fmt;
use std::sync::Arc;

use enqueuer_core::alloc::IndexMap;
use parking_lot::RwLock;

use crate::error::AssetResult;
use crate::host::AssetType;
use crate::server::AssetServer;

/// What a subscription does when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    Enqueue,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::Enqueue => "enqueue",
        }
    }
}

/// Identity of a subscription. An event holds at most one handler per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookKey {
    pub kind: AssetType,
    pub name: String,
    pub action: Action,
}

impl HookKey {
    pub fn new(kind: AssetType, name: impl Into<String>, action: Action) -> Self {
        Self {
            kind,
            name: name.into(),
            action,
        }
    }
}

impl fmt::Display for HookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.action.name(), self.kind, self.name)
    }
}

/// A handler run when an event is published.
pub trait Hook: Send + Sync {
    fn run(&self, server: &AssetServer) -> AssetResult<()>;
}

impl<F> Hook for F
where
    F: Fn(&AssetServer) -> AssetResult<()> + Send + Sync,
{
    fn run(&self, server: &AssetServer) -> AssetResult<()> {
        self(server)
    }
}

type Subscribers = IndexMap<HookKey, Arc<dyn Hook>>;

/// Named events and their subscribers, in subscription order.
#[derive(Default)]
pub struct Hooks {
    events: RwLock<IndexMap<String, Subscribers>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `hook` to `event`.
    ///
    /// A subscription with the same key replaces the existing handler and keeps its
    /// place in the order.
    pub fn subscribe(&self, event: &str, key: HookKey, hook: impl Hook + 'static) {
        tracing::trace!("Subscribing {} to '{}'", key, event);
        self.events
            .write()
            .entry(event.to_string())
            .or_default()
            .insert(key, Arc::new(hook));
    }

    /// Drop one subscription. Returns whether it existed.
    pub fn unsubscribe(&self, event: &str, key: &HookKey) -> bool {
        self.events
            .write()
            .get_mut(event)
            .and_then(|subscribers| subscribers.shift_remove(key))
            .is_some()
    }

    /// Drop every subscription of the named asset, on every event.
    pub fn cancel(&self, kind: AssetType, name: &str) -> usize {
        let mut events = self.events.write();
        let mut cancelled = 0;
        for subscribers in events.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|key, _| key.kind != kind || key.name != name);
            cancelled += before - subscribers.len();
        }
        if cancelled > 0 {
            tracing::trace!("Cancelled {} pending hooks of {} '{}'", cancelled, kind, name);
        }
        cancelled
    }

    pub fn is_subscribed(&self, event: &str, key: &HookKey) -> bool {
        self.events
            .read()
            .get(event)
            .is_some_and(|subscribers| subscribers.contains_key(key))
    }

    /// Keys subscribed to `event`, in run order.
    pub fn subscribers(&self, event: &str) -> Vec<HookKey> {
        self.events
            .read()
            .get(event)
            .map(|subscribers| subscribers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of the handlers of `event`, so they can run without holding the lock.
    pub(crate) fn snapshot(&self, event: &str) -> Vec<(HookKey, Arc<dyn Hook>)> {
        self.events
            .read()
            .get(event)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .map(|(key, hook)| (key.clone(), Arc::clone(hook)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of subscriptions across every event.
    pub fn len(&self) -> usize {
        self.events.read().values().map(|subscribers| subscribers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.events.read();
        f.debug_map()
            .entries(events.iter().map(|(event, subscribers)| {
                (event.clone(), subscribers.keys().map(ToString::to_string).collect::<Vec<_>>())
            }))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &AssetServer) -> AssetResult<()> {
        Ok(())
    }

    fn key(name: &str, action: Action) -> HookKey {
        HookKey::new(AssetType::Style, name, action)
    }

    #[test]
    fn test_subscribe_dedup_keeps_order() {
        let hooks = Hooks::new();
        hooks.subscribe("assets-for-visitors", key("foo", Action::Enqueue), noop);
        hooks.subscribe("assets-for-visitors", key("bar", Action::Enqueue), noop);
        hooks.subscribe("assets-for-visitors", key("foo", Action::Enqueue), noop);

        let names: Vec<_> = hooks
            .subscribers("assets-for-visitors")
            .into_iter()
            .map(|key| key.name)
            .collect();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(hooks.len(), 2);
    }

    #[test]
    fn test_actions_are_distinct() {
        let hooks = Hooks::new();
        hooks.subscribe("assets-for-admin", key("foo", Action::Register), noop);
        hooks.subscribe("assets-for-admin", key("foo", Action::Enqueue), noop);
        assert_eq!(hooks.subscribers("assets-for-admin").len(), 2);
    }

    #[test]
    fn test_cancel_across_events() {
        let hooks = Hooks::new();
        hooks.subscribe("assets-for-admin", key("foo", Action::Register), noop);
        hooks.subscribe("assets-for-login", key("foo", Action::Enqueue), noop);
        hooks.subscribe("assets-for-login", key("bar", Action::Enqueue), noop);
        hooks.subscribe(
            "assets-for-login",
            HookKey::new(AssetType::Script, "foo", Action::Enqueue),
            noop,
        );

        assert_eq!(hooks.cancel(AssetType::Style, "foo"), 2);
        assert!(hooks.subscribers("assets-for-admin").is_empty());
        assert!(hooks.is_subscribed("assets-for-login", &key("bar", Action::Enqueue)));
        assert!(hooks.is_subscribed(
            "assets-for-login",
            &HookKey::new(AssetType::Script, "foo", Action::Enqueue)
        ));
    }

    #[test]
    fn test_unsubscribe_and_clear() {
        let hooks = Hooks::new();
        let foo = key("foo", Action::Enqueue);
        hooks.subscribe("assets-for-visitors", foo.clone(), noop);

        assert!(hooks.unsubscribe("assets-for-visitors", &foo));
        assert!(!hooks.unsubscribe("assets-for-visitors", &foo));
        assert!(!hooks.unsubscribe("assets-for-admin", &foo));

        hooks.subscribe("assets-for-visitors", foo, noop);
        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let hooks = Hooks::new();
        hooks.subscribe("assets-for-visitors", key("foo", Action::Enqueue), noop);

        let snapshot = hooks.snapshot("assets-for-visitors");
        hooks.clear();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, key("foo", Action::Enqueue));
    }
}
