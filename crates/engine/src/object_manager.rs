// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object Manager (C3): maps stable RPC paths to tracked entities and
//! maintains the domain-id and uuid indexes that resolve to them
//! (§4.3, invariants 1-3).

use lvmd_core::{bracketed_form, ObjectPath, Uuid};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Notification channel capacity (§4.3's "emit interface-added /
/// interface-removed notifications"). Lagging subscribers drop the
/// oldest events rather than blocking a register/remove caller.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A per-entity notification, emitted from [`ObjectManager::register`] and
/// [`ObjectManager::remove`] when their caller asks for one. Subscribers
/// are the wire layer's ObjectManager interface, which turns these into
/// `InterfacesAdded`/`InterfacesRemoved` signals.
#[derive(Debug, Clone)]
pub enum ObjectEvent {
    InterfacesAdded { kind: EntityType, path: ObjectPath },
    InterfacesRemoved { kind: EntityType, path: ObjectPath },
}

/// The entity kind a registered path belongs to, so `object_paths_by_type`
/// can filter without the caller downcasting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Pv,
    Vg,
    Lv,
}

/// Per-type monotonic path-allocation counters, grouped per §9's
/// "Path-allocation counters become atomic counters inside that context".
#[derive(Default)]
pub struct PathAllocator {
    pv: AtomicU64,
    vg: AtomicU64,
    lv: AtomicU64,
}

impl PathAllocator {
    pub fn allocate(&self, kind: EntityType) -> ObjectPath {
        let counter = match kind {
            EntityType::Pv => &self.pv,
            EntityType::Vg => &self.vg,
            EntityType::Lv => &self.lv,
        };
        let n = counter.fetch_add(1, Ordering::SeqCst);
        let prefix = match kind {
            EntityType::Pv => "Pv",
            EntityType::Vg => "Vg",
            EntityType::Lv => "Lv",
        };
        ObjectPath::new(format!("/org/lvmd/{prefix}{n}"))
    }
}

#[derive(Debug, Clone)]
struct Registration {
    kind: EntityType,
    domain_id: String,
    uuid: Uuid,
}

#[derive(Default)]
struct Inner {
    by_path: HashMap<ObjectPath, Registration>,
    by_domain_id: HashMap<String, ObjectPath>,
    by_uuid: HashMap<Uuid, ObjectPath>,
}

/// A single reentrant lock guarding all three indexes (§4.3, §9's "a
/// single lock that supports nested acquisition in a bounded number of
/// well-known call sites"). Multi-step callers use [`ObjectManager::locked`]
/// instead of re-acquiring.
pub struct ObjectManager {
    inner: ReentrantMutex<RefCell<Inner>>,
    allocator: PathAllocator,
    events: broadcast::Sender<ObjectEvent>,
}

/// The mutable, nested-acquisition-safe view handed to a locked scope.
pub struct Locked<'a> {
    inner: &'a RefCell<Inner>,
    allocator: &'a PathAllocator,
    events: &'a broadcast::Sender<ObjectEvent>,
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { inner: ReentrantMutex::new(RefCell::new(Inner::default())), allocator: PathAllocator::default(), events }
    }

    /// Subscribes to interface-added/interface-removed notifications.
    /// Each registered kind's events are broadcast to every subscriber;
    /// a subscriber that falls behind `EVENT_CHANNEL_CAPACITY` events
    /// observes a lagged-receiver error on its next `recv` rather than
    /// blocking registration.
    pub fn subscribe(&self) -> broadcast::Receiver<ObjectEvent> {
        self.events.subscribe()
    }

    /// Exposes the mutex to a caller that must perform a composite
    /// multi-step read-modify-write without releasing the lock in between.
    pub fn locked<R>(&self, f: impl FnOnce(&mut Locked<'_>) -> R) -> R {
        let guard = self.inner.lock();
        let mut locked = Locked { inner: &guard, allocator: &self.allocator, events: &self.events };
        f(&mut locked)
    }

    /// Registers `path` under `kind`/`domain_id`/`uuid`. When `emit_signal`
    /// is true, broadcasts an `InterfacesAdded` notification once the
    /// indexes are updated.
    pub fn register(&self, kind: EntityType, domain_id: impl Into<String>, uuid: Uuid, path: ObjectPath, emit_signal: bool) {
        self.locked(|l| l.register(kind, domain_id, uuid, path, emit_signal));
    }

    /// Removes `path`'s registration, if any. When `emit_signal` is true
    /// and a registration was found, broadcasts an `InterfacesRemoved`
    /// notification.
    pub fn remove(&self, path: &ObjectPath, emit_signal: bool) -> Option<EntityType> {
        self.locked(|l| l.remove(path, emit_signal))
    }

    pub fn lookup_by_path(&self, path: &ObjectPath) -> bool {
        self.locked(|l| l.inner.borrow().by_path.contains_key(path))
    }

    pub fn lookup_by_domain_id(&self, domain_id: &str) -> Option<ObjectPath> {
        self.locked(|l| l.lookup_by_domain_id(domain_id))
    }

    pub fn lookup_by_uuid(&self, uuid: &Uuid) -> Option<ObjectPath> {
        self.locked(|l| l.inner.borrow().by_uuid.get(uuid).cloned())
    }

    pub fn lookup_by_uuid_and_domain_id(&self, uuid: &Uuid, domain_id: &str) -> Option<ObjectPath> {
        self.locked(|l| l.lookup_by_uuid(uuid).or_else(|| l.lookup_by_domain_id(domain_id)))
    }

    /// The uuid currently registered at `path`, if any.
    pub fn uuid_at(&self, path: &ObjectPath) -> Option<Uuid> {
        self.locked(|l| l.inner.borrow().by_path.get(path).map(|reg| reg.uuid.clone()))
    }

    /// The canonical resolver of §4.3: try the literal domain id, then
    /// the bracketed hidden-leaf form, then the uuid; reconcile the
    /// indexes on a hit (a rename or uuid change becomes consistent); if
    /// `allocate` is true and nothing resolves, reserve a fresh path and,
    /// when `emit_signal` is true, broadcast its `InterfacesAdded`.
    pub fn path_for(
        &self,
        kind: EntityType,
        uuid: &Uuid,
        domain_id: &str,
        allocate: bool,
        emit_signal: bool,
    ) -> Option<ObjectPath> {
        self.locked(|l| l.path_for(kind, uuid, domain_id, allocate, emit_signal))
    }

    pub fn object_paths_by_type(&self, kind: EntityType) -> Vec<ObjectPath> {
        self.locked(|l| {
            l.inner.borrow().by_path.iter().filter(|(_, reg)| reg.kind == kind).map(|(path, _)| path.clone()).collect()
        })
    }

    pub fn len(&self) -> usize {
        self.locked(|l| l.inner.borrow().by_path.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Locked<'_> {
    pub fn register(&mut self, kind: EntityType, domain_id: impl Into<String>, uuid: Uuid, path: ObjectPath, emit_signal: bool) {
        let domain_id = domain_id.into();
        {
            let mut inner = self.inner.borrow_mut();
            inner.by_domain_id.insert(domain_id.clone(), path.clone());
            inner.by_uuid.insert(uuid.clone(), path.clone());
            inner.by_path.insert(path.clone(), Registration { kind, domain_id, uuid });
        }
        if emit_signal {
            let _ = self.events.send(ObjectEvent::InterfacesAdded { kind, path });
        }
    }

    pub fn remove(&mut self, path: &ObjectPath, emit_signal: bool) -> Option<EntityType> {
        let kind = {
            let mut inner = self.inner.borrow_mut();
            let reg = inner.by_path.remove(path)?;
            inner.by_domain_id.remove(&reg.domain_id);
            inner.by_uuid.remove(&reg.uuid);
            reg.kind
        };
        if emit_signal {
            let _ = self.events.send(ObjectEvent::InterfacesRemoved { kind, path: path.clone() });
        }
        Some(kind)
    }

    pub fn lookup_by_domain_id(&self, domain_id: &str) -> Option<ObjectPath> {
        let inner = self.inner.borrow();
        inner
            .by_domain_id
            .get(domain_id)
            .or_else(|| inner.by_domain_id.get(&bracketed_form(domain_id)))
            .cloned()
    }

    pub fn lookup_by_uuid(&self, uuid: &Uuid) -> Option<ObjectPath> {
        self.inner.borrow().by_uuid.get(uuid).cloned()
    }

    pub fn path_for(
        &mut self,
        kind: EntityType,
        uuid: &Uuid,
        domain_id: &str,
        allocate: bool,
        emit_signal: bool,
    ) -> Option<ObjectPath> {
        if let Some(path) = self.lookup_by_domain_id(domain_id) {
            self.reconcile(&path, domain_id, uuid);
            return Some(path);
        }
        if let Some(path) = self.lookup_by_uuid(uuid) {
            self.reconcile(&path, domain_id, uuid);
            return Some(path);
        }
        if !allocate {
            return None;
        }
        let path = self.allocator.allocate(kind);
        self.register(kind, domain_id, uuid.clone(), path.clone(), emit_signal);
        Some(path)
    }

    /// Re-points the domain-id/uuid indexes at `path` so a rename or a
    /// uuid change observed by a later reconciliation stays consistent
    /// with the path that was already resolved (invariant 3).
    fn reconcile(&mut self, path: &ObjectPath, domain_id: &str, uuid: &Uuid) {
        let mut inner = self.inner.borrow_mut();
        let Some(reg) = inner.by_path.get(path).cloned() else { return };
        if reg.domain_id != domain_id {
            inner.by_domain_id.remove(&reg.domain_id);
            inner.by_domain_id.insert(domain_id.to_string(), path.clone());
        }
        if &reg.uuid != uuid {
            inner.by_uuid.remove(&reg.uuid);
            inner.by_uuid.insert(uuid.clone(), path.clone());
        }
        if let Some(entry) = inner.by_path.get_mut(path) {
            entry.domain_id = domain_id.to_string();
            entry.uuid = uuid.clone();
        }
    }
}

#[cfg(test)]
#[path = "object_manager_tests.rs"]
mod tests;
