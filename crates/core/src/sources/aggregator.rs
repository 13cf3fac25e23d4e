//! Registry of live emitters and the per-tick source snapshot
//!
//! Emitters are stored behind typed handles. Snapshot order is registration
//! order, which matters for local sources: a later overwriting source wins
//! over earlier contributions at the same cell.

use crate::sources::global::{GlobalWindEmitter, GlobalWindSource};
use crate::sources::local::{LocalWindEmitter, LocalWindSource};
use crate::sources::obstacle::{Obstacle, SphereObstacle};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

macro_rules! source_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

source_id!(
    /// Handle of a registered global wind emitter
    GlobalWindId
);
source_id!(
    /// Handle of a registered local wind emitter
    LocalWindId
);
source_id!(
    /// Handle of a registered obstacle
    ObstacleId
);

/// Immutable input for one update: plain arrays of source descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub globals: Vec<GlobalWindSource>,
    pub locals: Vec<LocalWindSource>,
    pub obstacles: Vec<Obstacle>,
}

impl SourceSnapshot {
    /// Append shared local winds after this snapshot's own.
    pub fn extend_locals(&mut self, shared: &[LocalWindSource]) {
        self.locals.extend_from_slice(shared);
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.locals.is_empty() && self.obstacles.is_empty()
    }
}

/// Insertion-ordered map from handle to emitter.
#[derive(Debug, Clone)]
struct Registry<K, V> {
    items: FxHashMap<K, V>,
    order: Vec<K>,
}

impl<K: Copy + Eq + Hash, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            items: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, V> Registry<K, V> {
    fn insert(&mut self, key: K, value: V) {
        self.items.insert(key, value);
        self.order.push(key);
    }

    fn remove(&mut self, key: K) -> Option<V> {
        let value = self.items.remove(&key)?;
        self.order.retain(|k| *k != key);
        Some(value)
    }

    fn get(&self, key: K) -> Option<&V> {
        self.items.get(&key)
    }

    fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.items.get_mut(&key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn map_ordered_mut<T>(&mut self, mut f: impl FnMut(&mut V) -> T) -> Vec<T> {
        let Self { items, order } = self;
        order
            .iter()
            .filter_map(|key| items.get_mut(key).map(&mut f))
            .collect()
    }

    fn ordered(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|key| self.items.get(key))
    }
}

/// Collects the emitters that feed a zone.
#[derive(Debug, Clone, Default)]
pub struct SourceAggregator {
    next_id: u64,
    globals: Registry<GlobalWindId, GlobalWindEmitter>,
    locals: Registry<LocalWindId, LocalWindEmitter>,
    obstacles: Registry<ObstacleId, SphereObstacle>,
}

impl SourceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_global(&mut self, emitter: GlobalWindEmitter) -> GlobalWindId {
        let id = GlobalWindId(self.allocate_id());
        self.globals.insert(id, emitter);
        id
    }

    pub fn add_local(&mut self, emitter: LocalWindEmitter) -> LocalWindId {
        let id = LocalWindId(self.allocate_id());
        self.locals.insert(id, emitter);
        id
    }

    pub fn add_obstacle(&mut self, obstacle: SphereObstacle) -> ObstacleId {
        let id = ObstacleId(self.allocate_id());
        self.obstacles.insert(id, obstacle);
        id
    }

    pub fn remove_global(&mut self, id: GlobalWindId) -> Option<GlobalWindEmitter> {
        self.globals.remove(id)
    }

    pub fn remove_local(&mut self, id: LocalWindId) -> Option<LocalWindEmitter> {
        self.locals.remove(id)
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Option<SphereObstacle> {
        self.obstacles.remove(id)
    }

    pub fn global(&self, id: GlobalWindId) -> Option<&GlobalWindEmitter> {
        self.globals.get(id)
    }

    pub fn local(&self, id: LocalWindId) -> Option<&LocalWindEmitter> {
        self.locals.get(id)
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&SphereObstacle> {
        self.obstacles.get(id)
    }

    pub fn global_mut(&mut self, id: GlobalWindId) -> Option<&mut GlobalWindEmitter> {
        self.globals.get_mut(id)
    }

    pub fn local_mut(&mut self, id: LocalWindId) -> Option<&mut LocalWindEmitter> {
        self.locals.get_mut(id)
    }

    pub fn obstacle_mut(&mut self, id: ObstacleId) -> Option<&mut SphereObstacle> {
        self.obstacles.get_mut(id)
    }

    /// Number of registered emitters as (globals, locals, obstacles).
    pub fn len(&self) -> (usize, usize, usize) {
        (self.globals.len(), self.locals.len(), self.obstacles.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0, 0)
    }

    /// Snapshot every emitter in registration order.
    ///
    /// Takes `&mut self` because obstacles derive their velocity from the
    /// displacement since the previous snapshot.
    pub fn snapshot(&mut self, dt: f32) -> SourceSnapshot {
        SourceSnapshot {
            globals: self.globals.ordered().map(GlobalWindEmitter::snapshot).collect(),
            locals: self.locals.ordered().map(LocalWindEmitter::snapshot).collect(),
            obstacles: self.obstacles.map_ordered_mut(|obstacle| obstacle.snapshot(dt)),
        }
    }
}
