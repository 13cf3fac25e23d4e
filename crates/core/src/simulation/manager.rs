//! Multi-zone wind manager
//!
//! Owns every zone together with the aggregator feeding it, plus one shared
//! aggregator of constant local winds that applies to all zones. Constructed
//! explicitly by the host and passed around by ownership.

use crate::grid::config::{GridConfig, GridConfigError};
use crate::simulation::zone::{TickOutcome, VoxelWindZone};
use crate::sources::aggregator::{LocalWindId, SourceAggregator};
use crate::sources::local::LocalWindEmitter;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Handle of a zone registered with a [`WindManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u64);

struct ManagedZone {
    zone: VoxelWindZone,
    sources: SourceAggregator,
}

/// Result of ticking one zone.
pub type ZoneTickResult = (ZoneId, Result<TickOutcome, GridConfigError>);

#[derive(Default)]
pub struct WindManager {
    zones: FxHashMap<ZoneId, ManagedZone>,
    order: Vec<ZoneId>,
    next_id: u64,
    shared: SourceAggregator,
}

impl WindManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone built from `config` with an empty aggregator.
    pub fn add_zone(&mut self, config: GridConfig) -> ZoneId {
        self.insert_zone(VoxelWindZone::new(config), SourceAggregator::new())
    }

    /// Register an existing zone and its sources.
    pub fn insert_zone(&mut self, zone: VoxelWindZone, sources: SourceAggregator) -> ZoneId {
        self.next_id += 1;
        let id = ZoneId(self.next_id);
        self.zones.insert(id, ManagedZone { zone, sources });
        self.order.push(id);
        info!("Registered wind zone {} ({} zones)", id.0, self.order.len());
        id
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Option<(VoxelWindZone, SourceAggregator)> {
        let managed = self.zones.remove(&id)?;
        self.order.retain(|z| *z != id);
        Some((managed.zone, managed.sources))
    }

    /// Zone handles in registration order.
    pub fn zone_ids(&self) -> &[ZoneId] {
        &self.order
    }

    pub fn zone(&self, id: ZoneId) -> Option<&VoxelWindZone> {
        self.zones.get(&id).map(|m| &m.zone)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut VoxelWindZone> {
        self.zones.get_mut(&id).map(|m| &mut m.zone)
    }

    pub fn sources(&self, id: ZoneId) -> Option<&SourceAggregator> {
        self.zones.get(&id).map(|m| &m.sources)
    }

    pub fn sources_mut(&mut self, id: ZoneId) -> Option<&mut SourceAggregator> {
        self.zones.get_mut(&id).map(|m| &mut m.sources)
    }

    /// Aggregator whose local winds are applied to every zone.
    pub fn shared_sources_mut(&mut self) -> &mut SourceAggregator {
        &mut self.shared
    }

    /// Register a local wind that applies to every zone.
    pub fn add_constant_local(&mut self, emitter: LocalWindEmitter) -> LocalWindId {
        self.shared.add_local(emitter)
    }

    pub fn remove_constant_local(&mut self, id: LocalWindId) -> Option<LocalWindEmitter> {
        self.shared.remove_local(id)
    }

    /// Tick every zone in registration order.
    ///
    /// Shared local winds are snapshotted once and appended after each
    /// zone's own local winds. A zone whose rebuild fails reports the error
    /// and does not stop the others.
    pub fn tick(&mut self, time: f32, dt: f32) -> Vec<ZoneTickResult> {
        let shared_locals = self.shared.snapshot(dt).locals;

        let mut results = Vec::with_capacity(self.order.len());
        for id in &self.order {
            let Some(managed) = self.zones.get_mut(id) else {
                continue;
            };

            let mut snapshot = managed.sources.snapshot(dt);
            snapshot.extend_locals(&shared_locals);
            results.push((*id, managed.zone.tick(&snapshot, time, dt)));
        }

        debug!(
            "Ticked {} zones at t={:.3}s ({} shared local winds)",
            results.len(),
            time,
            shared_locals.len()
        );
        results
    }
}
