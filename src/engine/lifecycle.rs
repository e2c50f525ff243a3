use crate::engine::profile::ProfileKind;
use crate::entities::character::EntityId;
use crate::tables::archetypes::ClassTag;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPhase {
    /// Created and placed, not yet configured.
    Fresh,
    Configured,
}

/// What the engine remembers about an entity it spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub profile: ProfileKind,
    pub phase: SpawnPhase,
    pub tier: Option<i32>,
    pub class: Option<ClassTag>,
}

impl SpawnRecord {
    pub fn fresh(profile: ProfileKind) -> Self {
        Self {
            profile,
            phase: SpawnPhase::Fresh,
            tier: None,
            class: None,
        }
    }
}

/// Side records for every live dynamic entity, keyed by entity id.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    records: BTreeMap<EntityId, SpawnRecord>,
}

impl LifecycleTracker {
    pub fn mark_fresh(&mut self, id: EntityId, profile: ProfileKind) {
        self.records.insert(id, SpawnRecord::fresh(profile));
    }

    /// Moves a fresh record to `Configured`. Returns `false` for anything else.
    pub fn mark_configured(&mut self, id: EntityId, tier: i32, class: ClassTag) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.phase == SpawnPhase::Fresh => {
                record.phase = SpawnPhase::Configured;
                record.tier = Some(tier);
                record.class = Some(class);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&SpawnRecord> {
        self.records.get(&id)
    }

    pub fn is_fresh(&self, id: EntityId) -> bool {
        self.phase(id) == Some(SpawnPhase::Fresh)
    }

    pub fn phase(&self, id: EntityId) -> Option<SpawnPhase> {
        self.records.get(&id).map(|record| record.phase)
    }

    pub fn forget(&mut self, id: EntityId) -> Option<SpawnRecord> {
        self.records.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.records.keys().copied().collect()
    }

    pub fn configured(&self) -> impl Iterator<Item = (EntityId, &SpawnRecord)> {
        self.records
            .iter()
            .filter(|(_, record)| record.phase == SpawnPhase::Configured)
            .map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
