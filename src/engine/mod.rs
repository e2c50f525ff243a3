//! Dynamic NPC lifecycle: spawning on player triggers, one-shot configuration,
//! per-tick behavior and eviction from abandoned zones.

pub mod activity;
pub mod ai;
pub mod archetype;
pub mod eviction;
pub mod identity;
pub mod lifecycle;
pub mod profile;
pub mod social;
pub mod spawn;

use crate::engine::activity::ZoneActivity;
use crate::engine::ai::AiState;
use crate::engine::lifecycle::{LifecycleTracker, SpawnPhase};
use crate::engine::profile::{Profile, ProfileKind};
use crate::entities::character::EntityId;
use crate::rng::{EngineRng, RandomSource};
use crate::tables::TableStore;
use crate::world::host::WorldHost;
use crate::world::room::ZoneId;
use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;

pub use crate::engine::spawn::SpawnError;

/// Upper bound on per-entity AI and reply-cooldown entries kept at once.
pub const STATE_CAPACITY: usize = 4096;

/// What one maintenance tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub configured: usize,
    pub actions: usize,
    pub evicted: usize,
    pub reaped: usize,
}

/// Owns every piece of mutable engine state. A multi-threaded host wraps the
/// whole engine in one lock.
pub struct DynamicNpcEngine<R: RandomSource = EngineRng> {
    store: Arc<TableStore>,
    profiles: Vec<Profile>,
    rng: R,
    lifecycle: LifecycleTracker,
    activity: ZoneActivity,
    ai: LruCache<EntityId, AiState>,
    reply_cooldowns: LruCache<EntityId, u64>,
    last_zone: HashMap<EntityId, ZoneId>,
    boot_cleanup_done: bool,
}

impl<R: RandomSource> DynamicNpcEngine<R> {
    pub fn new(store: Arc<TableStore>, profiles: Vec<Profile>, rng: R) -> Self {
        let capacity = NonZeroUsize::new(STATE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            profiles,
            rng,
            lifecycle: LifecycleTracker::default(),
            activity: ZoneActivity::default(),
            ai: LruCache::new(capacity),
            reply_cooldowns: LruCache::new(capacity),
            last_zone: HashMap::new(),
            boot_cleanup_done: false,
        }
    }

    /// Runner and gang profiles, with spawn overrides from the store's tables.
    pub fn with_default_profiles(store: Arc<TableStore>, rng: R) -> Self {
        let profiles = Profile::defaults(store.load());
        Self::new(store, profiles, rng)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, kind: ProfileKind) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.kind == kind)
    }

    pub fn lifecycle(&self) -> &LifecycleTracker {
        &self.lifecycle
    }

    pub fn activity(&self) -> &ZoneActivity {
        &self.activity
    }

    pub fn ai_state(&self, id: EntityId) -> Option<AiState> {
        self.ai.peek(&id).copied()
    }

    /// Spawned by this engine, or a leftover NPC matching one of its profiles.
    pub fn is_dynamic_entity(&self, host: &dyn WorldHost, id: EntityId) -> bool {
        if self.lifecycle.contains(id) {
            return true;
        }
        host.character(id).is_some_and(|view| {
            view.is_npc
                && self
                    .profiles
                    .iter()
                    .any(|profile| profile.matches_leftover(&view.keywords, view.template))
        })
    }

    pub fn run_maintenance_tick(&mut self, host: &mut dyn WorldHost) -> TickOutcome {
        self.ensure_boot_cleanup(host);
        let now = host.now();
        let occupied = zones_with_players(host);
        for zone in &occupied {
            self.activity.touch(*zone, now);
        }

        let reaped = self.reap_vanished(host);
        let fresh: Vec<EntityId> = self
            .lifecycle
            .ids()
            .into_iter()
            .filter(|id| self.lifecycle.phase(*id) == Some(SpawnPhase::Fresh))
            .collect();
        let mut configured = 0;
        for id in fresh {
            if self.configure_if_fresh(host, id) {
                configured += 1;
            }
        }
        let actions = self.run_ai(host, now);
        let evicted = self.sweep_idle_zones(host, now, &occupied);

        let outcome = TickOutcome {
            configured,
            actions,
            evicted,
            reaped,
        };
        tracing::debug!(
            target: "npcgen::engine",
            now,
            live = self.lifecycle.len(),
            actions,
            evicted,
            reaped,
            "maintenance tick"
        );
        outcome
    }

    /// Drops records of entities the host no longer knows about.
    fn reap_vanished(&mut self, host: &dyn WorldHost) -> usize {
        let gone: Vec<EntityId> = self
            .lifecycle
            .ids()
            .into_iter()
            .filter(|id| host.character(*id).is_none())
            .collect();
        for id in &gone {
            self.forget(*id);
        }
        gone.len()
    }

    fn forget(&mut self, id: EntityId) {
        self.lifecycle.forget(id);
        self.ai.pop(&id);
        self.reply_cooldowns.pop(&id);
    }
}

impl DynamicNpcEngine<EngineRng> {
    pub fn seeded(store: Arc<TableStore>, seed: u64) -> Self {
        Self::with_default_profiles(store, EngineRng::from_seed(seed))
    }
}

/// Zones holding at least one player character.
pub fn zones_with_players(host: &dyn WorldHost) -> HashSet<ZoneId> {
    host.characters()
        .into_iter()
        .filter_map(|id| host.character(id))
        .filter(|view| !view.is_npc)
        .filter_map(|view| view.room)
        .filter_map(|room| host.zone_of(room))
        .collect()
}

fn roll_secs(rng: &mut dyn RandomSource, min: i64, max: i64) -> u64 {
    rng.roll_range(min, max).max(0).unsigned_abs()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::engine::profile::ProfileKind;
    use crate::rng::EngineRng;
    use crate::world::memory::MemoryWorld;
    use crate::world::room::RoomFlag;

    #[test]
    fn dynamic_entities_include_leftovers() {
        let (mut world, rooms, _) = corridor();
        let mut engine = DynamicNpcEngine::seeded(store(), 1);
        let spawned = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        let leftover = world.add_npc("Old Rex", "Old Rex adventurer runner", rooms[1]);
        let rat = world.add_npc("a rat", "rat", rooms[1]);
        let player = world.add_player("Kira", rooms[2]);
        assert!(engine.is_dynamic_entity(&world, spawned));
        assert!(engine.is_dynamic_entity(&world, leftover));
        assert!(!engine.is_dynamic_entity(&world, rat));
        assert!(!engine.is_dynamic_entity(&world, player));
    }

    #[test]
    fn tick_reaps_entities_removed_by_the_host() {
        let (mut world, rooms, _) = corridor();
        let mut engine = DynamicNpcEngine::seeded(store(), 2);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        world.remove_character(npc);
        let outcome = engine.run_maintenance_tick(&mut world);
        assert_eq!(outcome.reaped, 1);
        assert!(engine.lifecycle().is_empty());
        assert!(engine.ai_state(npc).is_none());
    }

    #[test]
    fn tick_stamps_zones_with_players() {
        let (mut world, rooms, plaza) = corridor();
        world.add_player("Kira", rooms[1]);
        let mut engine: DynamicNpcEngine = DynamicNpcEngine::with_default_profiles(
            store(),
            EngineRng::from_seed(3),
        );
        engine.run_maintenance_tick(&mut world);
        let zone = world.zone_of(rooms[0]).expect("zone");
        assert_eq!(engine.activity().last_active(zone), Some(world.now()));
        let empty = world.zone_of(plaza).expect("zone");
        assert_eq!(engine.activity().last_active(empty), None);
        assert!(zones_with_players(&world).contains(&zone));
    }

    #[test]
    fn empty_world_ticks_quietly() {
        let mut world = MemoryWorld::new(0);
        world.add_room(1, 1, "Room", "", &[RoomFlag::NoMob]);
        let mut engine = DynamicNpcEngine::seeded(store(), 4);
        assert_eq!(engine.run_maintenance_tick(&mut world), TickOutcome::default());
    }
}
