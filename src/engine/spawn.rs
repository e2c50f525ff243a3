use crate::engine::profile::ProfileKind;
use crate::engine::{archetype, identity, DynamicNpcEngine};
use crate::entities::character::{EntityId, TemplateId};
use crate::rng::RandomSource;
use crate::world::host::WorldHost;
use crate::world::room::{RoomFlag, RoomId, ZoneId};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no {0} profile is registered")]
    UnknownProfile(&'static str),
    #[error("template {0:?} is not loaded yet")]
    TemplateNotReady(TemplateId),
    #[error("host could not instantiate template {0:?}")]
    CreateFailed(TemplateId),
    #[error("entity {entity:?} could not be placed in room {room:?}")]
    PlaceFailed { entity: EntityId, room: RoomId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Login,
    ZoneEntry,
}

impl Trigger {
    fn name(self) -> &'static str {
        match self {
            Trigger::Login => "login",
            Trigger::ZoneEntry => "zone_entry",
        }
    }
}

impl<R: RandomSource> DynamicNpcEngine<R> {
    /// A player entered the world. Returns how many entities were spawned.
    pub fn on_player_login(&mut self, host: &mut dyn WorldHost, player: EntityId) -> usize {
        self.ensure_boot_cleanup(host);
        let Some(view) = host.character(player) else {
            return 0;
        };
        if view.is_npc {
            return 0;
        }
        let Some(zone) = view.room.and_then(|room| host.zone_of(room)) else {
            return 0;
        };
        self.activity.touch(zone, host.now());
        self.last_zone.insert(player, zone);
        self.spawn_wave(host, zone, Trigger::Login)
    }

    /// A player moved into `room`. Spawns only when the move crossed into a zone
    /// other than the last one recorded for that player.
    pub fn on_player_enter_zone(
        &mut self,
        host: &mut dyn WorldHost,
        player: EntityId,
        room: RoomId,
    ) -> usize {
        self.ensure_boot_cleanup(host);
        if host.character(player).map_or(true, |view| view.is_npc) {
            return 0;
        }
        let Some(zone) = host.zone_of(room) else {
            return 0;
        };
        self.activity.touch(zone, host.now());
        if self.last_zone.insert(player, zone) == Some(zone) {
            return 0;
        }
        self.spawn_wave(host, zone, Trigger::ZoneEntry)
    }

    fn spawn_wave(&mut self, host: &mut dyn WorldHost, zone: ZoneId, trigger: Trigger) -> usize {
        let rooms: Vec<_> = host
            .rooms_in_zone(zone)
            .into_iter()
            .filter_map(|room| host.room(room))
            .collect();
        let mut total = 0;
        for idx in 0..self.profiles.len() {
            let profile = &self.profiles[idx];
            let kind = profile.kind;
            let chance = match trigger {
                Trigger::Login => profile.spawn.login_chance_pct,
                Trigger::ZoneEntry => profile.spawn.zone_entry_chance_pct,
            };
            let cap = profile.spawn.cap().unwrap_or(usize::MAX);
            let eligible: Vec<RoomId> = rooms
                .iter()
                .filter(|room| profile.room_eligible(room))
                .map(|room| room.id)
                .collect();
            let hotspots: Vec<RoomId> = if profile.hotspot_override {
                rooms
                    .iter()
                    .filter(|room| room.has(RoomFlag::Socialize) && eligible.contains(&room.id))
                    .map(|room| room.id)
                    .collect()
            } else {
                Vec::new()
            };

            let targets: Vec<RoomId> = if hotspots.is_empty() {
                eligible
                    .into_iter()
                    .filter(|_| self.rng.roll_percent(chance))
                    .collect()
            } else {
                let count = self.rng.roll_range(1, 3);
                (0..count)
                    .filter_map(|_| self.rng.pick_index(hotspots.len()))
                    .filter_map(|idx| hotspots.get(idx).copied())
                    .collect()
            };

            let mut spawned = 0;
            for room in targets.into_iter().take(cap) {
                match self.spawn_in_room(host, kind, room) {
                    Ok(_) => spawned += 1,
                    Err(err @ SpawnError::TemplateNotReady(_)) => {
                        tracing::info!(
                            target: "npcgen::spawn",
                            profile = kind.name(),
                            "{}; retrying on a later trigger",
                            err
                        );
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(target: "npcgen::spawn", profile = kind.name(), "{}", err);
                    }
                }
            }
            if spawned > 0 {
                tracing::info!(
                    target: "npcgen::spawn",
                    profile = kind.name(),
                    trigger = trigger.name(),
                    zone = zone.0,
                    spawned,
                    "spawned dynamic entities"
                );
            }
            total += spawned;
        }
        total
    }

    /// Creates, places and configures one entity of `kind` in `room`.
    pub fn spawn_in_room(
        &mut self,
        host: &mut dyn WorldHost,
        kind: ProfileKind,
        room: RoomId,
    ) -> Result<EntityId, SpawnError> {
        let template = self
            .profile(kind)
            .map(|profile| profile.spawn.template)
            .ok_or(SpawnError::UnknownProfile(kind.name()))?;
        if !host.template_ready(template) {
            return Err(SpawnError::TemplateNotReady(template));
        }
        let entity = host
            .create_from_template(template)
            .ok_or(SpawnError::CreateFailed(template))?;
        if !host.place_in_room(entity, room) {
            host.remove_character(entity);
            return Err(SpawnError::PlaceFailed { entity, room });
        }
        self.lifecycle.mark_fresh(entity, kind);
        self.configure_if_fresh(host, entity);
        Ok(entity)
    }

    /// Configures an entity exactly once. Anything not in the `Fresh` phase,
    /// including entities this engine never spawned, is left alone.
    pub fn configure_if_fresh(&mut self, host: &mut dyn WorldHost, entity: EntityId) -> bool {
        if !self.lifecycle.is_fresh(entity) {
            return false;
        }
        if host.character(entity).is_none() {
            self.forget(entity);
            return false;
        }
        let Some(profile) = self
            .lifecycle
            .get(entity)
            .and_then(|record| self.profiles.iter().find(|p| p.kind == record.profile))
        else {
            return false;
        };

        let store = Arc::clone(&self.store);
        let tables = store.load();
        let tier = tables.tiers.pick(&mut self.rng);
        let archetype = self
            .rng
            .pick_index(tables.archetypes.len())
            .and_then(|idx| tables.archetypes.get(idx));

        let identity = identity::assign(host, &mut self.rng, profile, &tables.names, entity);
        for flag in profile.clear_flags {
            host.set_behavior_flag(entity, *flag, false);
        }
        for flag in profile.set_flags {
            host.set_behavior_flag(entity, *flag, true);
        }
        let class = archetype::configure(host, &mut self.rng, tables, entity, tier, archetype);

        let kind = profile.kind;
        self.lifecycle.mark_configured(entity, tier.id, class);
        tracing::info!(
            target: "npcgen::spawn",
            entity = entity.0,
            profile = kind.name(),
            name = %identity.name,
            tier = %tier.name,
            class = class.as_str(),
            archetype = archetype.map_or("none", |archetype| archetype.name.as_str()),
            "configured dynamic entity"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;
    use crate::engine::lifecycle::SpawnPhase;
    use crate::engine::profile::Profile;
    use crate::entities::character::BehaviorFlag;
    use crate::rng::EngineRng;
    use crate::world::memory::MemoryWorld;

    fn runner_only(login: u32, zone_entry: u32) -> Vec<Profile> {
        let mut runner = Profile::runner();
        runner.spawn.login_chance_pct = login;
        runner.spawn.zone_entry_chance_pct = zone_entry;
        vec![runner]
    }

    #[test]
    fn spawn_configures_once() {
        let (mut world, rooms, _) = corridor();
        let mut engine = DynamicNpcEngine::seeded(store(), 7);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        assert_eq!(engine.lifecycle().phase(npc), Some(SpawnPhase::Configured));
        let before = world.character_state(npc).expect("npc").clone();
        assert!(before.identity.has_keyword("runner"));
        assert!(before.identity.has_keyword("tier_street"));
        assert!(before.flags.contains(&BehaviorFlag::StayZone));
        assert!(!before.flags.contains(&BehaviorFlag::Sentinel));
        assert!(!before.flags.contains(&BehaviorFlag::Wimpy));

        assert!(!engine.configure_if_fresh(&mut world, npc));
        assert!(!engine.configure_if_fresh(&mut world, npc));
        let after = world.character_state(npc).expect("npc");
        assert_eq!(after.identity, before.identity);
        assert_eq!(after.cash, before.cash);
        assert_eq!(after.inventory, before.inventory);
        assert_eq!(after.skills, before.skills);
    }

    #[test]
    fn untracked_entities_are_never_configured() {
        let (mut world, rooms, _) = corridor();
        let mut engine = DynamicNpcEngine::seeded(store(), 8);
        let npc = world.add_npc("a rat", "rat", rooms[0]);
        assert!(!engine.configure_if_fresh(&mut world, npc));
        assert_eq!(
            world.character_state(npc).map(|state| state.identity.name.as_str()),
            Some("a rat")
        );
    }

    #[test]
    fn gang_spawn_turns_aggressive() {
        let (mut world, rooms, _) = corridor();
        let mut engine = DynamicNpcEngine::seeded(store(), 9);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Gang, rooms[1])
            .expect("spawn");
        let state = world.character_state(npc).expect("npc");
        assert!(state.identity.has_keyword("gangster"));
        assert!(state.flags.contains(&BehaviorFlag::Aggressive));
        assert!(!state.flags.contains(&BehaviorFlag::NoKill));
        assert_eq!(state.template, Some(GANG));
    }

    #[test]
    fn spawn_errors() {
        let mut world = MemoryWorld::new(0);
        let room = world.add_room(1, 1, "Street", "", &[]);
        let mut engine = DynamicNpcEngine::seeded(store(), 10);
        assert_eq!(
            engine.spawn_in_room(&mut world, ProfileKind::Runner, room),
            Err(SpawnError::TemplateNotReady(TEMPLATE))
        );
        templates(&mut world);
        let missing = RoomId(404);
        assert!(matches!(
            engine.spawn_in_room(&mut world, ProfileKind::Runner, missing),
            Err(SpawnError::PlaceFailed { .. })
        ));
        assert!(engine.lifecycle().is_empty());
        assert_eq!(world.removed().len(), 1);

        let mut lonely = DynamicNpcEngine::new(store(), runner_only(8, 5), EngineRng::from_seed(1));
        assert_eq!(
            lonely.spawn_in_room(&mut world, ProfileKind::Gang, room),
            Err(SpawnError::UnknownProfile("gang"))
        );
    }

    #[test]
    fn template_not_ready_skips_the_trigger() {
        let mut world = MemoryWorld::new(0);
        let room = world.add_room(1, 1, "Street", "", &[]);
        let player = world.add_player("Kira", room);
        let mut engine = DynamicNpcEngine::new(store(), runner_only(100, 100), EngineRng::from_seed(2));
        assert_eq!(engine.on_player_login(&mut world, player), 0);
        templates(&mut world);
        assert_eq!(engine.on_player_login(&mut world, player), 1);
    }

    #[test]
    fn login_rolls_are_independent_per_room() {
        let mut world = MemoryWorld::new(0);
        templates(&mut world);
        let rooms: Vec<RoomId> = (1..=5)
            .map(|id| world.add_room(id, 1, "Street", "", &[]))
            .collect();
        let player = world.add_player("Kira", rooms[0]);
        let mut engine =
            DynamicNpcEngine::new(store(), runner_only(20, 0), EngineRng::from_seed(77));
        let trials = 2_000;
        let mut empty = 0;
        let mut total = 0;
        for _ in 0..trials {
            let spawned = engine.on_player_login(&mut world, player);
            total += spawned;
            if spawned == 0 {
                empty += 1;
            }
        }
        let expected_empty = 0.8f64.powi(5);
        let observed = empty as f64 / trials as f64;
        assert!((observed - expected_empty).abs() < 0.04, "observed {}", observed);
        let mean = total as f64 / trials as f64;
        assert!((mean - 1.0).abs() < 0.1, "mean {}", mean);
    }

    #[test]
    fn spawn_cap_limits_each_trigger() {
        let mut world = MemoryWorld::new(0);
        templates(&mut world);
        let rooms: Vec<RoomId> = (1..=6)
            .map(|id| world.add_room(id, 1, "Street", "", &[]))
            .collect();
        let player = world.add_player("Kira", rooms[0]);
        let mut profiles = runner_only(100, 100);
        profiles[0].spawn.max_spawns_per_trigger = 2;
        let mut engine = DynamicNpcEngine::new(store(), profiles, EngineRng::from_seed(3));
        assert_eq!(engine.on_player_login(&mut world, player), 2);
    }

    #[test]
    fn login_prefers_socialize_hotspots() {
        let mut world = MemoryWorld::new(0);
        templates(&mut world);
        let street = world.add_room(1, 1, "Street", "", &[]);
        let club = world.add_room(2, 1, "Club", "", &[RoomFlag::Socialize]);
        let closed = world.add_room(3, 1, "Back Room", "", &[RoomFlag::Socialize, RoomFlag::NoMob]);
        let player = world.add_player("Kira", street);
        let mut engine = DynamicNpcEngine::new(store(), runner_only(0, 0), EngineRng::from_seed(4));
        for _ in 0..20 {
            let spawned = engine.on_player_login(&mut world, player);
            assert!((1..=3).contains(&spawned), "spawned {}", spawned);
        }
        for (id, _) in engine.lifecycle().configured() {
            assert_eq!(world.character(id).and_then(|view| view.room), Some(club));
        }
        assert!(world.occupants(closed).is_empty());
    }

    #[test]
    fn zone_entry_fires_only_on_zone_change() {
        let (mut world, rooms, plaza) = corridor();
        let player = world.add_player("Kira", rooms[0]);
        let mut engine =
            DynamicNpcEngine::new(store(), runner_only(0, 100), EngineRng::from_seed(5));
        assert_eq!(engine.on_player_login(&mut world, player), 0);
        assert_eq!(engine.on_player_enter_zone(&mut world, player, rooms[1]), 0);
        world.move_character(player, plaza);
        assert_eq!(engine.on_player_enter_zone(&mut world, player, plaza), 1);
        assert_eq!(engine.on_player_enter_zone(&mut world, player, plaza), 0);
        world.move_character(player, rooms[2]);
        assert_eq!(engine.on_player_enter_zone(&mut world, player, rooms[2]), 3);
        let zone = world.zone_of(rooms[2]).expect("zone");
        assert_eq!(engine.activity().last_active(zone), Some(world.now()));
    }

    #[test]
    fn npcs_do_not_trigger_spawns() {
        let (mut world, rooms, _) = corridor();
        let rat = world.add_npc("a rat", "rat", rooms[0]);
        let mut engine =
            DynamicNpcEngine::new(store(), runner_only(100, 100), EngineRng::from_seed(6));
        assert_eq!(engine.on_player_login(&mut world, rat), 0);
        assert_eq!(engine.on_player_enter_zone(&mut world, rat, rooms[1]), 0);
        assert!(engine.activity().is_empty());
    }
}
