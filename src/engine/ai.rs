use crate::engine::profile::ProfileKind;
use crate::engine::{roll_secs, DynamicNpcEngine};
use crate::entities::character::EntityId;
use crate::rng::RandomSource;
use crate::world::host::{Action, CharacterView, WorldHost};
use crate::world::room::RoomId;

/// Per-entity scheduling for the tick loop. `None` means "not scheduled yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiState {
    pub next_idle_at: Option<u64>,
    pub next_seek_at: Option<u64>,
    pub target_room: Option<RoomId>,
}

const IDLE_MIN_SECS: i64 = 120;
const IDLE_MAX_SECS: i64 = 600;
const SEEK_MIN_SECS: i64 = 20;
const SEEK_MAX_SECS: i64 = 40;

#[derive(Debug, Clone, Copy)]
enum Idle {
    Say(&'static str),
    Emote(&'static str),
}

const IDLE_LINES: [Idle; 25] = [
    Idle::Emote("reshuffles their inventory."),
    Idle::Emote("checks their commlink."),
    Idle::Emote("rolls their shoulders and scans the area."),
    Idle::Emote("adjusts their gear straps."),
    Idle::Say("Keep your head on a swivel."),
    Idle::Emote("taps a foot impatiently."),
    Idle::Emote("studies the exits, counting them off under their breath."),
    Idle::Emote("cracks their knuckles one by one."),
    Idle::Emote("wipes a speck of dust from a lens and peers around."),
    Idle::Emote("loosens and retightens the straps of a backpack."),
    Idle::Emote("kneels to tighten a boot lace, then stands."),
    Idle::Emote("flips a credstick in their hand, catching it idly."),
    Idle::Emote("checks the edge on a blade, satisfied."),
    Idle::Emote("thumbs through a small paper map, then folds it away."),
    Idle::Emote("listens intently, head tilted, as if catching distant noise."),
    Idle::Emote("stretches their neck until it pops softly."),
    Idle::Say("This place never sits still, does it?"),
    Idle::Emote("pats down pockets, doing a quick gear check."),
    Idle::Emote("wipes grime from a weapon housing with a cloth."),
    Idle::Emote("looks over recent footprints in the dust."),
    Idle::Emote("marks a note on a small pad and tucks it away."),
    Idle::Emote("breathes slowly, centering themselves."),
    Idle::Emote("glances at the sky to judge the time."),
    Idle::Emote("slides a magazine out, checks it, and seats it again."),
    Idle::Emote("idly traces warding symbols in the air, then stops."),
];

fn idle_action(rng: &mut dyn RandomSource) -> Option<Action> {
    let line = IDLE_LINES.get(rng.pick_index(IDLE_LINES.len())?)?;
    Some(match line {
        Idle::Say(text) => Action::Say(text.to_string()),
        Idle::Emote(text) => Action::Emote(text.to_string()),
    })
}

impl<R: RandomSource> DynamicNpcEngine<R> {
    /// One pass over every configured entity. Returns the number of actions taken.
    pub(crate) fn run_ai(&mut self, host: &mut dyn WorldHost, now: u64) -> usize {
        let live: Vec<(EntityId, ProfileKind)> = self
            .lifecycle
            .configured()
            .map(|(id, record)| (id, record.profile))
            .collect();
        let mut acted = 0;
        for (id, kind) in live {
            let Some(view) = host.character(id) else {
                continue;
            };
            if !view.awake || view.being_removed {
                continue;
            }
            let Some(room) = view.room else {
                continue;
            };
            let Some((idles, hunts)) = self
                .profile(kind)
                .map(|profile| (profile.idles, profile.hunts))
            else {
                continue;
            };

            let mut state = self.ai.get(&id).copied().unwrap_or_default();
            if idles && self.idle(host, id, &mut state, now) {
                acted += 1;
            }
            if hunts
                && view.fighting.is_none()
                && !view.in_vehicle
                && self.hunt(host, &view, room, &mut state, now)
            {
                acted += 1;
            }
            if let Some(view) = host.character(id) {
                if view.fighting.is_some() && !view.wielding {
                    host.perform(id, Action::Draw);
                    acted += 1;
                }
            }
            self.ai.put(id, state);
        }
        acted
    }

    fn idle(&mut self, host: &mut dyn WorldHost, id: EntityId, state: &mut AiState, now: u64) -> bool {
        let Some(due) = state.next_idle_at else {
            state.next_idle_at = Some(now + roll_secs(&mut self.rng, IDLE_MIN_SECS, IDLE_MAX_SECS));
            return false;
        };
        if now < due {
            return false;
        }
        state.next_idle_at = Some(now + roll_secs(&mut self.rng, IDLE_MIN_SECS, IDLE_MAX_SECS));
        match idle_action(&mut self.rng) {
            Some(action) => {
                host.perform(id, action);
                true
            }
            None => false,
        }
    }

    /// Re-targets once per seek window, then engages a co-located hostile or
    /// steps toward the target room.
    fn hunt(
        &mut self,
        host: &mut dyn WorldHost,
        view: &CharacterView,
        room: RoomId,
        state: &mut AiState,
        now: u64,
    ) -> bool {
        if state.next_seek_at.map_or(true, |at| now >= at) {
            state.next_seek_at = Some(now + roll_secs(&mut self.rng, SEEK_MIN_SECS, SEEK_MAX_SECS));
            state.target_room = self.find_target(host, view.id, room);
        }
        let Some(target) = state.target_room else {
            return false;
        };

        let foe = host
            .occupants(room)
            .into_iter()
            .filter(|other| *other != view.id)
            .find(|other| self.is_hostile(host, *other));
        if let Some(foe) = foe {
            host.stop_fighting(view.id);
            host.start_fighting(view.id, foe);
            tracing::debug!(target: "npcgen::ai", entity = view.id.0, foe = foe.0, "engaging");
            return true;
        }

        match host.next_step(room, target, view.id) {
            Some(direction) => {
                host.perform(view.id, Action::Move(direction));
                true
            }
            None => {
                state.target_room = None;
                false
            }
        }
    }

    /// Room of the first hostile NPC in the hunter's zone that it can reach.
    fn find_target(&self, host: &dyn WorldHost, hunter: EntityId, room: RoomId) -> Option<RoomId> {
        let zone = host.zone_of(room)?;
        host.characters()
            .into_iter()
            .filter(|id| *id != hunter && self.is_hostile(host, *id))
            .filter_map(|id| host.character(id)?.room)
            .filter(|other| host.zone_of(*other) == Some(zone))
            .find(|other| *other == room || host.next_step(room, *other, hunter).is_some())
    }

    /// Aggressive NPCs and live entities of an aggressive profile.
    pub(crate) fn is_hostile(&self, host: &dyn WorldHost, id: EntityId) -> bool {
        let Some(view) = host.character(id) else {
            return false;
        };
        if !view.is_npc || view.being_removed {
            return false;
        }
        view.aggressive
            || self
                .lifecycle
                .get(id)
                .and_then(|record| self.profile(record.profile))
                .is_some_and(|profile| profile.is_hostile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;
    use crate::engine::profile::Profile;
    use crate::entities::character::BehaviorFlag;
    use crate::rng::EngineRng;
    use crate::world::memory::MemoryWorld;
    use crate::world::room::Direction;

    fn moves(world: &MemoryWorld, id: EntityId) -> usize {
        world
            .actions_of(id)
            .filter(|action| matches!(action, Action::Move(_)))
            .count()
    }

    fn runner_engine(seed: u64) -> DynamicNpcEngine {
        DynamicNpcEngine::new(store(), vec![Profile::runner(), Profile::gang()], EngineRng::from_seed(seed))
    }

    #[test]
    fn idle_is_scheduled_then_performed() {
        let (mut world, rooms, _) = corridor();
        let mut engine = runner_engine(1);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        world.clear_actions();
        engine.run_maintenance_tick(&mut world);
        let due = engine
            .ai_state(npc)
            .and_then(|state| state.next_idle_at)
            .expect("scheduled");
        let start = world.now();
        assert!((start + 120..=start + 600).contains(&due));
        assert_eq!(world.actions_of(npc).count(), 0);

        world.set_now(due);
        engine.run_maintenance_tick(&mut world);
        let idles = world
            .actions_of(npc)
            .filter(|action| matches!(action, Action::Say(_) | Action::Emote(_)))
            .count();
        assert_eq!(idles, 1);
        let next = engine
            .ai_state(npc)
            .and_then(|state| state.next_idle_at)
            .expect("rescheduled");
        assert!(next >= due + 120);
    }

    #[test]
    fn hunter_walks_to_hostile_and_engages() {
        let (mut world, rooms, _) = corridor();
        let mut engine = runner_engine(2);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        let foe = world.add_npc("a ganger", "ganger", rooms[2]);
        world.set_behavior_flag(foe, BehaviorFlag::Aggressive, true);

        engine.run_maintenance_tick(&mut world);
        assert_eq!(engine.ai_state(npc).and_then(|state| state.target_room), Some(rooms[2]));
        assert_eq!(world.character(npc).and_then(|view| view.room), Some(rooms[1]));
        engine.run_maintenance_tick(&mut world);
        assert_eq!(world.character(npc).and_then(|view| view.room), Some(rooms[2]));
        engine.run_maintenance_tick(&mut world);
        assert_eq!(world.character(npc).and_then(|view| view.fighting), Some(foe));

        // fighting with nothing wielded draws
        world.clear_actions();
        engine.run_maintenance_tick(&mut world);
        assert!(world.actions_of(npc).any(|action| *action == Action::Draw));
    }

    #[test]
    fn gang_entities_count_as_hostile() {
        let (mut world, rooms, _) = corridor();
        let mut engine = runner_engine(3);
        let runner = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("runner");
        let gang = engine
            .spawn_in_room(&mut world, ProfileKind::Gang, rooms[1])
            .expect("gang");
        assert!(engine.is_hostile(&world, gang));
        assert!(!engine.is_hostile(&world, runner));
        engine.run_maintenance_tick(&mut world);
        assert_eq!(engine.ai_state(runner).and_then(|state| state.target_room), Some(rooms[1]));
        // gang entities neither idle nor hunt
        assert_eq!(moves(&world, gang), 0);
    }

    #[test]
    fn unreachable_target_is_dropped_until_next_window() {
        let (mut world, rooms, _) = corridor();
        let mut engine = runner_engine(4);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        let foe = world.add_npc("a ganger", "ganger", rooms[2]);
        world.set_behavior_flag(foe, BehaviorFlag::Aggressive, true);

        engine.run_maintenance_tick(&mut world);
        assert_eq!(moves(&world, npc), 1);
        let window = engine
            .ai_state(npc)
            .and_then(|state| state.next_seek_at)
            .expect("seek window");

        world.unlink(rooms[1], Direction::East);
        world.advance(1);
        engine.run_maintenance_tick(&mut world);
        assert_eq!(engine.ai_state(npc).and_then(|state| state.target_room), None);
        assert_eq!(moves(&world, npc), 1);

        world.link(rooms[1], Direction::East, rooms[2]);
        world.advance(1);
        engine.run_maintenance_tick(&mut world);
        assert_eq!(moves(&world, npc), 1, "retried inside the seek window");

        world.set_now(window);
        engine.run_maintenance_tick(&mut world);
        assert_eq!(moves(&world, npc), 2);
        assert_eq!(world.character(npc).and_then(|view| view.room), Some(rooms[2]));
    }

    #[test]
    fn targets_outside_the_zone_are_ignored() {
        let (mut world, rooms, plaza) = corridor();
        let mut engine = runner_engine(5);
        let npc = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[2])
            .expect("spawn");
        let foe = world.add_npc("a ganger", "ganger", plaza);
        world.set_behavior_flag(foe, BehaviorFlag::Aggressive, true);
        engine.run_maintenance_tick(&mut world);
        assert_eq!(engine.ai_state(npc).and_then(|state| state.target_room), None);
        assert_eq!(moves(&world, npc), 0);
    }

    #[test]
    fn sleeping_and_mounted_entities_stay_put() {
        let (mut world, rooms, _) = corridor();
        let mut engine = runner_engine(6);
        let sleeper = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        let driver = engine
            .spawn_in_room(&mut world, ProfileKind::Runner, rooms[0])
            .expect("spawn");
        let foe = world.add_npc("a ganger", "ganger", rooms[2]);
        world.set_behavior_flag(foe, BehaviorFlag::Aggressive, true);
        if let Some(state) = world.character_state_mut(sleeper) {
            state.awake = false;
        }
        if let Some(state) = world.character_state_mut(driver) {
            state.in_vehicle = true;
        }
        engine.run_maintenance_tick(&mut world);
        assert_eq!(moves(&world, sleeper), 0);
        assert_eq!(moves(&world, driver), 0);
        assert!(engine.ai_state(sleeper).is_none());
    }
}
