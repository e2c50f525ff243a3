use crate::entities::attributes::Attribute;
use crate::entities::character::{
    has_keyword, BehaviorFlag, EntityId, Identity, PowerGrant, SpellGrant, TemplateId, WearSlot,
};
use crate::entities::item::{ItemId, ItemTypeId};
use crate::entities::skills::SkillId;
use crate::world::host::{Action, CharacterView, WorldHost};
use crate::world::room::{Direction, RoomFlag, RoomId, RoomInfo, ZoneId};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct CharacterTemplate {
    pub name: String,
    pub skills: Vec<(SkillId, i32)>,
    pub attributes: [i32; 6],
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCharacter {
    pub identity: Identity,
    pub is_npc: bool,
    pub room: Option<RoomId>,
    pub awake: bool,
    pub hidden: bool,
    pub fighting: Option<EntityId>,
    pub in_vehicle: bool,
    pub flags: HashSet<BehaviorFlag>,
    pub template: Option<TemplateId>,
    pub skills: BTreeMap<SkillId, i32>,
    pub attributes: [i32; 6],
    pub spells: Vec<SpellGrant>,
    pub powers: Vec<PowerGrant>,
    pub cash: i64,
    pub equipment: BTreeMap<WearSlot, ItemId>,
    pub inventory: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryItem {
    pub item_type: ItemTypeId,
    pub value: i64,
    pub attached: Vec<ItemId>,
}

/// What a character still held at the moment it was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedCharacter {
    pub id: EntityId,
    pub name: String,
    pub equipped: usize,
    pub carried: usize,
}

#[derive(Debug, Clone)]
struct MemoryRoom {
    info: RoomInfo,
    exits: BTreeMap<Direction, RoomId>,
}

/// In-process world graph implementing [`WorldHost`].
///
/// Pathfinding is a breadth-first search that never leaves the zone of the
/// starting room. Every performed action is appended to an action log.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    now: u64,
    rooms: BTreeMap<RoomId, MemoryRoom>,
    characters: BTreeMap<EntityId, MemoryCharacter>,
    templates: HashMap<TemplateId, CharacterTemplate>,
    items: BTreeMap<ItemId, MemoryItem>,
    next_entity: u32,
    next_item: u32,
    actions: Vec<(EntityId, Action)>,
    removed: Vec<RemovedCharacter>,
}

impl MemoryWorld {
    pub fn new(now: u64) -> Self {
        Self {
            now,
            next_entity: 1,
            next_item: 1,
            ..Self::default()
        }
    }

    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    pub fn advance(&mut self, secs: u64) -> u64 {
        self.now = self.now.saturating_add(secs);
        self.now
    }

    pub fn add_room(
        &mut self,
        id: i64,
        zone: i32,
        name: &str,
        description: &str,
        flags: &[RoomFlag],
    ) -> RoomId {
        let room = RoomId(id);
        self.rooms.insert(
            room,
            MemoryRoom {
                info: RoomInfo {
                    id: room,
                    zone: ZoneId(zone),
                    name: name.to_string(),
                    description: description.to_string(),
                    flags: flags.to_vec(),
                },
                exits: BTreeMap::new(),
            },
        );
        room
    }

    /// Two-way exit.
    pub fn link(&mut self, from: RoomId, direction: Direction, to: RoomId) {
        if let Some(room) = self.rooms.get_mut(&from) {
            room.exits.insert(direction, to);
        }
        if let Some(room) = self.rooms.get_mut(&to) {
            room.exits.insert(direction.opposite(), from);
        }
    }

    pub fn unlink(&mut self, from: RoomId, direction: Direction) {
        let to = self
            .rooms
            .get_mut(&from)
            .and_then(|room| room.exits.remove(&direction));
        if let Some(to) = to {
            if let Some(room) = self.rooms.get_mut(&to) {
                if room.exits.get(&direction.opposite()) == Some(&from) {
                    room.exits.remove(&direction.opposite());
                }
            }
        }
    }

    pub fn add_template(&mut self, id: TemplateId, template: CharacterTemplate) {
        self.templates.insert(id, template);
    }

    pub fn add_player(&mut self, name: &str, room: RoomId) -> EntityId {
        self.insert_character(MemoryCharacter {
            identity: Identity {
                name: name.to_string(),
                keywords: name.to_ascii_lowercase(),
                ..Identity::default()
            },
            is_npc: false,
            room: Some(room),
            awake: true,
            attributes: [3; 6],
            ..MemoryCharacter::default()
        })
    }

    pub fn add_npc(&mut self, name: &str, keywords: &str, room: RoomId) -> EntityId {
        self.insert_character(MemoryCharacter {
            identity: Identity {
                name: name.to_string(),
                keywords: keywords.to_string(),
                ..Identity::default()
            },
            is_npc: true,
            room: Some(room),
            awake: true,
            attributes: [3; 6],
            ..MemoryCharacter::default()
        })
    }

    pub fn insert_character(&mut self, character: MemoryCharacter) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.characters.insert(id, character);
        id
    }

    pub fn character_state(&self, id: EntityId) -> Option<&MemoryCharacter> {
        self.characters.get(&id)
    }

    pub fn character_state_mut(&mut self, id: EntityId) -> Option<&mut MemoryCharacter> {
        self.characters.get_mut(&id)
    }

    pub fn move_character(&mut self, id: EntityId, room: RoomId) {
        if !self.rooms.contains_key(&room) {
            return;
        }
        if let Some(character) = self.characters.get_mut(&id) {
            character.room = Some(room);
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&MemoryItem> {
        self.items.get(&id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn actions(&self) -> &[(EntityId, Action)] {
        &self.actions
    }

    pub fn actions_of(&self, id: EntityId) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |(actor, _)| *actor == id)
            .map(|(_, action)| action)
    }

    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }

    pub fn removed(&self) -> &[RemovedCharacter] {
        &self.removed
    }

    pub fn npcs_with_keyword(&self, keyword: &str) -> Vec<EntityId> {
        self.characters
            .iter()
            .filter(|(_, character)| {
                character.is_npc && has_keyword(&character.identity.keywords, keyword)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn exits_of(&self, room: RoomId) -> impl Iterator<Item = (Direction, RoomId)> + '_ {
        self.rooms
            .get(&room)
            .into_iter()
            .flat_map(|room| room.exits.iter().map(|(dir, to)| (*dir, *to)))
    }

    fn destroy_item_tree(&mut self, item: ItemId) {
        let mut pending = vec![item];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.items.remove(&next) {
                pending.extend(removed.attached);
            }
        }
    }
}

impl WorldHost for MemoryWorld {
    fn now(&self) -> u64 {
        self.now
    }

    fn room(&self, room: RoomId) -> Option<RoomInfo> {
        self.rooms.get(&room).map(|room| room.info.clone())
    }

    fn rooms_in_zone(&self, zone: ZoneId) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.info.zone == zone)
            .map(|room| room.info.id)
            .collect()
    }

    fn occupants(&self, room: RoomId) -> Vec<EntityId> {
        self.characters
            .iter()
            .filter(|(_, character)| character.room == Some(room))
            .map(|(id, _)| *id)
            .collect()
    }

    fn characters(&self) -> Vec<EntityId> {
        self.characters.keys().copied().collect()
    }

    fn character(&self, id: EntityId) -> Option<CharacterView> {
        let character = self.characters.get(&id)?;
        Some(CharacterView {
            id,
            name: character.identity.name.clone(),
            is_npc: character.is_npc,
            room: character.room,
            awake: character.awake,
            fighting: character.fighting,
            in_vehicle: character.in_vehicle,
            wielding: character.equipment.contains_key(&WearSlot::Wield),
            aggressive: character.flags.contains(&BehaviorFlag::Aggressive),
            keywords: character.identity.keywords.clone(),
            template: character.template,
            being_removed: false,
        })
    }

    fn can_see(&self, viewer: EntityId, target: EntityId) -> bool {
        let Some(viewer) = self.characters.get(&viewer) else {
            return false;
        };
        let Some(target) = self.characters.get(&target) else {
            return false;
        };
        viewer.awake && !target.hidden
    }

    fn next_step(&self, from: RoomId, to: RoomId, _mover: EntityId) -> Option<Direction> {
        if from == to {
            return None;
        }
        let zone = self.rooms.get(&from)?.info.zone;
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::new();
        for (dir, next) in self.exits_of(from) {
            if visited.insert(next) {
                queue.push_back((next, dir));
            }
        }
        while let Some((room, first)) = queue.pop_front() {
            let Some(info) = self.rooms.get(&room).map(|room| &room.info) else {
                continue;
            };
            if info.zone != zone {
                continue;
            }
            if room == to {
                return Some(first);
            }
            for (_, next) in self.exits_of(room) {
                if visited.insert(next) {
                    queue.push_back((next, first));
                }
            }
        }
        None
    }

    fn template_ready(&self, template: TemplateId) -> bool {
        self.templates.contains_key(&template)
    }

    fn create_from_template(&mut self, template: TemplateId) -> Option<EntityId> {
        let proto = self.templates.get(&template)?.clone();
        Some(self.insert_character(MemoryCharacter {
            identity: Identity {
                name: proto.name.clone(),
                keywords: proto.name.to_ascii_lowercase(),
                ..Identity::default()
            },
            is_npc: true,
            awake: true,
            flags: HashSet::from([BehaviorFlag::Sentinel, BehaviorFlag::Wimpy]),
            template: Some(template),
            skills: proto.skills.iter().copied().collect(),
            attributes: proto.attributes,
            ..MemoryCharacter::default()
        }))
    }

    fn place_in_room(&mut self, id: EntityId, room: RoomId) -> bool {
        if !self.rooms.contains_key(&room) {
            return false;
        }
        match self.characters.get_mut(&id) {
            Some(character) => {
                character.room = Some(room);
                true
            }
            None => false,
        }
    }

    fn remove_character(&mut self, id: EntityId) {
        let Some(character) = self.characters.remove(&id) else {
            return;
        };
        for other in self.characters.values_mut() {
            if other.fighting == Some(id) {
                other.fighting = None;
            }
        }
        self.removed.push(RemovedCharacter {
            id,
            name: character.identity.name,
            equipped: character.equipment.len(),
            carried: character.inventory.len(),
        });
    }

    fn set_identity(&mut self, id: EntityId, identity: &Identity) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.identity = identity.clone();
        }
    }

    fn add_keyword(&mut self, id: EntityId, keyword: &str) {
        let Some(character) = self.characters.get_mut(&id) else {
            return;
        };
        if has_keyword(&character.identity.keywords, keyword) {
            return;
        }
        if !character.identity.keywords.is_empty() {
            character.identity.keywords.push(' ');
        }
        character.identity.keywords.push_str(keyword);
    }

    fn set_behavior_flag(&mut self, id: EntityId, flag: BehaviorFlag, enabled: bool) {
        if let Some(character) = self.characters.get_mut(&id) {
            if enabled {
                character.flags.insert(flag);
            } else {
                character.flags.remove(&flag);
            }
        }
    }

    fn skills(&self, id: EntityId) -> Vec<(SkillId, i32)> {
        self.characters
            .get(&id)
            .map(|character| {
                character
                    .skills
                    .iter()
                    .map(|(skill, value)| (*skill, *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_skill(&mut self, id: EntityId, skill: SkillId, value: i32) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.skills.insert(skill, value);
        }
    }

    fn attribute(&self, id: EntityId, attribute: Attribute) -> Option<i32> {
        self.characters
            .get(&id)
            .map(|character| character.attributes[attribute.index()])
    }

    fn set_attribute(&mut self, id: EntityId, attribute: Attribute, value: i32) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.attributes[attribute.index()] = value;
        }
    }

    fn grant_spell(&mut self, id: EntityId, spell: &SpellGrant) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.spells.push(*spell);
        }
    }

    fn grant_power(&mut self, id: EntityId, power: &PowerGrant) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.powers.push(*power);
        }
    }

    fn add_cash(&mut self, id: EntityId, amount: i64) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.cash = character.cash.saturating_add(amount);
        }
    }

    fn create_item(&mut self, item_type: ItemTypeId) -> Option<ItemId> {
        if !item_type.is_assigned() {
            return None;
        }
        let id = ItemId(self.next_item);
        self.next_item += 1;
        self.items.insert(
            id,
            MemoryItem {
                item_type,
                value: 0,
                attached: Vec::new(),
            },
        );
        Some(id)
    }

    fn attach_item(&mut self, parent: ItemId, child: ItemId) {
        if !self.items.contains_key(&child) {
            return;
        }
        if let Some(item) = self.items.get_mut(&parent) {
            item.attached.push(child);
        }
    }

    fn set_item_value(&mut self, item: ItemId, value: i64) {
        if let Some(item) = self.items.get_mut(&item) {
            item.value = value;
        }
    }

    fn give_item(&mut self, id: EntityId, item: ItemId) {
        if !self.items.contains_key(&item) {
            return;
        }
        if let Some(character) = self.characters.get_mut(&id) {
            character.inventory.push(item);
        }
    }

    fn equip_item(&mut self, id: EntityId, item: ItemId, slot: WearSlot) -> bool {
        if !self.items.contains_key(&item) {
            return false;
        }
        let Some(character) = self.characters.get_mut(&id) else {
            return false;
        };
        if character.equipment.contains_key(&slot) {
            return false;
        }
        character.inventory.retain(|held| *held != item);
        character.equipment.insert(slot, item);
        true
    }

    fn equipment(&self, id: EntityId) -> Vec<(WearSlot, ItemId)> {
        self.characters
            .get(&id)
            .map(|character| {
                character
                    .equipment
                    .iter()
                    .map(|(slot, item)| (*slot, *item))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn unequip(&mut self, id: EntityId, slot: WearSlot) -> Option<ItemId> {
        self.characters.get_mut(&id)?.equipment.remove(&slot)
    }

    fn carried(&self, id: EntityId) -> Vec<ItemId> {
        self.characters
            .get(&id)
            .map(|character| character.inventory.clone())
            .unwrap_or_default()
    }

    fn take_item(&mut self, id: EntityId, item: ItemId) -> bool {
        let Some(character) = self.characters.get_mut(&id) else {
            return false;
        };
        let before = character.inventory.len();
        character.inventory.retain(|held| *held != item);
        character.inventory.len() != before
    }

    fn destroy_item(&mut self, item: ItemId) {
        self.destroy_item_tree(item);
    }

    fn start_fighting(&mut self, id: EntityId, opponent: EntityId) {
        if !self.characters.contains_key(&opponent) {
            return;
        }
        if let Some(character) = self.characters.get_mut(&id) {
            character.fighting = Some(opponent);
        }
    }

    fn stop_fighting(&mut self, id: EntityId) {
        if let Some(character) = self.characters.get_mut(&id) {
            character.fighting = None;
        }
    }

    fn perform(&mut self, id: EntityId, action: Action) {
        if let Action::Move(direction) = action {
            let destination = self
                .characters
                .get(&id)
                .and_then(|character| character.room)
                .and_then(|room| self.rooms.get(&room))
                .and_then(|room| room.exits.get(&direction).copied());
            if let (Some(destination), Some(character)) =
                (destination, self.characters.get_mut(&id))
            {
                character.room = Some(destination);
            }
        }
        self.actions.push((id, action));
    }
}

/// Two adjoining zones with a mix of eligible and excluded rooms, one social
/// hotspot, and a hostile ganger to hunt.
pub fn demo_city(template: TemplateId, now: u64) -> MemoryWorld {
    let mut world = MemoryWorld::new(now);
    world.add_template(
        template,
        CharacterTemplate {
            name: "a shadowrunner".to_string(),
            skills: vec![(SkillId(1), 4), (SkillId(5), 3), (SkillId(12), 5)],
            attributes: [4, 4, 4, 3, 4, 3],
        },
    );

    let street = world.add_room(100, 1, "Neon Street", "Holo-ads flicker over the street.", &[]);
    let alley = world.add_room(101, 1, "Back Alley", "A narrow alley behind the noodle bar.", &[]);
    let shack = world.add_room(
        102,
        1,
        "Stuffer Shack",
        "Fluorescent aisles of soy snacks.",
        &[RoomFlag::Indoors],
    );
    let club = world.add_room(
        103,
        1,
        "Club Penumbra",
        "Bass rattles the glasses on the bar.",
        &[RoomFlag::Indoors, RoomFlag::Socialize],
    );
    let shaft = world.add_room(
        104,
        1,
        "Maintenance Shaft",
        "Cables hang in the dark.",
        &[RoomFlag::ElevatorShaft],
    );
    let storage = world.add_room(
        105,
        1,
        "Storage Room",
        "Crates of synthahol.",
        &[RoomFlag::Storage],
    );
    world.link(street, Direction::North, alley);
    world.link(street, Direction::West, shack);
    world.link(alley, Direction::East, club);
    world.link(club, Direction::Down, shaft);
    world.link(shack, Direction::North, storage);

    let broken = world.add_room(200, 2, "Broken Street", "Burnt-out cars line the street.", &[]);
    let plaza = world.add_room(201, 2, "Ruined Plaza", "Weeds split the concrete.", &[]);
    let rust = world.add_room(202, 2, "Alley of Rust", "Rusted fire escapes overhead.", &[]);
    let tunnel = world.add_room(
        203,
        2,
        "Collapsed Tunnel",
        "Rubble blocks the way.",
        &[RoomFlag::NoMob],
    );
    world.link(street, Direction::East, broken);
    world.link(broken, Direction::North, plaza);
    world.link(plaza, Direction::East, rust);
    world.link(rust, Direction::Down, tunnel);

    let ganger = world.add_npc("a barrens ganger", "ganger barrens", rust);
    world.set_behavior_flag(ganger, BehaviorFlag::Aggressive, true);
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> (MemoryWorld, RoomId, RoomId, RoomId) {
        let mut world = MemoryWorld::new(0);
        let a = world.add_room(1, 1, "A", "", &[]);
        let b = world.add_room(2, 1, "B", "", &[]);
        let c = world.add_room(3, 1, "C", "", &[]);
        world.link(a, Direction::East, b);
        world.link(b, Direction::East, c);
        (world, a, b, c)
    }

    #[test]
    fn next_step_returns_first_hop() {
        let (world, a, b, c) = corridor();
        let mover = EntityId(99);
        assert_eq!(world.next_step(a, c, mover), Some(Direction::East));
        assert_eq!(world.next_step(c, a, mover), Some(Direction::West));
        assert_eq!(world.next_step(b, b, mover), None);
    }

    #[test]
    fn next_step_stays_inside_zone() {
        let (mut world, a, _, c) = corridor();
        let outside = world.add_room(9, 2, "Outside", "", &[]);
        world.link(c, Direction::North, outside);
        assert_eq!(world.next_step(a, outside, EntityId(1)), None);
    }

    #[test]
    fn unlink_cuts_both_sides() {
        let (mut world, a, b, c) = corridor();
        world.unlink(b, Direction::East);
        assert_eq!(world.next_step(a, c, EntityId(1)), None);
        assert_eq!(world.next_step(b, a, EntityId(1)), Some(Direction::West));
    }

    #[test]
    fn move_action_follows_exit() {
        let (mut world, a, b, _) = corridor();
        let npc = world.add_npc("rat", "rat", a);
        world.perform(npc, Action::Move(Direction::East));
        assert_eq!(world.character(npc).and_then(|view| view.room), Some(b));
        world.perform(npc, Action::Move(Direction::Up));
        assert_eq!(world.character(npc).and_then(|view| view.room), Some(b));
        assert_eq!(world.actions().len(), 2);
    }

    #[test]
    fn destroy_item_removes_attachments() {
        let mut world = MemoryWorld::new(0);
        let gun = world.create_item(ItemTypeId(700)).expect("gun");
        let scope = world.create_item(ItemTypeId(701)).expect("scope");
        world.attach_item(gun, scope);
        assert_eq!(world.item_count(), 2);
        world.destroy_item(gun);
        assert_eq!(world.item_count(), 0);
        assert_eq!(world.create_item(ItemTypeId(0)), None);
    }

    #[test]
    fn removal_records_leftover_items() {
        let (mut world, a, _, _) = corridor();
        let npc = world.add_npc("rat", "rat", a);
        let item = world.create_item(ItemTypeId(5)).expect("item");
        world.give_item(npc, item);
        world.remove_character(npc);
        assert_eq!(world.removed()[0].carried, 1);
        assert!(world.character(npc).is_none());
    }

    #[test]
    fn demo_city_has_two_zones() {
        let world = demo_city(TemplateId(20022), 0);
        assert_eq!(world.rooms_in_zone(ZoneId(1)).len(), 6);
        assert_eq!(world.rooms_in_zone(ZoneId(2)).len(), 4);
        assert!(world.template_ready(TemplateId(20022)));
        assert_eq!(world.npcs_with_keyword("ganger").len(), 1);
    }
}
