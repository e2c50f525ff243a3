use crate::entities::attributes::Attribute;
use crate::entities::character::{
    BehaviorFlag, EntityId, Identity, PowerGrant, SpellGrant, TemplateId, WearSlot,
};
use crate::entities::item::{ItemId, ItemTypeId};
use crate::entities::skills::SkillId;
use crate::world::room::{Direction, RoomId, RoomInfo, ZoneId};

/// Snapshot of a character as the engine needs to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterView {
    pub id: EntityId,
    pub name: String,
    pub is_npc: bool,
    pub room: Option<RoomId>,
    pub awake: bool,
    pub fighting: Option<EntityId>,
    pub in_vehicle: bool,
    pub wielding: bool,
    pub aggressive: bool,
    pub keywords: String,
    pub template: Option<TemplateId>,
    pub being_removed: bool,
}

/// Commands issued on behalf of a character. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Say(String),
    Emote(String),
    Social {
        name: String,
        target: Option<String>,
    },
    Move(Direction),
    Draw,
    WearAll,
}

/// The world, combat and object services the engine runs against.
///
/// The engine never owns characters or items; it only mutates ones it holds an id
/// for, and re-reads a [`CharacterView`] before acting on it.
pub trait WorldHost {
    /// Wall-clock seconds.
    fn now(&self) -> u64;

    fn room(&self, room: RoomId) -> Option<RoomInfo>;
    fn rooms_in_zone(&self, zone: ZoneId) -> Vec<RoomId>;
    fn occupants(&self, room: RoomId) -> Vec<EntityId>;
    fn characters(&self) -> Vec<EntityId>;
    fn character(&self, id: EntityId) -> Option<CharacterView>;
    fn can_see(&self, viewer: EntityId, target: EntityId) -> bool;

    /// First hop from `from` toward `to`, or `None` when no legal path exists
    /// (including `from == to`).
    fn next_step(&self, from: RoomId, to: RoomId, mover: EntityId) -> Option<Direction>;

    fn template_ready(&self, template: TemplateId) -> bool;
    fn create_from_template(&mut self, template: TemplateId) -> Option<EntityId>;
    fn place_in_room(&mut self, id: EntityId, room: RoomId) -> bool;
    fn remove_character(&mut self, id: EntityId);

    fn set_identity(&mut self, id: EntityId, identity: &Identity);
    fn add_keyword(&mut self, id: EntityId, keyword: &str);
    fn set_behavior_flag(&mut self, id: EntityId, flag: BehaviorFlag, enabled: bool);

    fn skills(&self, id: EntityId) -> Vec<(SkillId, i32)>;
    fn set_skill(&mut self, id: EntityId, skill: SkillId, value: i32);
    fn attribute(&self, id: EntityId, attribute: Attribute) -> Option<i32>;
    fn set_attribute(&mut self, id: EntityId, attribute: Attribute, value: i32);
    fn grant_spell(&mut self, id: EntityId, spell: &SpellGrant);
    fn grant_power(&mut self, id: EntityId, power: &PowerGrant);
    fn add_cash(&mut self, id: EntityId, amount: i64);

    fn create_item(&mut self, item_type: ItemTypeId) -> Option<ItemId>;
    fn attach_item(&mut self, parent: ItemId, child: ItemId);
    fn set_item_value(&mut self, item: ItemId, value: i64);
    fn give_item(&mut self, id: EntityId, item: ItemId);
    fn equip_item(&mut self, id: EntityId, item: ItemId, slot: WearSlot) -> bool;
    fn equipment(&self, id: EntityId) -> Vec<(WearSlot, ItemId)>;
    fn unequip(&mut self, id: EntityId, slot: WearSlot) -> Option<ItemId>;
    fn carried(&self, id: EntityId) -> Vec<ItemId>;
    fn take_item(&mut self, id: EntityId, item: ItemId) -> bool;
    fn destroy_item(&mut self, item: ItemId);

    fn start_fighting(&mut self, id: EntityId, opponent: EntityId);
    fn stop_fighting(&mut self, id: EntityId);
    fn perform(&mut self, id: EntityId, action: Action);

    fn zone_of(&self, room: RoomId) -> Option<ZoneId> {
        self.room(room).map(|info| info.zone)
    }
}
