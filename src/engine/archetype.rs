use crate::entities::attributes::{scale_attribute, Attribute};
use crate::entities::character::EntityId;
use crate::entities::item::{leading_assigned, ItemId, ItemTypeId};
use crate::entities::skills::scale_skill;
use crate::rng::RandomSource;
use crate::tables::archetypes::{Archetype, ClassTag};
use crate::tables::tiers::Tier;
use crate::tables::TableSet;
use crate::world::host::{Action, WorldHost};

const CREDSTICK_ALIAS: &str = "credstick";

/// Applies an archetype, the tier's scaling, gear and money to a freshly created
/// entity. Returns the class the archetype resolves to.
pub fn configure(
    host: &mut dyn WorldHost,
    rng: &mut dyn RandomSource,
    tables: &TableSet,
    entity: EntityId,
    tier: &Tier,
    archetype: Option<&Archetype>,
) -> ClassTag {
    let class = ClassTag::detect(archetype);

    if let Some(archetype) = archetype {
        for (skill, value) in &archetype.skills {
            if *value > 0 {
                host.set_skill(entity, *skill, *value);
            }
        }
    }
    scale_stats(host, rng, entity, tier);
    if let Some(archetype) = archetype {
        outfit_archetype(host, entity, archetype);
    }
    hand_out_gear(host, rng, tables, entity, tier, class);
    give_money(host, rng, tables, entity, tier);

    host.add_keyword(entity, &tier.keyword());
    host.add_keyword(entity, &format!("class_{}", class.as_str()));
    class
}

fn scale_stats(host: &mut dyn WorldHost, rng: &mut dyn RandomSource, entity: EntityId, tier: &Tier) {
    let jitter = i64::from(tier.skill_jitter.max(0));
    for (skill, base) in host.skills(entity) {
        if base <= 0 {
            continue;
        }
        let roll = rng.roll_range(-jitter, jitter) as i32;
        host.set_skill(entity, skill, scale_skill(base, tier.skill_mult, roll));
    }
    for attribute in Attribute::ALL {
        if let Some(base) = host.attribute(entity, attribute) {
            let value = scale_attribute(base, tier.attr_mult(attribute), tier.attr_add(attribute));
            host.set_attribute(entity, attribute, value);
        }
    }
}

fn give_new(host: &mut dyn WorldHost, entity: EntityId, item_type: ItemTypeId) -> Option<ItemId> {
    let item = host.create_item(item_type)?;
    host.give_item(entity, item);
    Some(item)
}

fn outfit_archetype(host: &mut dyn WorldHost, entity: EntityId, archetype: &Archetype) {
    for spell in archetype.active_spells() {
        host.grant_spell(entity, spell);
    }
    for power in archetype.active_powers() {
        host.grant_power(entity, power);
    }

    if let Some(weapon) = archetype.weapon.filter(|weapon| weapon.item.is_assigned()) {
        if let Some(item) = host.create_item(weapon.item) {
            for accessory in weapon.accessories() {
                if let Some(part) = host.create_item(accessory) {
                    host.attach_item(item, part);
                }
            }
            host.give_item(entity, item);
        }
    }

    for (slot, item_type) in &archetype.worn {
        if !item_type.is_assigned() {
            continue;
        }
        let Some(item) = host.create_item(*item_type) else {
            continue;
        };
        if !host.equip_item(entity, item, *slot) {
            host.give_item(entity, item);
        }
    }

    let lists = [
        &archetype.carried,
        &archetype.cyberware,
        &archetype.bioware,
        &archetype.foci,
    ];
    for list in lists {
        for item_type in leading_assigned(list) {
            give_new(host, entity, item_type);
        }
    }
    if let Some(deck) = archetype.deck.filter(|deck| deck.is_assigned()) {
        give_new(host, entity, deck);
    }
    for item_type in leading_assigned(&archetype.software) {
        give_new(host, entity, item_type);
    }
}

fn pick_alias<'a>(aliases: &'a [String], rng: &mut dyn RandomSource) -> Option<&'a str> {
    let idx = rng.pick_index(aliases.len())?;
    aliases.get(idx).map(String::as_str)
}

fn give_alias(
    host: &mut dyn WorldHost,
    rng: &mut dyn RandomSource,
    tables: &TableSet,
    entity: EntityId,
    alias: &str,
) {
    if let Some(item_type) = tables.aliases.resolve(alias, rng) {
        give_new(host, entity, item_type);
    }
}

fn hand_out_gear(
    host: &mut dyn WorldHost,
    rng: &mut dyn RandomSource,
    tables: &TableSet,
    entity: EntityId,
    tier: &Tier,
    class: ClassTag,
) {
    let gear = tier.gear.overlay(tables.class_gear.get(class.as_str()));

    if let Some(alias) = pick_alias(&gear.weapons, rng) {
        give_alias(host, rng, tables, entity, alias);
    }
    if let Some(alias) = pick_alias(&gear.armor, rng) {
        give_alias(host, rng, tables, entity, alias);
    }
    // ammo comes as a pair from one alias, each resolved on its own
    if let Some(alias) = pick_alias(&gear.ammo, rng) {
        give_alias(host, rng, tables, entity, alias);
        give_alias(host, rng, tables, entity, alias);
    }
    for alias in &gear.initware {
        give_alias(host, rng, tables, entity, alias);
    }

    host.perform(entity, Action::WearAll);
}

fn give_money(
    host: &mut dyn WorldHost,
    rng: &mut dyn RandomSource,
    tables: &TableSet,
    entity: EntityId,
    tier: &Tier,
) {
    let mult = tier.currency_mult();
    let cash = rng.roll_range(100, 1_000) * mult / 100;
    host.add_cash(entity, cash);

    let value = rng.roll_range(1_000, 10_000) * mult / 100;
    if let Some(item_type) = tables.aliases.resolve(CREDSTICK_ALIAS, rng) {
        if let Some(credstick) = give_new(host, entity, item_type) {
            host.set_item_value(credstick, value);
        }
    }
}
