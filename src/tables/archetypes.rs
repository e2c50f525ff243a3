use crate::entities::character::{PowerGrant, SpellGrant, WearSlot};
use crate::entities::item::ItemTypeId;
use crate::entities::skills::SkillId;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const BUILTIN_ARCHETYPES: &str = include_str!("../../data/tables/archetypes.yml");

/// A character-creation template: skills, magic and starting kit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Archetype {
    pub name: String,
    pub skills: BTreeMap<SkillId, i32>,
    pub spells: Vec<SpellGrant>,
    pub powers: Vec<PowerGrant>,
    pub weapon: Option<ArchetypeWeapon>,
    pub worn: BTreeMap<WearSlot, ItemTypeId>,
    pub carried: Vec<ItemTypeId>,
    pub cyberware: Vec<ItemTypeId>,
    pub bioware: Vec<ItemTypeId>,
    pub foci: Vec<ItemTypeId>,
    pub deck: Option<ItemTypeId>,
    pub software: Vec<ItemTypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArchetypeWeapon {
    pub item: ItemTypeId,
    #[serde(default)]
    pub top: Option<ItemTypeId>,
    #[serde(default)]
    pub barrel: Option<ItemTypeId>,
    #[serde(default)]
    pub under: Option<ItemTypeId>,
}

impl ArchetypeWeapon {
    pub fn accessories(&self) -> impl Iterator<Item = ItemTypeId> {
        [self.top, self.barrel, self.under]
            .into_iter()
            .flatten()
            .filter(|item| item.is_assigned())
    }
}

impl Archetype {
    /// Spells up to the first unassigned entry.
    pub fn active_spells(&self) -> impl Iterator<Item = &SpellGrant> {
        self.spells.iter().take_while(|grant| grant.spell != 0)
    }

    pub fn active_powers(&self) -> impl Iterator<Item = &PowerGrant> {
        self.powers.iter().take_while(|grant| grant.power != 0)
    }

    pub fn has_deck(&self) -> bool {
        self.deck.is_some_and(ItemTypeId::is_assigned)
    }
}

pub fn parse_archetypes(content: &str) -> Result<Vec<Archetype>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// The embedded archetype set. Empty, with a warning, if it fails to parse.
pub fn builtin_archetypes() -> Vec<Archetype> {
    match parse_archetypes(BUILTIN_ARCHETYPES) {
        Ok(archetypes) => archetypes,
        Err(err) => {
            tracing::warn!(target: "npcgen::tables", error = %err, "builtin archetypes did not parse");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTag {
    Decker,
    Mage,
    Adept,
    Samurai,
}

impl ClassTag {
    /// Deck beats spells beats powers; anything else, or no archetype, is a samurai.
    pub fn detect(archetype: Option<&Archetype>) -> Self {
        let Some(archetype) = archetype else {
            return ClassTag::Samurai;
        };
        if archetype.has_deck() {
            ClassTag::Decker
        } else if archetype.active_spells().next().is_some() {
            ClassTag::Mage
        } else if archetype.active_powers().next().is_some() {
            ClassTag::Adept
        } else {
            ClassTag::Samurai
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassTag::Decker => "decker",
            ClassTag::Mage => "mage",
            ClassTag::Adept => "adept",
            ClassTag::Samurai => "samurai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_parses() {
        let archetypes = parse_archetypes(BUILTIN_ARCHETYPES).expect("builtin yaml");
        assert!(archetypes.len() >= 4);
        let tags: Vec<_> = archetypes
            .iter()
            .map(|archetype| ClassTag::detect(Some(archetype)))
            .collect();
        for tag in [ClassTag::Decker, ClassTag::Mage, ClassTag::Adept, ClassTag::Samurai] {
            assert!(tags.contains(&tag), "missing {:?}", tag);
        }
    }

    #[test]
    fn class_priority() {
        let yaml = "\
- name: Everything
  deck: 500
  spells: [{ spell: 3, force: 4 }]
  powers: [{ power: 2, rating: 1 }]
- name: Caster
  spells: [{ spell: 3 }]
  powers: [{ power: 2 }]
- name: Monk
  spells: [{ spell: 0 }, { spell: 3 }]
  powers: [{ power: 2 }]
- name: Blank
  deck: 0
";
        let archetypes = parse_archetypes(yaml).expect("yaml");
        let tags: Vec<_> = archetypes
            .iter()
            .map(|archetype| ClassTag::detect(Some(archetype)))
            .collect();
        assert_eq!(
            tags,
            vec![ClassTag::Decker, ClassTag::Mage, ClassTag::Adept, ClassTag::Samurai]
        );
        assert_eq!(ClassTag::detect(None), ClassTag::Samurai);
    }

    #[test]
    fn weapon_accessories_skip_unassigned() {
        let yaml = "\
- name: Gunner
  skills: { 12: 5, 3: 2 }
  weapon: { item: 700, top: 710, barrel: 0 }
  worn: { body: 800, feet: 801 }
";
        let archetype = &parse_archetypes(yaml).expect("yaml")[0];
        assert_eq!(archetype.skills.get(&SkillId(12)), Some(&5));
        let weapon = archetype.weapon.expect("weapon");
        assert_eq!(weapon.accessories().collect::<Vec<_>>(), vec![ItemTypeId(710)]);
        assert_eq!(archetype.worn.get(&WearSlot::Feet), Some(&ItemTypeId(801)));
    }
}
