use crate::entities::item::ItemTypeId;
use crate::rng::RandomSource;
use crate::tables::parse::{comma_list, content_lines, key_value};
use crate::tables::{Parsed, TableError};
use std::collections::HashMap;
use std::path::Path;

/// Alias lists for the four gear slots a tier or class hands out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GearLists {
    pub weapons: Vec<String>,
    pub armor: Vec<String>,
    pub ammo: Vec<String>,
    pub initware: Vec<String>,
}

impl GearLists {
    /// Assigns a `weapons=`/`armor=`/`ammo=`/`initware=` field. Returns `false` for
    /// any other key.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "weapons" => &mut self.weapons,
            "armor" => &mut self.armor,
            "ammo" => &mut self.ammo,
            "initware" => &mut self.initware,
            _ => return false,
        };
        *slot = comma_list(value);
        true
    }

    /// Per slot, the class list when it is non-empty, else this list.
    pub fn overlay(&self, class: Option<&GearLists>) -> GearLists {
        let Some(class) = class else {
            return self.clone();
        };
        let pick = |class: &Vec<String>, base: &Vec<String>| {
            if class.is_empty() {
                base.clone()
            } else {
                class.clone()
            }
        };
        GearLists {
            weapons: pick(&class.weapons, &self.weapons),
            armor: pick(&class.armor, &self.armor),
            ammo: pick(&class.ammo, &self.ammo),
            initware: pick(&class.initware, &self.initware),
        }
    }
}

/// Symbolic gear alias to candidate item prototypes.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<ItemTypeId>>,
}

impl AliasTable {
    pub fn new(aliases: HashMap<String, Vec<ItemTypeId>>) -> Self {
        let aliases = aliases
            .into_iter()
            .filter(|(alias, ids)| !alias.is_empty() && !ids.is_empty())
            .collect();
        Self { aliases }
    }

    pub fn parse(content: &str, path: &Path) -> Parsed<Self> {
        let mut aliases = HashMap::new();
        let mut skipped = Vec::new();
        for (line_no, line) in content_lines(content, &['#']) {
            let Some((alias, ids)) = line.split_once('|') else {
                skipped.push(TableError::line(path, line_no, "missing '|'"));
                continue;
            };
            let alias = alias.trim();
            let ids: Result<Vec<ItemTypeId>, _> = ids
                .split_whitespace()
                .map(|id| id.parse::<u32>().map(ItemTypeId))
                .collect();
            let ids: Vec<ItemTypeId> = match ids {
                Ok(ids) => ids.into_iter().filter(|id| id.is_assigned()).collect(),
                Err(_) => {
                    skipped.push(TableError::line(path, line_no, "invalid item id"));
                    continue;
                }
            };
            if alias.is_empty() || ids.is_empty() {
                skipped.push(TableError::line(path, line_no, "alias without item ids"));
                continue;
            }
            aliases.insert(alias.to_string(), ids);
        }
        Parsed {
            table: Self { aliases },
            skipped,
        }
    }

    /// Uniform pick among the alias's prototypes. Unknown aliases resolve to `None`.
    pub fn resolve(&self, alias: &str, rng: &mut dyn RandomSource) -> Option<ItemTypeId> {
        let ids = self.aliases.get(alias)?;
        let idx = rng.pick_index(ids.len())?;
        ids.get(idx).copied()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Per-class gear overrides keyed by class tag.
#[derive(Debug, Clone, Default)]
pub struct ClassGearTable {
    classes: HashMap<String, GearLists>,
}

impl ClassGearTable {
    pub fn parse(content: &str, path: &Path) -> Parsed<Self> {
        let mut classes = HashMap::new();
        let mut skipped = Vec::new();
        for (line_no, line) in content_lines(content, &['#']) {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < 2 || fields[0] != "class" || fields[1].is_empty() {
                skipped.push(TableError::line(path, line_no, "expected class|<tag>|..."));
                continue;
            }
            let mut gear = GearLists::default();
            for field in &fields[2..] {
                let Some((key, value)) = key_value(field) else {
                    continue;
                };
                if !gear.set_field(key, value) {
                    tracing::debug!(target: "npcgen::tables", key, "ignoring class gear key");
                }
            }
            classes.insert(fields[1].to_ascii_lowercase(), gear);
        }
        Parsed {
            table: Self { classes },
            skipped,
        }
    }

    pub fn get(&self, tag: &str) -> Option<&GearLists> {
        self.classes.get(tag)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::EngineRng;

    fn path() -> &'static Path {
        Path::new("gear_map.txt")
    }

    #[test]
    fn parses_alias_lines_and_skips_bad_ones() {
        let content = "# gear\npistol|700 701 702\nsmg 800\nempty|\nbad|12 x\ndrops_zero|0 5\n";
        let parsed = AliasTable::parse(content, path());
        assert_eq!(parsed.table.len(), 2);
        assert!(parsed.table.contains("pistol"));
        assert!(parsed.table.contains("drops_zero"));
        assert_eq!(parsed.skipped.len(), 3);
    }

    #[test]
    fn unknown_alias_resolves_to_none() {
        let table = AliasTable::default();
        let mut rng = EngineRng::from_seed(1);
        assert_eq!(table.resolve("pistol", &mut rng), None);
        assert_eq!(table.resolve("", &mut rng), None);
    }

    #[test]
    fn alias_draws_are_uniform() {
        let ids = vec![ItemTypeId(1), ItemTypeId(2), ItemTypeId(3), ItemTypeId(4)];
        let table = AliasTable::new(HashMap::from([("kit".to_string(), ids)]));
        let mut rng = EngineRng::from_seed(99);
        let mut counts = [0usize; 4];
        for _ in 0..1_000 {
            let id = table.resolve("kit", &mut rng).expect("known alias");
            counts[(id.0 - 1) as usize] += 1;
        }
        for count in counts {
            assert!((190..=310).contains(&count), "counts {:?}", counts);
        }
    }

    #[test]
    fn class_lists_override_only_when_non_empty() {
        let tier = GearLists {
            weapons: vec!["pistol".into()],
            armor: vec!["jacket".into()],
            ammo: vec!["ammo_pistol".into()],
            initware: vec![],
        };
        let parsed = ClassGearTable::parse(
            "class|Mage|weapons=staff|initware=spellbook\nclass||armor=x\nnot|a|class\n",
            Path::new("class_gear.txt"),
        );
        assert_eq!(parsed.skipped.len(), 2);
        let gear = tier.overlay(parsed.table.get("mage"));
        assert_eq!(gear.weapons, vec!["staff"]);
        assert_eq!(gear.armor, vec!["jacket"]);
        assert_eq!(gear.ammo, vec!["ammo_pistol"]);
        assert_eq!(gear.initware, vec!["spellbook"]);
        assert_eq!(tier.overlay(None), tier);
    }
}
