use crate::entities::attributes::Attribute;
use crate::rng::RandomSource;
use crate::tables::gear::GearLists;
use crate::tables::parse::{content_lines, key_value, six};
use crate::tables::{Parsed, TableError};
use std::path::Path;

/// A difficulty band: how likely it is, how it scales stats, what it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub id: i32,
    pub name: String,
    pub weight: i32,
    pub skill_mult: f32,
    pub skill_jitter: i32,
    pub attr_mult: [f32; 6],
    pub attr_add: [i32; 6],
    pub gear: GearLists,
}

impl Tier {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            weight: 10,
            skill_mult: 1.0,
            skill_jitter: 0,
            attr_mult: [1.0; 6],
            attr_add: [0; 6],
            gear: GearLists::default(),
        }
    }

    /// Fallback used when no tier table is available.
    pub fn street() -> Self {
        Self {
            weight: 100,
            skill_jitter: 1,
            ..Self::new(2, "Street")
        }
    }

    pub fn attr_mult(&self, attribute: Attribute) -> f32 {
        self.attr_mult[attribute.index()]
    }

    pub fn attr_add(&self, attribute: Attribute) -> i32 {
        self.attr_add[attribute.index()]
    }

    /// Percentage applied to cash and credstick rolls; tier 2 is par.
    pub fn currency_mult(&self) -> i64 {
        (100 + (i64::from(self.id) - 2) * 25).max(0)
    }

    /// Keyword tag appended once the tier is applied.
    pub fn keyword(&self) -> String {
        let name: String = self
            .name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_ascii_lowercase();
        format!("tier_{}", name)
    }

    fn apply_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "weight" => {
                let weight: i32 = value
                    .parse()
                    .map_err(|_| format!("invalid weight '{}'", value))?;
                if weight < 0 {
                    return Err(format!("weight {} out of range", value));
                }
                self.weight = weight;
            }
            "skill_mult" => {
                let mult: f32 = value
                    .parse()
                    .map_err(|_| format!("invalid skill_mult '{}'", value))?;
                if !mult.is_finite() || mult < 0.0 {
                    return Err(format!("skill_mult {} out of range", value));
                }
                self.skill_mult = mult;
            }
            "skill_jitter" => {
                let jitter: i32 = value
                    .parse()
                    .map_err(|_| format!("invalid skill_jitter '{}'", value))?;
                if !(0..=12).contains(&jitter) {
                    return Err(format!("skill_jitter {} out of range", value));
                }
                self.skill_jitter = jitter;
            }
            "attr" => {
                self.attr_add =
                    six(value).ok_or_else(|| format!("attr needs six integers: '{}'", value))?;
            }
            "attr_mult" => {
                let mults: [f32; 6] =
                    six(value).ok_or_else(|| format!("attr_mult needs six numbers: '{}'", value))?;
                if mults.iter().any(|mult| !mult.is_finite() || *mult < 0.0) {
                    return Err(format!("attr_mult out of range: '{}'", value));
                }
                self.attr_mult = mults;
            }
            other => {
                if !self.gear.set_field(other, value) {
                    tracing::debug!(target: "npcgen::tables", key = other, "ignoring tier key");
                }
            }
        }
        Ok(())
    }
}

/// Tiers in table order. Never empty.
#[derive(Debug, Clone)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: vec![Tier::street()],
        }
    }
}

impl TierTable {
    pub fn new(tiers: Vec<Tier>) -> Self {
        if tiers.is_empty() {
            return Self::default();
        }
        Self { tiers }
    }

    pub fn parse(content: &str, path: &Path) -> Parsed<Vec<Tier>> {
        let mut tiers = Vec::new();
        let mut skipped = Vec::new();
        for (line_no, line) in content_lines(content, &['#']) {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < 3 || fields[0] != "tier" {
                skipped.push(TableError::line(path, line_no, "expected tier|<id>|<name>|..."));
                continue;
            }
            let Ok(id) = fields[1].parse::<i32>() else {
                skipped.push(TableError::line(path, line_no, "invalid tier id"));
                continue;
            };
            let mut tier = Tier::new(id, fields[2]);
            for field in &fields[3..] {
                let Some((key, value)) = key_value(field) else {
                    continue;
                };
                if let Err(reason) = tier.apply_field(key, value) {
                    tracing::warn!(
                        target: "npcgen::tables",
                        path = %path.display(),
                        line = line_no,
                        tier = id,
                        "{}; keeping previous value",
                        reason
                    );
                }
            }
            tiers.push(tier);
        }
        Parsed {
            table: tiers,
            skipped,
        }
    }

    pub fn total_weight(&self) -> i64 {
        self.tiers
            .iter()
            .map(|tier| i64::from(tier.weight.max(0)))
            .sum()
    }

    /// Weighted draw in `[1, max(1, total)]`, walked in table order. Falls back to the
    /// last tier when no cumulative weight reaches the draw.
    pub fn pick(&self, rng: &mut dyn RandomSource) -> &Tier {
        let draw = rng.roll_range(1, self.total_weight().max(1));
        let mut acc = 0i64;
        for tier in &self.tiers {
            acc += i64::from(tier.weight.max(0));
            if acc >= draw {
                return tier;
            }
        }
        let last = self.tiers.len().saturating_sub(1);
        &self.tiers[last]
    }

    pub fn find(&self, id: i32) -> Option<&Tier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
