use crate::entities::character::TemplateId;
use crate::tables::parse::{comma_list, content_lines};
use crate::tables::{Parsed, TableError};
use crate::world::room::{RoomFlag, RoomInfo};
use std::ops::RangeInclusive;
use std::path::Path;

pub const INACTIVITY_RANGE: RangeInclusive<u64> = 60..=86_400;
pub const DEFAULT_INACTIVITY_SECS: u64 = 900;

/// Values read from a `<profile>_spawn.txt`; `None` keeps the profile default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOverrides {
    pub zone_entry_chance_pct: Option<u32>,
    pub login_chance_pct: Option<u32>,
    pub inactivity_secs: Option<u64>,
    pub template: Option<TemplateId>,
    pub allow_flags: Option<Vec<RoomFlag>>,
    pub disallow_flags: Option<Vec<RoomFlag>>,
    pub max_spawns_per_trigger: Option<u32>,
}

impl SpawnOverrides {
    pub fn parse(content: &str, path: &Path) -> Parsed<Self> {
        let mut overrides = Self::default();
        let mut skipped = Vec::new();
        for (line_no, line) in content_lines(content, &['#', ';']) {
            let Some((key, value)) = line.split_once('=') else {
                skipped.push(TableError::line(path, line_no, "expected key = value"));
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if let Err(reason) = overrides.apply(key, value, path) {
                tracing::warn!(
                    target: "npcgen::tables",
                    path = %path.display(),
                    line = line_no,
                    key,
                    "{}; keeping default",
                    reason
                );
            }
        }
        Parsed {
            table: overrides,
            skipped,
        }
    }

    fn apply(&mut self, key: &str, value: &str, path: &Path) -> Result<(), String> {
        match key {
            "zone_entry_spawn_chance_percent" => {
                self.zone_entry_chance_pct = Some(parse_percent(value)?);
            }
            "login_spawn_chance_percent" => {
                self.login_chance_pct = Some(parse_percent(value)?);
            }
            "despawn_zone_inactivity_seconds" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid seconds '{}'", value))?;
                if !INACTIVITY_RANGE.contains(&secs) {
                    return Err(format!("inactivity {} outside 60..=86400", secs));
                }
                self.inactivity_secs = Some(secs);
            }
            "template_mobile_vnum" => {
                let template: i64 = value
                    .parse()
                    .map_err(|_| format!("invalid template '{}'", value))?;
                if template <= 0 {
                    return Err(format!("template {} must be positive", template));
                }
                self.template = Some(TemplateId(template));
            }
            "spawn_allow_flags" => self.allow_flags = Some(parse_flags(value, path)),
            "spawn_disallow_flags" => self.disallow_flags = Some(parse_flags(value, path)),
            "max_spawns_per_trigger" => {
                self.max_spawns_per_trigger = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid spawn cap '{}'", value))?,
                );
            }
            other => {
                tracing::debug!(target: "npcgen::tables", key = other, "ignoring spawn key");
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_percent(value: &str) -> Result<u32, String> {
    let pct: u32 = value
        .parse()
        .map_err(|_| format!("invalid percent '{}'", value))?;
    if pct > 100 {
        return Err(format!("percent {} outside 0..=100", pct));
    }
    Ok(pct)
}

fn parse_flags(value: &str, path: &Path) -> Vec<RoomFlag> {
    comma_list(value)
        .into_iter()
        .filter_map(|name| {
            let flag = RoomFlag::from_name(&name);
            if flag.is_none() {
                tracing::warn!(
                    target: "npcgen::tables",
                    path = %path.display(),
                    flag = %name,
                    "unknown room flag"
                );
            }
            flag
        })
        .collect()
}

/// Effective spawn settings of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    pub login_chance_pct: u32,
    pub zone_entry_chance_pct: u32,
    pub inactivity_secs: u64,
    pub template: TemplateId,
    pub allow_flags: Vec<RoomFlag>,
    pub disallow_flags: Vec<RoomFlag>,
    /// 0 leaves spawns per trigger uncapped.
    pub max_spawns_per_trigger: u32,
}

impl SpawnConfig {
    pub fn new(login_chance_pct: u32, zone_entry_chance_pct: u32, template: TemplateId) -> Self {
        Self {
            login_chance_pct,
            zone_entry_chance_pct,
            inactivity_secs: DEFAULT_INACTIVITY_SECS,
            template,
            allow_flags: Vec::new(),
            disallow_flags: Vec::new(),
            max_spawns_per_trigger: 0,
        }
    }

    pub fn with_overrides(mut self, overrides: &SpawnOverrides) -> Self {
        if let Some(pct) = overrides.login_chance_pct {
            self.login_chance_pct = pct;
        }
        if let Some(pct) = overrides.zone_entry_chance_pct {
            self.zone_entry_chance_pct = pct;
        }
        if let Some(secs) = overrides.inactivity_secs {
            self.inactivity_secs = secs;
        }
        if let Some(template) = overrides.template {
            self.template = template;
        }
        if let Some(flags) = &overrides.allow_flags {
            self.allow_flags = flags.clone();
        }
        if let Some(flags) = &overrides.disallow_flags {
            self.disallow_flags = flags.clone();
        }
        if let Some(cap) = overrides.max_spawns_per_trigger {
            self.max_spawns_per_trigger = cap;
        }
        self
    }

    /// Allow list (any one flag, when non-empty) and disallow list (none).
    pub fn admits(&self, room: &RoomInfo) -> bool {
        if !self.allow_flags.is_empty() && !self.allow_flags.iter().any(|flag| room.has(*flag)) {
            return false;
        }
        !self.disallow_flags.iter().any(|flag| room.has(*flag))
    }

    pub fn cap(&self) -> Option<usize> {
        match self.max_spawns_per_trigger {
            0 => None,
            cap => usize::try_from(cap).ok(),
        }
    }
}
