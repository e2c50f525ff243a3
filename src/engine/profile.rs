use crate::entities::character::{has_keyword, BehaviorFlag, TemplateId};
use crate::tables::spawn::SpawnConfig;
use crate::tables::TableSet;
use crate::world::room::{RoomFlag, RoomInfo};

pub const RUNNER_TEMPLATE: TemplateId = TemplateId(20022);
pub const GANG_TEMPLATE: TemplateId = TemplateId(20023);

const RUNNER_EXCLUDED: [RoomFlag; 6] = [
    RoomFlag::NoMob,
    RoomFlag::StaffOnly,
    RoomFlag::ElevatorShaft,
    RoomFlag::Storage,
    RoomFlag::Cramped,
    RoomFlag::Radiation,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    /// Passive wanderers that hunt hostiles and answer socials.
    Runner,
    /// Aggressive street toughs.
    Gang,
}

impl ProfileKind {
    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Runner => "runner",
            ProfileKind::Gang => "gang",
        }
    }
}

/// Everything that distinguishes one flavor of dynamic NPC from another.
#[derive(Debug, Clone)]
pub struct Profile {
    pub kind: ProfileKind,
    pub role_tags: &'static [&'static str],
    pub clear_flags: &'static [BehaviorFlag],
    pub set_flags: &'static [BehaviorFlag],
    pub presence: &'static str,
    pub look_desc: &'static str,
    pub idles: bool,
    pub hunts: bool,
    pub answers_socials: bool,
    /// Login spawns go to socialize rooms when the zone has any.
    pub hotspot_override: bool,
    pub spawn: SpawnConfig,
}

impl Profile {
    pub fn runner() -> Self {
        Self {
            kind: ProfileKind::Runner,
            role_tags: &["adventurer", "runner"],
            clear_flags: &[
                BehaviorFlag::Sentinel,
                BehaviorFlag::Wimpy,
                BehaviorFlag::NoSteal,
            ],
            set_flags: &[BehaviorFlag::StayZone],
            presence: "gearing up for the next run",
            look_desc: "A grim-faced adventurer with the look of someone who's seen a few too \
                        many back-alley clinics.",
            idles: true,
            hunts: true,
            answers_socials: true,
            hotspot_override: true,
            spawn: SpawnConfig::new(8, 5, RUNNER_TEMPLATE),
        }
    }

    pub fn gang() -> Self {
        Self {
            kind: ProfileKind::Gang,
            role_tags: &["adventurer", "runner", "gangster"],
            clear_flags: &[
                BehaviorFlag::Sentinel,
                BehaviorFlag::Wimpy,
                BehaviorFlag::NoSteal,
                BehaviorFlag::NoKill,
            ],
            set_flags: &[BehaviorFlag::StayZone, BehaviorFlag::Aggressive],
            presence: "watching the street with a hard stare",
            look_desc: "A wiry street tough in gang colors, knuckles scarred and eyes never \
                        quite still.",
            idles: false,
            hunts: false,
            answers_socials: false,
            hotspot_override: false,
            spawn: SpawnConfig::new(8, 8, GANG_TEMPLATE),
        }
    }

    /// Both built-in profiles with any `<name>_spawn.txt` overrides applied.
    pub fn defaults(tables: &TableSet) -> Vec<Profile> {
        vec![
            Profile::runner().configured(tables),
            Profile::gang().configured(tables),
        ]
    }

    pub fn configured(mut self, tables: &TableSet) -> Self {
        if let Some(overrides) = tables.spawn_overrides(self.kind.name()) {
            self.spawn = self.spawn.with_overrides(overrides);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Dynamic entities of this profile count as hostile targets for hunters.
    pub fn is_hostile(&self) -> bool {
        self.set_flags.contains(&BehaviorFlag::Aggressive)
    }

    /// Profile room rule followed by the configured allow and disallow lists.
    pub fn room_eligible(&self, room: &RoomInfo) -> bool {
        let profile_ok = match self.kind {
            ProfileKind::Runner => !RUNNER_EXCLUDED.iter().any(|flag| room.has(*flag)),
            ProfileKind::Gang => {
                !room.has(RoomFlag::NoMob) && (room.mentions("street") || room.mentions("alley"))
            }
        };
        profile_ok && self.spawn.admits(room)
    }

    pub fn keywords(&self, name: &str) -> String {
        let mut keywords = name.to_string();
        for tag in self.role_tags {
            keywords.push(' ');
            keywords.push_str(tag);
        }
        keywords
    }

    pub fn room_desc(&self, name: &str) -> String {
        format!("{} is here, {}.", name, self.presence)
    }

    /// The most specific role tag, used to recognise leftovers from earlier sessions.
    pub fn signature_tag(&self) -> &'static str {
        self.role_tags.last().copied().unwrap_or("adventurer")
    }

    pub fn matches_leftover(&self, keywords: &str, template: Option<TemplateId>) -> bool {
        template == Some(self.spawn.template) || has_keyword(keywords, self.signature_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::room::{RoomId, ZoneId};

    fn room(name: &str, description: &str, flags: &[RoomFlag]) -> RoomInfo {
        RoomInfo {
            id: RoomId(1),
            zone: ZoneId(1),
            name: name.to_string(),
            description: description.to_string(),
            flags: flags.to_vec(),
        }
    }

    #[test]
    fn runner_rooms_exclude_restricted_flags() {
        let runner = Profile::runner();
        assert!(runner.room_eligible(&room("Plaza", "", &[RoomFlag::Peaceful])));
        for flag in RUNNER_EXCLUDED {
            assert!(!runner.room_eligible(&room("Plaza", "", &[flag])), "{:?}", flag);
        }
    }

    #[test]
    fn gang_rooms_need_street_or_alley() {
        let gang = Profile::gang();
        assert!(gang.room_eligible(&room("Neon STREET", "", &[])));
        assert!(gang.room_eligible(&room("Corner", "A dark alleyway.", &[RoomFlag::Storage])));
        assert!(!gang.room_eligible(&room("Plaza", "Open concrete.", &[])));
        assert!(!gang.room_eligible(&room("Back Alley", "", &[RoomFlag::NoMob])));
    }

    #[test]
    fn config_lists_apply_after_profile_rule() {
        let mut runner = Profile::runner();
        runner.spawn.disallow_flags = vec![RoomFlag::Arena];
        assert!(!runner.room_eligible(&room("Pit", "", &[RoomFlag::Arena])));
        runner.spawn.allow_flags = vec![RoomFlag::Indoors];
        assert!(!runner.room_eligible(&room("Plaza", "", &[])));
        assert!(runner.room_eligible(&room("Bar", "", &[RoomFlag::Indoors])));
    }

    #[test]
    fn identity_strings() {
        let gang = Profile::gang();
        assert_eq!(
            gang.keywords("Kira Vance"),
            "Kira Vance adventurer runner gangster"
        );
        assert_eq!(
            Profile::runner().room_desc("Kira Vance"),
            "Kira Vance is here, gearing up for the next run."
        );
        assert!(gang.is_hostile());
        assert!(!Profile::runner().is_hostile());
    }

    #[test]
    fn leftovers_match_template_or_signature() {
        let runner = Profile::runner();
        assert!(runner.matches_leftover("bob", Some(RUNNER_TEMPLATE)));
        assert!(runner.matches_leftover("Old Name adventurer runner", None));
        assert!(!runner.matches_leftover("a rat", Some(TemplateId(7))));
        let gang = Profile::gang();
        assert!(gang.matches_leftover("Rex gangster", None));
        assert!(!gang.matches_leftover("Rex adventurer", None));
    }
}
