use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Prototype a host instantiates characters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorFlag {
    Sentinel,
    StayZone,
    Wimpy,
    NoSteal,
    NoKill,
    Aggressive,
}

/// Display strings of a character. Always written as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub keywords: String,
    pub room_desc: String,
    pub look_desc: String,
}

impl Identity {
    pub fn has_keyword(&self, keyword: &str) -> bool {
        has_keyword(&self.keywords, keyword)
    }
}

pub fn has_keyword(keywords: &str, keyword: &str) -> bool {
    keywords
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case(keyword))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearSlot {
    Head,
    Eyes,
    Ears,
    Neck,
    Body,
    About,
    Arms,
    Wrist,
    Hands,
    Waist,
    Legs,
    Feet,
    Back,
    Holster,
    Wield,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpellGrant {
    pub spell: u16,
    #[serde(default)]
    pub subtype: u16,
    #[serde(default)]
    pub force: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PowerGrant {
    pub power: u16,
    #[serde(default)]
    pub rating: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_is_whole_token() {
        assert!(has_keyword("Alex Johnson adventurer runner", "runner"));
        assert!(has_keyword("Alex Johnson adventurer runner", "RUNNER"));
        assert!(!has_keyword("Alex Johnson adventurers", "adventurer"));
        assert!(!has_keyword("", "adventurer"));
    }
}
