#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomFlag {
    Peaceful,
    NoMob,
    Indoors,
    Arena,
    StaffOnly,
    ElevatorShaft,
    Storage,
    Cramped,
    Radiation,
    Socialize,
}

impl RoomFlag {
    /// Maps the builder-facing flag names used in spawn configs.
    pub fn from_name(name: &str) -> Option<Self> {
        let flag = match name.trim().to_ascii_uppercase().as_str() {
            "PEACEFUL" => RoomFlag::Peaceful,
            "!MOB" | "NOMOB" => RoomFlag::NoMob,
            "INDOORS" => RoomFlag::Indoors,
            "ARENA" => RoomFlag::Arena,
            "STAFF-ONLY" | "STAFF_ONLY" => RoomFlag::StaffOnly,
            "ELEVATOR_SHAFT" => RoomFlag::ElevatorShaft,
            "STORAGE" => RoomFlag::Storage,
            "SMALL_DRONE_ONLY" | "CRAMPED" => RoomFlag::Cramped,
            "RADIOACTIVE" => RoomFlag::Radiation,
            "SOCIALIZE!" | "SOCIALIZE" => RoomFlag::Socialize,
            _ => return None,
        };
        Some(flag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub zone: ZoneId,
    pub name: String,
    pub description: String,
    pub flags: Vec<RoomFlag>,
}

impl RoomInfo {
    pub fn has(&self, flag: RoomFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Case-insensitive substring search over the room name and description.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.name.to_ascii_lowercase().contains(&needle)
            || self.description.to_ascii_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names_match_builder_spelling() {
        assert_eq!(RoomFlag::from_name("!MOB"), Some(RoomFlag::NoMob));
        assert_eq!(RoomFlag::from_name(" staff-only "), Some(RoomFlag::StaffOnly));
        assert_eq!(RoomFlag::from_name("SMALL_DRONE_ONLY"), Some(RoomFlag::Cramped));
        assert_eq!(RoomFlag::from_name("ASTRAL"), None);
    }

    #[test]
    fn mentions_ignores_case() {
        let room = RoomInfo {
            id: RoomId(1),
            zone: ZoneId(1),
            name: "Dark ALLEY".to_string(),
            description: "Puddles everywhere.".to_string(),
            flags: Vec::new(),
        };
        assert!(room.mentions("alley"));
        assert!(room.mentions("PUDDLES"));
        assert!(!room.mentions("street"));
        assert!(!room.mentions(""));
    }
}
